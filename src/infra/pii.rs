use std::panic;

use once_cell::sync::Lazy;
use regex::Regex;

const REDACTED: &str = "[REDACTED]";

static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\+?\d[\d\s().-]{6,}\d").expect("phone pattern is valid")
});

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("email pattern is valid")
});

/// Replaces phone numbers and email addresses with a fixed marker.
pub fn redact_text(input: &str) -> String {
    let without_emails = EMAIL_PATTERN.replace_all(input, REDACTED);
    PHONE_PATTERN
        .replace_all(&without_emails, REDACTED)
        .into_owned()
}

/// Keeps only the last four digits, e.g. `***4567`.
pub fn mask_phone(phone: &str) -> String {
    let digits: Vec<char> = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.len() <= 4 {
        return "***".to_owned();
    }

    let tail: String = digits[digits.len() - 4..].iter().collect();
    format!("***{tail}")
}

pub fn install_panic_redaction_hook() {
    panic::set_hook(Box::new(|panic_info| {
        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "panic payload omitted".to_owned());

        let scrubbed = redact_text(&payload);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "svcdesk panic: {} at {}:{}:{}",
                scrubbed,
                location.file(),
                location.line(),
                location.column()
            );
        } else {
            eprintln!("svcdesk panic: {}", scrubbed);
        }
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redact_text_scrubs_phones_and_emails() {
        let input = "send to +1 (555) 123-4567 and ana@example.org failed";
        let output = redact_text(input);

        assert!(!output.contains("123-4567"));
        assert!(!output.contains("ana@example.org"));
        assert_eq!(output, "send to [REDACTED] and [REDACTED] failed");
    }

    #[test]
    fn redact_text_keeps_short_numbers() {
        assert_eq!(redact_text("error 30007 on line 2"), "error 30007 on line 2");
    }

    #[test]
    fn mask_phone_keeps_last_four_digits() {
        assert_eq!(mask_phone("+1 (555) 123-4567"), "***4567");
        assert_eq!(mask_phone("123"), "***");
    }
}
