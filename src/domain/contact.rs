/// A directory contact as imported from or exported to CSV.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Contact {
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub email: Option<String>,
    pub phone: String,
    pub website: Option<String>,
    /// Group labels the contact belongs to.
    pub groups: Vec<String>,
}

impl Contact {
    pub fn full_name(&self) -> String {
        [
            Some(self.first_name.as_str()),
            self.middle_name.as_deref(),
            Some(self.last_name.as_str()),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }
}

/// Digits-only form of a phone number, used for loose equality.
pub fn phone_digits(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

/// Search text made only of digits and phone punctuation, with at least one digit.
pub fn looks_like_phone(text: &str) -> bool {
    text.chars().any(|ch| ch.is_ascii_digit())
        && text
            .chars()
            .all(|ch| ch.is_ascii_digit() || matches!(ch, '+' | '-' | '(' | ')' | '.' | ' '))
}

/// Two numbers match when their digits agree, tolerating a leading country code.
pub fn phones_match(left: &str, right: &str) -> bool {
    let left = phone_digits(left);
    let right = phone_digits(right);

    if left.is_empty() || right.is_empty() {
        return false;
    }

    left == right || last_ten(&left) == last_ten(&right)
}

fn last_ten(digits: &str) -> &str {
    let len = digits.len();
    if len > 10 {
        &digits[len - 10..]
    } else {
        digits
    }
}
