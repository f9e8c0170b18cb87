use chrono::{DateTime, Local};
use unicode_width::UnicodeWidthChar;

const MISSING_DATE: &str = "N/A";
const ELLIPSIS: char = '…';

/// Formats a backend timestamp for display in local time.
///
/// Missing values print as `N/A`; values that do not parse are shown as-is.
pub fn format_log_date(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return MISSING_DATE.to_owned();
    };

    match DateTime::parse_from_rfc3339(raw) {
        Ok(datetime) => datetime
            .with_timezone(&Local)
            .format("%b %-d, %Y %-I:%M %p")
            .to_string(),
        Err(_) => raw.to_owned(),
    }
}

/// Single-line preview no wider than `width` terminal columns.
pub fn truncate_preview(text: &str, width: usize) -> String {
    let flattened = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if width == 0 {
        return String::new();
    }

    let total: usize = flattened
        .chars()
        .map(|ch| ch.width().unwrap_or(0))
        .sum();
    if total <= width {
        return flattened;
    }

    let mut preview = String::new();
    let mut used = 0;
    for ch in flattened.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if used + ch_width + 1 > width {
            break;
        }
        preview.push(ch);
        used += ch_width;
    }

    preview.truncate(preview.trim_end().len());
    preview.push(ELLIPSIS);
    preview
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn missing_date_prints_placeholder() {
        assert_eq!(format_log_date(None), "N/A");
        assert_eq!(format_log_date(Some("  ")), "N/A");
    }

    #[test]
    fn unparsable_date_is_returned_raw() {
        assert_eq!(format_log_date(Some("yesterday")), "yesterday");
    }

    #[test]
    fn formats_rfc3339_in_local_time() {
        let raw = "2024-03-05T15:04:00Z";
        let expected = Local
            .from_utc_datetime(
                &DateTime::parse_from_rfc3339(raw)
                    .expect("fixture parses")
                    .naive_utc(),
            )
            .format("%b %-d, %Y %-I:%M %p")
            .to_string();

        assert_eq!(format_log_date(Some(raw)), expected);
    }

    #[test]
    fn short_text_is_kept_on_one_line() {
        assert_eq!(truncate_preview("Shift\nreminder", 40), "Shift reminder");
    }

    #[test]
    fn long_text_is_cut_with_ellipsis() {
        assert_eq!(truncate_preview("Volunteer shift tomorrow", 10), "Volunteer…");
    }

    #[test]
    fn wide_characters_count_double() {
        let preview = truncate_preview("日本語のテキスト", 7);

        assert_eq!(preview, "日本語…");
    }
}
