//! Search and ordering for the per-recipient rows of an expanded batch.

use crate::domain::{
    contact::{looks_like_phone, phone_digits, phones_match},
    text_log::{DeliveryStatus, LogMetadata, TextLog},
};

/// `"Name (phone)"` when the batch metadata knows the recipient, else the raw phone.
pub fn recipient_display_name(phone: &str, metadata: &LogMetadata) -> String {
    metadata
        .all_recipients
        .iter()
        .find(|recipient| !recipient.name.trim().is_empty() && phones_match(&recipient.phone, phone))
        .map(|recipient| format!("{} ({})", recipient.name.trim(), phone))
        .unwrap_or_else(|| phone.to_owned())
}

/// Lower ranks sort first so problem deliveries surface at the top.
pub fn status_priority(status: &str) -> u8 {
    match DeliveryStatus::parse(status) {
        DeliveryStatus::Undelivered => 0,
        DeliveryStatus::Failed => 1,
        DeliveryStatus::Sent => 2,
        DeliveryStatus::Delivered => 3,
        _ => 4,
    }
}

/// A row ready for display in an expanded batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRow<'a> {
    pub log: &'a TextLog,
    pub display_name: String,
}

pub fn filter_and_sort_messages<'a>(
    details: &'a [TextLog],
    search_term: &str,
    metadata: &LogMetadata,
) -> Vec<MessageRow<'a>> {
    let needle = search_term.trim().to_lowercase();
    let needle_digits = if looks_like_phone(&needle) {
        phone_digits(&needle)
    } else {
        String::new()
    };

    let mut rows: Vec<MessageRow<'a>> = details
        .iter()
        .map(|log| MessageRow {
            log,
            display_name: recipient_display_name(&log.recipient_phone, metadata),
        })
        .filter(|row| {
            if needle.is_empty() {
                return true;
            }

            row.display_name.to_lowercase().contains(&needle)
                || (!needle_digits.is_empty()
                    && phone_digits(&row.log.recipient_phone).contains(&needle_digits))
        })
        .collect();

    rows.sort_by_key(|row| status_priority(&row.log.status));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::text_log::{log, Recipient};

    fn metadata() -> LogMetadata {
        LogMetadata {
            all_recipients: vec![
                Recipient {
                    name: "Ana Lopez".to_owned(),
                    phone: "(555) 123-4567".to_owned(),
                },
                Recipient {
                    name: "Bo Chen".to_owned(),
                    phone: "+15559990000".to_owned(),
                },
            ],
            ..LogMetadata::default()
        }
    }

    fn details() -> Vec<TextLog> {
        vec![
            log("1", Some("m"), "+15551234567", "delivered"),
            log("2", Some("m"), "+15559990000", "sent"),
            log("3", Some("m"), "+15550001111", "failed"),
            log("4", Some("m"), "+15552223333", "undelivered"),
            log("5", Some("m"), "+15554445555", "queued"),
        ]
    }

    #[test]
    fn resolves_display_name_by_normalized_digits() {
        assert_eq!(
            recipient_display_name("+15551234567", &metadata()),
            "Ana Lopez (+15551234567)"
        );
        assert_eq!(
            recipient_display_name("+15550001111", &metadata()),
            "+15550001111"
        );
    }

    #[test]
    fn empty_search_returns_every_row_sorted_by_priority() {
        let rows = details();

        let ordered: Vec<&str> = filter_and_sort_messages(&rows, "", &metadata())
            .into_iter()
            .map(|row| row.log.status.as_str())
            .collect();

        assert_eq!(
            ordered,
            vec!["undelivered", "failed", "sent", "delivered", "queued"]
        );
    }

    #[test]
    fn search_matches_display_name_case_insensitively() {
        let rows = details();

        let found = filter_and_sort_messages(&rows, "ana", &metadata());

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].log.id, "1");
    }

    #[test]
    fn search_matches_phone_digits() {
        let rows = details();

        let found = filter_and_sort_messages(&rows, "222-3333", &metadata());

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].log.id, "4");
    }

    #[test]
    fn digits_inside_a_name_search_do_not_match_phones() {
        let rows = details();
        let metadata = LogMetadata {
            all_recipients: vec![Recipient {
                name: "Room 5 Lead".to_owned(),
                phone: "+15551234567".to_owned(),
            }],
            ..LogMetadata::default()
        };

        let found: Vec<&str> = filter_and_sort_messages(&rows, "room 5", &metadata)
            .into_iter()
            .map(|row| row.log.id.as_str())
            .collect();

        assert_eq!(found, vec!["1"]);
    }

    #[test]
    fn sort_is_stable_within_a_priority() {
        let rows = vec![
            log("a", Some("m"), "+1", "delivered"),
            log("b", Some("m"), "+2", "delivered"),
            log("c", Some("m"), "+3", "failed"),
        ];

        let ids: Vec<&str> = filter_and_sort_messages(&rows, " ", &LogMetadata::default())
            .into_iter()
            .map(|row| row.log.id.as_str())
            .collect();

        assert_eq!(ids, vec!["c", "a", "b"]);
    }
}
