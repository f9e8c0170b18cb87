use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::text_log::{
    metadata_field, null_as_empty, string_or_number, DeliveryStatus, LogMetadata, TextLog,
};

/// Server-side rollup of one outbound send operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBatch {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub message_content: String,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub total_count: u32,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub pending_count: u32,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub sent_count: u32,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub delivered_count: u32,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub failed_count: u32,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub status: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "metadata_field")]
    pub metadata: LogMetadata,
}

/// Counters arrive as numbers, numeric strings, or null; anything else counts as zero.
fn null_as_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let count = match Value::deserialize(deserializer)? {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    };

    Ok(count
        .and_then(|value| u32::try_from(value).ok())
        .unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BatchCounts {
    pub delivered_count: u32,
    pub pending_count: u32,
    pub failed_count: u32,
    pub sent_count: u32,
    pub total_count: u32,
}

/// Recounts a batch from its per-recipient rows.
///
/// `None` means the rows were never fetched; callers treat all-zero counts as
/// "fall back to the batch's stored counters".
pub fn calculate_batch_counts(logs: Option<&[TextLog]>) -> BatchCounts {
    let Some(logs) = logs else {
        return BatchCounts::default();
    };

    let mut counts = BatchCounts {
        total_count: logs.len() as u32,
        ..BatchCounts::default()
    };

    for log in logs {
        match log.delivery_status() {
            DeliveryStatus::Delivered => counts.delivered_count += 1,
            DeliveryStatus::Sent => counts.sent_count += 1,
            DeliveryStatus::Failed | DeliveryStatus::Undelivered => counts.failed_count += 1,
            _ => counts.pending_count += 1,
        }
    }

    counts
}

/// Counts as presented for a batch card; `pending` folds in `sent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DisplayCounts {
    pub delivered: u32,
    pub pending: u32,
    pub failed: u32,
    pub total: u32,
}

/// Loaded details win over the batch's own counters.
pub fn display_counts(batch: &TextBatch, details: Option<&[TextLog]>) -> DisplayCounts {
    match details {
        Some(rows) if !rows.is_empty() => {
            let counts = calculate_batch_counts(Some(rows));
            DisplayCounts {
                delivered: counts.delivered_count,
                pending: counts.sent_count + counts.pending_count,
                failed: counts.failed_count,
                total: counts.total_count,
            }
        }
        _ => DisplayCounts {
            delivered: batch.delivered_count,
            pending: batch.sent_count + batch.pending_count,
            failed: batch.failed_count,
            total: batch.total_count,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::text_log::log;

    fn batch() -> TextBatch {
        TextBatch {
            id: "b1".to_owned(),
            message_content: "Shift reminder".to_owned(),
            total_count: 10,
            pending_count: 2,
            sent_count: 3,
            delivered_count: 4,
            failed_count: 1,
            status: "in_progress".to_owned(),
            created_at: None,
            metadata: LogMetadata::default(),
        }
    }

    #[test]
    fn null_or_malformed_counters_read_as_zero() {
        let raw = serde_json::json!({
            "id": "b1",
            "message_content": "Shift reminder",
            "total_count": "3",
            "pending_count": null,
            "sent_count": -1,
            "delivered_count": 2,
            "status": "in_progress"
        });

        let batch: TextBatch = serde_json::from_value(raw).expect("batch should deserialize");

        assert_eq!(batch.total_count, 3);
        assert_eq!(batch.pending_count, 0);
        assert_eq!(batch.sent_count, 0);
        assert_eq!(batch.delivered_count, 2);
        assert_eq!(batch.failed_count, 0);
    }

    #[test]
    fn missing_details_yield_zero_counts() {
        assert_eq!(calculate_batch_counts(None), BatchCounts::default());
        assert_eq!(calculate_batch_counts(Some(&[])), BatchCounts::default());
    }

    #[test]
    fn buckets_each_status_once() {
        let logs = vec![
            log("1", Some("m"), "+1", "delivered"),
            log("2", Some("m"), "+2", "sent"),
            log("3", Some("m"), "+3", "failed"),
            log("4", Some("m"), "+4", "undelivered"),
            log("5", Some("m"), "+5", "bogus"),
        ];

        let counts = calculate_batch_counts(Some(&logs));

        assert_eq!(
            counts,
            BatchCounts {
                delivered_count: 1,
                pending_count: 1,
                failed_count: 2,
                sent_count: 1,
                total_count: 5,
            }
        );
    }

    #[test]
    fn status_bucketing_ignores_case() {
        let logs = vec![log("1", None, "+1", "DELIVERED"), log("2", None, "+2", "Failed")];

        let counts = calculate_batch_counts(Some(&logs));

        assert_eq!(counts.delivered_count, 1);
        assert_eq!(counts.failed_count, 1);
    }

    #[test]
    fn display_counts_fall_back_to_stored_counters() {
        let counts = display_counts(&batch(), None);

        assert_eq!(
            counts,
            DisplayCounts {
                delivered: 4,
                pending: 5,
                failed: 1,
                total: 10,
            }
        );
        assert_eq!(display_counts(&batch(), Some(&[])), counts);
    }

    #[test]
    fn display_counts_prefer_loaded_details() {
        let details = vec![
            log("1", Some("m"), "+1", "delivered"),
            log("2", Some("m"), "+2", "delivered"),
            log("3", Some("m"), "+3", "queued"),
        ];

        let counts = display_counts(&batch(), Some(&details));

        assert_eq!(
            counts,
            DisplayCounts {
                delivered: 2,
                pending: 1,
                failed: 0,
                total: 3,
            }
        );
    }
}
