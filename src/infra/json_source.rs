//! Text-log source backed by a JSON export of the messaging tables.
//!
//! The file is re-read on every call, the way each request would hit the
//! backend, so edits to the export show up without restarting.

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

use crate::{
    domain::{
        batch::TextBatch,
        contact::{looks_like_phone, phone_digits, phones_match},
        grouping::{LogCollections, LogTab},
        text_log::{DeliveryStatus, TextLog},
    },
    usecases::load_text_logs::{
        SortDirection, SortField, TextLogPage, TextLogQuery, TextLogSource, TextLogSourceError,
    },
};

const TEXT_LOG_EXPORT_READ_FAILED: &str = "TEXT_LOG_EXPORT_READ_FAILED";
const TEXT_LOG_EXPORT_PARSE_FAILED: &str = "TEXT_LOG_EXPORT_PARSE_FAILED";

#[derive(Debug, Default, Deserialize)]
struct TextLogExport {
    #[serde(flatten)]
    logs: LogCollections,
    #[serde(default)]
    batches: Vec<TextBatch>,
}

#[derive(Debug, Clone)]
pub struct JsonTextLogSource {
    path: PathBuf,
}

impl JsonTextLogSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_export(&self) -> Result<TextLogExport, TextLogSourceError> {
        let raw = fs::read_to_string(&self.path).map_err(|error| {
            tracing::warn!(
                code = TEXT_LOG_EXPORT_READ_FAILED,
                path = %self.path.display(),
                error = %error,
                "text log export could not be read"
            );
            TextLogSourceError::Unavailable
        })?;

        serde_json::from_str(&raw).map_err(|error| {
            tracing::warn!(
                code = TEXT_LOG_EXPORT_PARSE_FAILED,
                path = %self.path.display(),
                error = %error,
                "text log export is malformed"
            );
            TextLogSourceError::InvalidData
        })
    }
}

impl TextLogSource for JsonTextLogSource {
    fn fetch_text_logs(&self, query: &TextLogQuery) -> Result<TextLogPage, TextLogSourceError> {
        let export = self.read_export()?;
        let mut total_count = 0;

        let mut page_of = |rows: Vec<TextLog>| -> Vec<TextLog> {
            let mut matching: Vec<TextLog> =
                rows.into_iter().filter(|log| matches_query(log, query)).collect();
            total_count += matching.len();
            sort_logs(&mut matching, query.sort_by, query.sort_direction);
            matching
                .into_iter()
                .skip(query.offset())
                .take(query.limit)
                .collect()
        };

        let LogCollections {
            user_logs,
            community_logs,
            city_logs,
        } = export.logs;

        let user_logs = page_of(user_logs);
        let community_logs = community_logs
            .into_iter()
            .map(|(id, rows)| (id, page_of(rows)))
            .collect();
        let city_logs = city_logs
            .into_iter()
            .map(|(id, rows)| (id, page_of(rows)))
            .collect();

        Ok(TextLogPage {
            logs: LogCollections {
                user_logs,
                community_logs,
                city_logs,
            },
            total_count,
        })
    }

    fn fetch_batches(&self) -> Result<Vec<TextBatch>, TextLogSourceError> {
        Ok(self.read_export()?.batches)
    }

    fn fetch_batch_details(&self, batch_id: &str) -> Result<Vec<TextLog>, TextLogSourceError> {
        let export = self.read_export()?;

        let rows: Vec<TextLog> = export
            .logs
            .flatten(LogTab::All)
            .into_iter()
            .filter(|log| log.batch_id.as_deref() == Some(batch_id))
            .cloned()
            .collect();

        if rows.is_empty() && !export.batches.iter().any(|batch| batch.id == batch_id) {
            return Err(TextLogSourceError::NotFound);
        }

        Ok(rows)
    }
}

fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<FixedOffset>> {
    raw.and_then(|value| DateTime::parse_from_rfc3339(value.trim()).ok())
}

fn matches_query(log: &TextLog, query: &TextLogQuery) -> bool {
    if query.start_date.is_some() || query.end_date.is_some() {
        let Some(created) = parse_timestamp(log.created_at.as_deref()) else {
            return false;
        };
        let day = created.date_naive();

        if query.start_date.is_some_and(|start| day < start) {
            return false;
        }
        if query.end_date.is_some_and(|end| day > end) {
            return false;
        }
    }

    if let Some(status) = &query.status {
        if log.delivery_status() != DeliveryStatus::parse(status) {
            return false;
        }
    }

    if let Some(phone) = &query.recipient_phone {
        if !phones_match(&log.recipient_phone, phone) {
            return false;
        }
    }

    if let Some(term) = &query.search_term {
        let term = term.to_lowercase();
        let digits = if looks_like_phone(&term) {
            phone_digits(&term)
        } else {
            String::new()
        };
        let content_hit = log.message_content.to_lowercase().contains(&term);
        let phone_hit = log.recipient_phone.contains(&term)
            || (!digits.is_empty() && phone_digits(&log.recipient_phone).contains(&digits));

        if !content_hit && !phone_hit {
            return false;
        }
    }

    true
}

fn sort_logs(logs: &mut [TextLog], field: SortField, direction: SortDirection) {
    logs.sort_by(|left, right| {
        let ordering = match field {
            SortField::CreatedAt => parse_timestamp(left.created_at.as_deref())
                .cmp(&parse_timestamp(right.created_at.as_deref())),
            SortField::Status => left
                .status
                .to_lowercase()
                .cmp(&right.status.to_lowercase()),
            SortField::RecipientPhone => {
                phone_digits(&left.recipient_phone).cmp(&phone_digits(&right.recipient_phone))
            }
        };

        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}
