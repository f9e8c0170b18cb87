//! Reconstructs logical multi-recipient messages from flat per-recipient rows.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::text_log::{DeliveryStatus, LogMetadata, TextLog};

const UNKNOWN_SUMMARY: &str = "Unknown";

/// Which collections of logs a viewer is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogTab {
    #[default]
    All,
    Personal,
    Community,
    City,
}

impl LogTab {
    fn includes_user(self) -> bool {
        matches!(self, Self::All | Self::Personal)
    }

    fn includes_community(self) -> bool {
        matches!(self, Self::All | Self::Community)
    }

    fn includes_city(self) -> bool {
        matches!(self, Self::All | Self::City)
    }
}

/// Raw logs as returned for one user: their own sends plus those of each
/// community and city they administer, keyed by id in server order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LogCollections {
    #[serde(default)]
    pub user_logs: Vec<TextLog>,
    #[serde(default)]
    pub community_logs: IndexMap<String, Vec<TextLog>>,
    #[serde(default)]
    pub city_logs: IndexMap<String, Vec<TextLog>>,
}

impl LogCollections {
    /// Flattens the collections selected by `tab`: user, then communities, then cities.
    pub fn flatten(&self, tab: LogTab) -> Vec<&TextLog> {
        let mut flat: Vec<&TextLog> = Vec::new();

        if tab.includes_user() {
            flat.extend(self.user_logs.iter());
        }

        if tab.includes_community() {
            flat.extend(self.community_logs.values().flatten());
        }

        if tab.includes_city() {
            flat.extend(self.city_logs.values().flatten());
        }

        flat
    }

    pub fn total_len(&self) -> usize {
        self.flatten(LogTab::All).len()
    }
}

/// View-only reconstruction of one logical send; rebuilt on every pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupedLog {
    pub id: String,
    pub message_id: String,
    pub batch_id: Option<String>,
    /// Phone of the seeding row; `recipients` lists every phone.
    pub recipient_phone: String,
    pub message_content: String,
    pub media_urls: Vec<String>,
    pub created_at: Option<String>,
    pub sent_at: Option<String>,
    pub delivered_at: Option<String>,
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "LogMetadata::is_empty")]
    pub metadata: LogMetadata,
    pub recipients: Vec<String>,
    pub statuses: Vec<String>,
    pub recipient_count: usize,
    pub individual_log_ids: Vec<String>,
    /// Summary status resolved from `statuses`.
    pub status: String,
}

impl GroupedLog {
    fn seed(message_id: &str, log: &TextLog) -> Self {
        Self {
            id: log.id.clone(),
            message_id: message_id.to_owned(),
            batch_id: log.batch_id.clone(),
            recipient_phone: log.recipient_phone.clone(),
            message_content: log.message_content.clone(),
            media_urls: log.media_urls.clone(),
            created_at: log.created_at.clone(),
            sent_at: log.sent_at.clone(),
            delivered_at: log.delivered_at.clone(),
            error_message: log.error_message.clone(),
            metadata: log.metadata.clone(),
            recipients: vec![log.recipient_phone.clone()],
            statuses: vec![log.status.clone()],
            recipient_count: 1,
            individual_log_ids: vec![log.id.clone()],
            status: log.status.clone(),
        }
    }

    fn absorb(&mut self, log: &TextLog) {
        self.recipients.push(log.recipient_phone.clone());
        self.recipient_count += 1;
        self.statuses.push(log.status.clone());
        self.individual_log_ids.push(log.id.clone());
    }
}

/// Collapses per-recipient statuses into one, by priority failed > sent > delivered.
///
/// A group whose statuses are all unrecognized still resolves to `delivered`.
pub fn status_summary<S: AsRef<str>>(statuses: Option<&[S]>) -> String {
    let Some(statuses) = statuses.filter(|items| !items.is_empty()) else {
        return UNKNOWN_SUMMARY.to_owned();
    };

    let mut failed = 0usize;
    let mut sent = 0usize;
    let mut delivered = 0usize;
    let mut unknown = 0usize;

    for status in statuses {
        match status.as_ref().trim().to_lowercase().as_str() {
            "failed" => failed += 1,
            "sent" => sent += 1,
            "delivered" => delivered += 1,
            _ => unknown += 1,
        }
    }

    tracing::trace!(failed, sent, delivered, unknown, "status summary tally");

    if failed > 0 {
        DeliveryStatus::Failed.as_str().to_owned()
    } else if sent > 0 {
        DeliveryStatus::Sent.as_str().to_owned()
    } else {
        DeliveryStatus::Delivered.as_str().to_owned()
    }
}

/// Groups rows by `message_id` in order of first appearance.
pub fn group_logs<'a, I>(logs: I) -> Vec<GroupedLog>
where
    I: IntoIterator<Item = &'a TextLog>,
{
    let mut groups: IndexMap<String, GroupedLog> = IndexMap::new();

    for log in logs {
        let Some(message_id) = log.group_key() else {
            continue;
        };

        groups
            .entry(message_id.to_owned())
            .and_modify(|group| group.absorb(log))
            .or_insert_with(|| GroupedLog::seed(message_id, log));
    }

    groups
        .into_values()
        .map(|mut group| {
            group.status = status_summary(Some(group.statuses.as_slice()));
            group
        })
        .collect()
}

/// Grouped view of the active tab.
pub fn current_logs(collections: &LogCollections, tab: LogTab) -> Vec<GroupedLog> {
    group_logs(collections.flatten(tab))
}
