use std::collections::HashMap;

use crate::{
    domain::{
        batch::{display_counts, DisplayCounts, TextBatch},
        text_log::TextLog,
    },
    usecases::load_text_logs::{map_source_error, LoadTextLogsError, TextLogSource},
};

const BATCH_DETAILS_LOADED: &str = "BATCH_DETAILS_LOADED";
const BATCH_DETAILS_FAILED: &str = "BATCH_DETAILS_FAILED";

/// Per-recipient rows fetched on expand, keyed by batch id.
///
/// A second fetch for the same batch replaces the first.
#[derive(Debug, Clone, Default)]
pub struct BatchDetailsCache {
    details: HashMap<String, Vec<TextLog>>,
}

impl BatchDetailsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, batch_id: &str) -> Option<&[TextLog]> {
        self.details.get(batch_id).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.details.len()
    }

    pub fn is_empty(&self) -> bool {
        self.details.is_empty()
    }

    /// Stores a fetch result; the latest response for a batch wins.
    pub fn store(&mut self, batch_id: &str, rows: Vec<TextLog>) {
        self.details.insert(batch_id.to_owned(), rows);
    }

    /// Fetches and caches a batch's rows. Requests are not de-duplicated.
    pub fn expand(
        &mut self,
        source: &dyn TextLogSource,
        batch_id: &str,
    ) -> Result<&[TextLog], LoadTextLogsError> {
        match source.fetch_batch_details(batch_id) {
            Ok(rows) => {
                tracing::debug!(
                    code = BATCH_DETAILS_LOADED,
                    batch_id,
                    rows = rows.len(),
                    "batch details loaded"
                );
                self.store(batch_id, rows);
                Ok(self.get(batch_id).unwrap_or_default())
            }
            Err(error) => {
                tracing::warn!(
                    code = BATCH_DETAILS_FAILED,
                    batch_id,
                    error = ?error,
                    "batch details fetch failed"
                );
                Err(map_source_error(error))
            }
        }
    }

    pub fn display_counts(&self, batch: &TextBatch) -> DisplayCounts {
        display_counts(batch, self.get(&batch.id))
    }
}
