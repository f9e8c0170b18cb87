use chrono::NaiveDate;

use crate::domain::{batch::TextBatch, grouping::LogCollections, text_log::TextLog};

const TEXT_LOGS_LOADED: &str = "TEXT_LOGS_LOADED";

pub const DEFAULT_LOGS_PAGE_SIZE: usize = 25;
pub const MAX_LOGS_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    Status,
    RecipientPhone,
}

impl SortField {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "created_at" | "date" => Some(Self::CreatedAt),
            "status" => Some(Self::Status),
            "recipient_phone" | "phone" => Some(Self::RecipientPhone),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Filter options for a page of text logs. `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLogQuery {
    pub page: usize,
    pub limit: usize,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub search_term: Option<String>,
    pub recipient_phone: Option<String>,
    pub sort_by: SortField,
    pub sort_direction: SortDirection,
}

impl Default for TextLogQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LOGS_PAGE_SIZE,
            start_date: None,
            end_date: None,
            status: None,
            search_term: None,
            recipient_phone: None,
            sort_by: SortField::default(),
            sort_direction: SortDirection::default(),
        }
    }
}

impl TextLogQuery {
    pub fn normalized(mut self) -> Self {
        self.page = self.page.max(1);
        self.limit = match self.limit {
            0 => DEFAULT_LOGS_PAGE_SIZE,
            value if value > MAX_LOGS_PAGE_SIZE => MAX_LOGS_PAGE_SIZE,
            value => value,
        };
        self.status = non_blank(self.status);
        self.search_term = non_blank(self.search_term);
        self.recipient_phone = non_blank(self.recipient_phone);
        self
    }

    pub fn offset(&self) -> usize {
        (self.page.max(1) - 1).saturating_mul(self.limit)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

/// One page of each log collection plus the unpaged totals.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextLogPage {
    pub logs: LogCollections,
    pub total_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextLogSourceError {
    Unavailable,
    InvalidData,
    NotFound,
}

/// Backend contract for messaging history.
pub trait TextLogSource {
    fn fetch_text_logs(&self, query: &TextLogQuery) -> Result<TextLogPage, TextLogSourceError>;

    fn fetch_batches(&self) -> Result<Vec<TextBatch>, TextLogSourceError>;

    fn fetch_batch_details(&self, batch_id: &str) -> Result<Vec<TextLog>, TextLogSourceError>;
}

impl<T> TextLogSource for &T
where
    T: TextLogSource + ?Sized,
{
    fn fetch_text_logs(&self, query: &TextLogQuery) -> Result<TextLogPage, TextLogSourceError> {
        (*self).fetch_text_logs(query)
    }

    fn fetch_batches(&self) -> Result<Vec<TextBatch>, TextLogSourceError> {
        (*self).fetch_batches()
    }

    fn fetch_batch_details(&self, batch_id: &str) -> Result<Vec<TextLog>, TextLogSourceError> {
        (*self).fetch_batch_details(batch_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadTextLogsError {
    TemporarilyUnavailable,
    DataContractViolation,
    NotFound,
}

impl LoadTextLogsError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::TemporarilyUnavailable => "Text logs are temporarily unavailable.",
            Self::DataContractViolation => "Text logs could not be read.",
            Self::NotFound => "No text logs were found.",
        }
    }
}

impl std::fmt::Display for LoadTextLogsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.user_message())
    }
}

impl std::error::Error for LoadTextLogsError {}

pub fn load_text_logs(
    source: &dyn TextLogSource,
    query: TextLogQuery,
) -> Result<TextLogPage, LoadTextLogsError> {
    let query = query.normalized();
    let page = source.fetch_text_logs(&query).map_err(map_source_error)?;

    tracing::debug!(
        code = TEXT_LOGS_LOADED,
        page = query.page,
        limit = query.limit,
        rows = page.logs.total_len(),
        total = page.total_count,
        "text logs loaded"
    );

    Ok(page)
}

pub fn load_batches(source: &dyn TextLogSource) -> Result<Vec<TextBatch>, LoadTextLogsError> {
    source.fetch_batches().map_err(map_source_error)
}

pub(crate) fn map_source_error(error: TextLogSourceError) -> LoadTextLogsError {
    match error {
        TextLogSourceError::Unavailable => LoadTextLogsError::TemporarilyUnavailable,
        TextLogSourceError::InvalidData => LoadTextLogsError::DataContractViolation,
        TextLogSourceError::NotFound => LoadTextLogsError::NotFound,
    }
}

#[cfg(test)]
pub(crate) mod test_source {
    use std::sync::Mutex;

    use super::*;

    pub struct StubSource {
        pub page: Result<TextLogPage, TextLogSourceError>,
        pub batches: Result<Vec<TextBatch>, TextLogSourceError>,
        pub details: Result<Vec<TextLog>, TextLogSourceError>,
        pub captured_query: Mutex<Option<TextLogQuery>>,
        pub detail_calls: Mutex<Vec<String>>,
    }

    impl StubSource {
        pub fn with_page(page: Result<TextLogPage, TextLogSourceError>) -> Self {
            Self {
                page,
                batches: Ok(Vec::new()),
                details: Ok(Vec::new()),
                captured_query: Mutex::new(None),
                detail_calls: Mutex::new(Vec::new()),
            }
        }

        pub fn with_details(details: Result<Vec<TextLog>, TextLogSourceError>) -> Self {
            Self {
                details,
                ..Self::with_page(Ok(TextLogPage::default()))
            }
        }
    }

    impl TextLogSource for StubSource {
        fn fetch_text_logs(
            &self,
            query: &TextLogQuery,
        ) -> Result<TextLogPage, TextLogSourceError> {
            *self.captured_query.lock().expect("query lock") = Some(query.clone());
            self.page.clone()
        }

        fn fetch_batches(&self) -> Result<Vec<TextBatch>, TextLogSourceError> {
            self.batches.clone()
        }

        fn fetch_batch_details(
            &self,
            batch_id: &str,
        ) -> Result<Vec<TextLog>, TextLogSourceError> {
            self.detail_calls
                .lock()
                .expect("calls lock")
                .push(batch_id.to_owned());
            self.details.clone()
        }
    }
}
