use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{
    domain::autosave::DEFAULT_AUTOSAVE_IDLE,
    usecases::{load_text_logs::DEFAULT_LOGS_PAGE_SIZE, project_report::DEFAULT_LINES_PER_PAGE},
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AppConfig {
    pub logging: LogConfig,
    pub texting: TextingConfig,
    pub logs: LogsConfig,
    pub autosave: AutosaveConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    /// Directory for a log file; logs go to stderr when unset.
    pub dir: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextingConfig {
    pub send_page_url: String,
    pub preview_width: usize,
}

impl Default for TextingConfig {
    fn default() -> Self {
        Self {
            send_page_url: "http://localhost:3000/admin-dashboard/texting/send".to_owned(),
            preview_width: 48,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogsConfig {
    /// JSON export the text-log commands read from.
    pub data_file: PathBuf,
    pub page_size: usize,
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("text_logs.json"),
            page_size: DEFAULT_LOGS_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AutosaveConfig {
    pub idle_ms: u64,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            idle_ms: DEFAULT_AUTOSAVE_IDLE.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportConfig {
    pub lines_per_page: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            lines_per_page: DEFAULT_LINES_PER_PAGE,
        }
    }
}
