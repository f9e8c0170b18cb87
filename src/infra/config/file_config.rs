use std::path::PathBuf;

use serde::Deserialize;

use crate::infra::config::{
    AppConfig, AutosaveConfig, LogConfig, LogsConfig, ReportConfig, TextingConfig,
};

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    pub logging: Option<FileLogConfig>,
    pub texting: Option<FileTextingConfig>,
    pub logs: Option<FileLogsConfig>,
    pub autosave: Option<FileAutosaveConfig>,
    pub report: Option<FileReportConfig>,
}

impl FileConfig {
    pub fn merge_into(self, config: &mut AppConfig) {
        if let Some(logging) = self.logging {
            logging.merge_into(&mut config.logging);
        }

        if let Some(texting) = self.texting {
            texting.merge_into(&mut config.texting);
        }

        if let Some(logs) = self.logs {
            logs.merge_into(&mut config.logs);
        }

        if let Some(autosave) = self.autosave {
            autosave.merge_into(&mut config.autosave);
        }

        if let Some(report) = self.report {
            report.merge_into(&mut config.report);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileLogConfig {
    pub level: Option<String>,
    pub dir: Option<PathBuf>,
}

impl FileLogConfig {
    fn merge_into(self, config: &mut LogConfig) {
        if let Some(level) = self.level {
            config.level = level;
        }

        if let Some(dir) = self.dir {
            config.dir = Some(dir);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileTextingConfig {
    pub send_page_url: Option<String>,
    pub preview_width: Option<usize>,
}

impl FileTextingConfig {
    fn merge_into(self, config: &mut TextingConfig) {
        if let Some(url) = self.send_page_url {
            config.send_page_url = url;
        }

        if let Some(width) = self.preview_width {
            config.preview_width = width;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileLogsConfig {
    pub data_file: Option<PathBuf>,
    pub page_size: Option<usize>,
}

impl FileLogsConfig {
    fn merge_into(self, config: &mut LogsConfig) {
        if let Some(data_file) = self.data_file {
            config.data_file = data_file;
        }

        if let Some(page_size) = self.page_size {
            config.page_size = page_size;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileAutosaveConfig {
    pub idle_ms: Option<u64>,
}

impl FileAutosaveConfig {
    fn merge_into(self, config: &mut AutosaveConfig) {
        if let Some(idle_ms) = self.idle_ms {
            config.idle_ms = idle_ms;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileReportConfig {
    pub lines_per_page: Option<usize>,
}

impl FileReportConfig {
    fn merge_into(self, config: &mut ReportConfig) {
        if let Some(lines) = self.lines_per_page {
            config.lines_per_page = lines;
        }
    }
}
