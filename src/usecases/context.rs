use tracing_appender::non_blocking::WorkerGuard;

use crate::infra::{config::AppConfig, json_source::JsonTextLogSource};

pub struct AppContext {
    pub config: AppConfig,
    pub logs: JsonTextLogSource,
    /// Keeps the file writer alive; dropping it flushes buffered log lines.
    pub log_guard: Option<WorkerGuard>,
}

impl AppContext {
    pub fn new(config: AppConfig, logs: JsonTextLogSource) -> Self {
        Self {
            config,
            logs,
            log_guard: None,
        }
    }
}
