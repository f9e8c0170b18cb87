use std::path::Path;

use crate::{
    infra::{
        self, config::FileConfigAdapter, contracts::ConfigAdapter, error::AppError,
        json_source::JsonTextLogSource,
    },
    usecases::context::AppContext,
};

pub fn bootstrap(
    config_path: Option<&Path>,
    data_override: Option<&Path>,
) -> Result<AppContext, AppError> {
    let mut context = build_context(&FileConfigAdapter::new(config_path), data_override)?;
    context.log_guard = infra::logging::init(&context.config.logging)?;

    Ok(context)
}

fn build_context(
    config_adapter: &dyn ConfigAdapter,
    data_override: Option<&Path>,
) -> Result<AppContext, AppError> {
    let config = config_adapter.load().map_err(AppError::Other)?;
    let data_file = data_override.unwrap_or(&config.logs.data_file).to_path_buf();
    let logs = JsonTextLogSource::new(data_file);

    Ok(AppContext::new(config, logs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{config::AppConfig, stubs::StubConfigAdapter};

    #[test]
    fn builds_context_with_default_config_when_file_is_missing() {
        let adapter = FileConfigAdapter::new(Some(Path::new("./missing-config.toml")));
        let context = build_context(&adapter, None).expect("context should build from defaults");

        assert_eq!(context.config, AppConfig::default());
        assert_eq!(context.logs.path(), Path::new("text_logs.json"));
    }

    #[test]
    fn data_override_replaces_configured_export() {
        let context = build_context(&StubConfigAdapter, Some(Path::new("/tmp/export.json")))
            .expect("stub config builds");

        assert_eq!(context.logs.path(), Path::new("/tmp/export.json"));
        assert!(context.log_guard.is_none());
    }
}
