use anyhow::Result;

use crate::infra::{
    config::AppConfig,
    contracts::{ConfigAdapter, ExternalOpener},
};

#[derive(Debug, Clone, Default)]
pub struct StubConfigAdapter;

impl ConfigAdapter for StubConfigAdapter {
    fn load(&self) -> Result<AppConfig> {
        Ok(AppConfig::default())
    }
}

/// Records links instead of launching anything.
#[derive(Debug, Default)]
pub struct NoopOpener {
    pub opened: std::cell::RefCell<Vec<String>>,
}

impl ExternalOpener for NoopOpener {
    fn open(&self, target: &str) -> Result<()> {
        self.opened.borrow_mut().push(target.to_owned());
        Ok(())
    }
}

mod tests {
    use super::*;

    #[test]
    fn stub_config_returns_defaults() {
        let adapter = StubConfigAdapter;
        let config = adapter.load().expect("stub config must load");

        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn noop_opener_records_targets() {
        let opener = NoopOpener::default();
        opener.open("https://desk.example").expect("noop open");

        assert_eq!(*opener.opened.borrow(), vec!["https://desk.example"]);
    }
}
