//! Infrastructure layer: adapters for config, storage, and OS integrations.

pub mod attendance_store;
pub mod config;
pub mod contracts;
pub mod error;
pub mod json_source;
pub mod logging;
pub mod opener;
pub mod pii;
#[cfg(test)]
pub mod stubs;

/// Returns the infra module name for smoke checks.
pub fn module_name() -> &'static str {
    "infra"
}
