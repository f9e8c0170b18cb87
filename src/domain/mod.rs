//! Domain layer: core entities and business rules.

pub mod attendance;
pub mod autosave;
pub mod batch;
pub mod contact;
pub mod grouping;
pub mod project;
pub mod status;
pub mod text_log;

/// Returns the domain module name for smoke checks.
pub fn module_name() -> &'static str {
    "domain"
}
