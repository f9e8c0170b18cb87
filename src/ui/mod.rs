//! Presentation layer: plain-text rendering of derived views.

pub mod format;
pub mod text_log_view;

/// Returns the ui module name for smoke checks.
pub fn module_name() -> &'static str {
    "ui"
}
