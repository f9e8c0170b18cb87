//! Use case layer: application workflows and orchestration.

pub mod attendance_autosave;
pub mod batch_details;
pub mod bootstrap;
pub mod contacts_csv;
pub mod context;
pub mod error_explanation;
pub mod individual_messages;
pub mod load_text_logs;
pub mod project_report;
pub mod resend_link;

/// Returns the usecases module name for smoke checks.
pub fn module_name() -> &'static str {
    "usecases"
}
