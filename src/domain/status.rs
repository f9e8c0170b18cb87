//! Display classification for raw delivery and batch status strings.
//!
//! Every function here is total over an open string domain: values we do not
//! recognize fall through to the neutral branch instead of failing.

/// Color bucket a status renders with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Success,
    Warning,
    Error,
    Neutral,
}

impl StatusTone {
    pub fn as_label(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Neutral => "default",
        }
    }
}

/// Glyph a status renders with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusIcon {
    Check,
    Clock,
    Cross,
    Message,
}

impl StatusIcon {
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Check => "✓",
            Self::Clock => "…",
            Self::Cross => "✗",
            Self::Message => "✉",
        }
    }
}

pub fn status_tone(status: &str) -> StatusTone {
    match status.trim().to_lowercase().as_str() {
        "delivered" | "completed" => StatusTone::Success,
        "sent" | "in_progress" => StatusTone::Warning,
        "failed" | "undelivered" => StatusTone::Error,
        _ => StatusTone::Neutral,
    }
}

pub fn status_icon(status: &str) -> StatusIcon {
    match status_tone(status) {
        StatusTone::Success => StatusIcon::Check,
        StatusTone::Warning => StatusIcon::Clock,
        StatusTone::Error => StatusIcon::Cross,
        StatusTone::Neutral => StatusIcon::Message,
    }
}

/// `sent` only means "handed to the carrier", so it is shown as pending.
pub fn display_status(status: &str) -> String {
    let lowered = status.trim().to_lowercase();
    if lowered == "sent" {
        "pending".to_owned()
    } else {
        lowered
    }
}

/// Batch rollups report `in_progress` when recipients ended in different states.
pub fn batch_status(status: &str) -> String {
    let lowered = status.trim().to_lowercase();
    if lowered == "in_progress" {
        "mixed results".to_owned()
    } else {
        lowered
    }
}
