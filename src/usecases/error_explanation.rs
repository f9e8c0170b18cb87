//! Plain-language explanations for carrier error messages.

use once_cell::sync::Lazy;
use regex::Regex;

const SEARCH_URL_BASE: &str = "https://www.google.com/search?q=";

static ERROR_CODE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{5})\b").expect("error code pattern is valid"));

const KNOWN_ERROR_CODES: &[(&str, &str)] = &[
    (
        "21211",
        "The phone number is not a valid mobile number. Check it for typos.",
    ),
    (
        "21408",
        "Messaging to this region is not enabled for the sending account.",
    ),
    (
        "21610",
        "The recipient replied STOP and has unsubscribed from these messages.",
    ),
    (
        "21614",
        "The number is not a mobile number and cannot receive text messages.",
    ),
    (
        "30003",
        "The recipient's phone is unreachable: it may be off or out of service.",
    ),
    (
        "30004",
        "The message was blocked, possibly by the recipient or their carrier.",
    ),
    (
        "30005",
        "The number does not exist or is no longer in service.",
    ),
    (
        "30006",
        "The number is a landline or the carrier cannot deliver texts to it.",
    ),
    (
        "30007",
        "The carrier filtered this message as possible spam.",
    ),
    (
        "30008",
        "Delivery failed for an unknown reason reported by the carrier.",
    ),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorExplanation {
    Known {
        code: String,
        explanation: &'static str,
        raw: String,
    },
    Unexplained {
        code: Option<String>,
        raw: String,
        search_url: String,
    },
}

impl ErrorExplanation {
    pub fn summary(&self) -> String {
        match self {
            Self::Known {
                code, explanation, ..
            } => format!("Error {code}: {explanation}"),
            Self::Unexplained {
                raw, search_url, ..
            } => format!("{raw} (look it up: {search_url})"),
        }
    }
}

pub fn extract_error_code(raw: &str) -> Option<String> {
    ERROR_CODE_PATTERN
        .captures(raw)
        .and_then(|captures| captures.get(1))
        .map(|code| code.as_str().to_owned())
}

pub fn lookup_error_code(code: &str) -> Option<&'static str> {
    KNOWN_ERROR_CODES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, explanation)| *explanation)
}

pub fn explain_error(raw: &str) -> ErrorExplanation {
    let raw = raw.trim().to_owned();
    let code = extract_error_code(&raw);

    if let Some(explanation) = code.as_deref().and_then(lookup_error_code) {
        return ErrorExplanation::Known {
            code: code.unwrap_or_default(),
            explanation,
            raw,
        };
    }

    let query = match &code {
        Some(code) => format!("{code} sms error"),
        None => raw.clone(),
    };

    ErrorExplanation::Unexplained {
        code,
        search_url: format!("{SEARCH_URL_BASE}{}", urlencoding::encode(&query)),
        raw,
    }
}
