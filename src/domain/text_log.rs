use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Delivery status of a single per-recipient record, parsed case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    Sent,
    Delivered,
    Failed,
    Undelivered,
    Pending,
    Queued,
    /// Anything the carrier reported that we do not recognize, lower-cased.
    Unknown(String),
}

impl DeliveryStatus {
    pub fn parse(raw: &str) -> Self {
        let lowered = raw.trim().to_lowercase();
        match lowered.as_str() {
            "sent" => Self::Sent,
            "delivered" => Self::Delivered,
            "failed" => Self::Failed,
            "undelivered" => Self::Undelivered,
            "pending" => Self::Pending,
            "queued" => Self::Queued,
            _ => Self::Unknown(lowered),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Failed => "failed",
            Self::Undelivered => "undelivered",
            Self::Pending => "pending",
            Self::Queued => "queued",
            Self::Unknown(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
}

/// Canonical shape of the loosely-typed `metadata` blob attached to logs and batches.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogMetadata {
    pub all_recipients: Vec<Recipient>,
    pub message: Option<String>,
    pub media_urls: Vec<String>,
}

impl LogMetadata {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(raw) => match serde_json::from_str::<Value>(raw) {
                Ok(parsed @ Value::Object(_)) => Self::from_value(&parsed),
                _ => Self::default(),
            },
            Value::Object(map) => {
                let all_recipients = map
                    .get("allRecipients")
                    .and_then(Value::as_array)
                    .map(|items| {
                        items
                            .iter()
                            .filter_map(|item| {
                                serde_json::from_value::<Recipient>(item.clone()).ok()
                            })
                            .filter(|recipient| !recipient.phone.is_empty())
                            .collect()
                    })
                    .unwrap_or_default();

                let message = map
                    .get("message")
                    .and_then(Value::as_str)
                    .filter(|text| !text.trim().is_empty())
                    .map(str::to_owned);

                let media_urls = map
                    .get("mediaUrls")
                    .map(normalize_media_urls)
                    .unwrap_or_default();

                Self {
                    all_recipients,
                    message,
                    media_urls,
                }
            }
            _ => Self::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.all_recipients.is_empty() && self.message.is_none() && self.media_urls.is_empty()
    }
}

/// Media URLs arrive as a native array, a JSON-encoded array, a bare URL, or null.
pub fn normalize_media_urls(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_owned)
            .collect(),
        Value::String(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Vec::new();
            }

            match serde_json::from_str::<Value>(trimmed) {
                Ok(parsed @ Value::Array(_)) => normalize_media_urls(&parsed),
                _ if trimmed.starts_with("http://") || trimmed.starts_with("https://") => {
                    vec![trimmed.to_owned()]
                }
                _ => Vec::new(),
            }
        }
        _ => Vec::new(),
    }
}

/// A single per-recipient delivery record as stored by the messaging backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextLog {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub message_id: Option<String>,
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub batch_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub recipient_phone: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub message_content: String,
    #[serde(default, deserialize_with = "media_urls_field")]
    pub media_urls: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub sent_at: Option<String>,
    #[serde(default)]
    pub delivered_at: Option<String>,
    #[serde(default, deserialize_with = "metadata_field")]
    pub metadata: LogMetadata,
}

impl TextLog {
    pub fn delivery_status(&self) -> DeliveryStatus {
        DeliveryStatus::parse(&self.status)
    }

    /// A row without a `message_id` cannot be grouped with its siblings.
    pub fn group_key(&self) -> Option<&str> {
        self.message_id.as_deref().filter(|id| !id.is_empty())
    }
}

pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

pub(crate) fn optional_string_or_number<'de, D>(
    deserializer: D,
) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) if text.is_empty() => Ok(None),
        Value::String(text) => Ok(Some(text)),
        Value::Number(number) => Ok(Some(number.to_string())),
        _ => Ok(None),
    }
}

pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

pub(crate) fn media_urls_field<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(normalize_media_urls(&Value::deserialize(deserializer)?))
}

pub(crate) fn metadata_field<'de, D>(deserializer: D) -> Result<LogMetadata, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(LogMetadata::from_value(&Value::deserialize(deserializer)?))
}

#[cfg(test)]
pub(crate) fn log(id: &str, message_id: Option<&str>, phone: &str, status: &str) -> TextLog {
    TextLog {
        id: id.to_owned(),
        message_id: message_id.map(str::to_owned),
        batch_id: None,
        recipient_phone: phone.to_owned(),
        message_content: "Volunteer shift tomorrow".to_owned(),
        media_urls: Vec::new(),
        status: status.to_owned(),
        error_message: None,
        created_at: None,
        sent_at: None,
        delivered_at: None,
        metadata: LogMetadata::default(),
    }
}
