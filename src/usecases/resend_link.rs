//! Builds links that reopen the send page prefilled from a previous message.

use crate::domain::{grouping::GroupedLog, text_log::TextLog};

/// The pieces of a past send needed to prefill the send form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResendDraft {
    pub phones: Vec<String>,
    pub message: String,
    pub media_urls: Vec<String>,
}

impl ResendDraft {
    pub fn from_log(log: &TextLog) -> Self {
        let phones = if log.metadata.all_recipients.is_empty() {
            vec![log.recipient_phone.clone()]
        } else {
            log.metadata
                .all_recipients
                .iter()
                .map(|recipient| recipient.phone.clone())
                .collect()
        };

        Self {
            phones,
            message: log
                .metadata
                .message
                .clone()
                .unwrap_or_else(|| log.message_content.clone()),
            media_urls: preferred_media(&log.metadata.media_urls, &log.media_urls),
        }
    }

    pub fn from_group(group: &GroupedLog) -> Self {
        let phones = if group.metadata.all_recipients.is_empty() {
            group.recipients.clone()
        } else {
            group
                .metadata
                .all_recipients
                .iter()
                .map(|recipient| recipient.phone.clone())
                .collect()
        };

        Self {
            phones,
            message: group
                .metadata
                .message
                .clone()
                .unwrap_or_else(|| group.message_content.clone()),
            media_urls: preferred_media(&group.metadata.media_urls, &group.media_urls),
        }
    }
}

fn preferred_media(from_metadata: &[String], from_log: &[String]) -> Vec<String> {
    if from_metadata.is_empty() {
        from_log.to_vec()
    } else {
        from_metadata.to_vec()
    }
}

/// `<base>?phone=<csv>&message=<text>[&mediaUrls=<json>]`, every value percent-encoded.
pub fn create_resend_link(base_url: &str, draft: &ResendDraft) -> String {
    let mut phones: Vec<&str> = Vec::new();
    for phone in draft.phones.iter().map(|phone| phone.trim()) {
        if !phone.is_empty() && !phones.contains(&phone) {
            phones.push(phone);
        }
    }

    let mut link = format!(
        "{}?phone={}&message={}",
        base_url.trim_end_matches('?'),
        urlencoding::encode(&phones.join(",")),
        urlencoding::encode(&draft.message)
    );

    if !draft.media_urls.is_empty() {
        let media = serde_json::to_string(&draft.media_urls).unwrap_or_else(|_| "[]".to_owned());
        link.push_str("&mediaUrls=");
        link.push_str(&urlencoding::encode(&media));
    }

    link
}
