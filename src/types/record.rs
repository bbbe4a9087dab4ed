use serde::{Deserialize, Serialize};

use crate::error::IdentityError;

/// An email-like record as observed by one of the ingestion pipelines.
///
/// Decoupled from transport — IMAP sync polls, send confirmations and
/// inbound webhooks all produce this. `to` and `from` may be bare
/// addresses or display forms (`"Name" <addr>`); the resolver normalizes
/// them before any comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRecord {
    pub subject: String,
    pub to: String,
    pub from: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

impl EmailRecord {
    /// Parse a webhook-shaped JSON payload into a record.
    pub fn from_json(payload: &str) -> Result<Self, IdentityError> {
        serde_json::from_str(payload)
            .map_err(|e| IdentityError::InvalidRecord(format!("bad JSON payload: {}", e)))
    }

    /// Build a record from a raw RFC 2822 header block, as returned by
    /// `BODY.PEEK[HEADER.FIELDS (From To Subject Date Message-ID)]`.
    ///
    /// Returns `None` when any of From/To/Subject/Date is absent; a
    /// record missing those cannot be resolved anyway.
    pub fn from_header_block(header_text: &str) -> Option<Self> {
        let mut from = None;
        let mut to = None;
        let mut subject = None;
        let mut date = None;
        let mut message_id = None;

        for line in reassemble_folded_headers(header_text) {
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            match name.trim().to_lowercase().as_str() {
                "from" => from = Some(decode_rfc2047(value)),
                "to" => to = Some(decode_rfc2047(value)),
                "subject" => subject = Some(decode_rfc2047(value)),
                "date" => date = Some(value.to_string()),
                "message-id" => {
                    let id = value.trim_matches(|c| c == '<' || c == '>').to_string();
                    if !id.is_empty() {
                        message_id = Some(id);
                    }
                }
                _ => {}
            }
        }

        Some(EmailRecord {
            subject: subject?,
            to: to?,
            from: from?,
            date: date?,
            message_id,
        })
    }
}

/// RFC 2822 headers can be folded across multiple lines.
/// A continuation line starts with whitespace.
fn reassemble_folded_headers(text: &str) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();

    for line in text.lines() {
        if line.starts_with(' ') || line.starts_with('\t') {
            // Continuation of previous header
            if let Some(last) = headers.last_mut() {
                last.push(' ');
                last.push_str(line.trim());
            }
        } else if !line.is_empty() {
            headers.push(line.to_string());
        }
    }

    headers
}

fn decode_rfc2047(input: &str) -> String {
    let fake_header = format!("X: {}", input);
    match mailparse::parse_header(fake_header.as_bytes()) {
        Ok((header, _)) => header.get_value(),
        Err(_) => input.to_string(),
    }
}
