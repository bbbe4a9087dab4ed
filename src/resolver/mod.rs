//! Identity derivation and classification for email-like records.
//!
//! Everything here is pure and synchronous: no I/O, no shared state,
//! safe to call concurrently from any number of pipelines. The same
//! record resolves to the same identity in every process — the sync
//! job, the send job and the webhook handler must agree.

pub mod address;
pub mod classify;
pub mod envelope;

pub use address::extract_address;
pub use classify::{classify, RecordClass};

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::IdentityError;
use crate::types::{EmailIdentity, EmailRecord, IdentityKind};

/// Message ids shorter than this (after stripping transport decoration)
/// are placeholders from upstreams that truncate or fabricate them;
/// trusting one would merge unrelated messages.
const MIN_MESSAGE_ID_LEN: usize = 8;

/// Derive the stable identity for a record.
///
/// A trustworthy Message-ID wins; otherwise the identity is an envelope
/// id over normalized addresses, subject prefix and UTC day window.
/// Fails with [`IdentityError::InvalidRecord`] when a required field is
/// missing or the date does not parse — the resolver never guesses.
pub fn resolve_identity(record: &EmailRecord) -> Result<EmailIdentity, IdentityError> {
    require_field(&record.to, "to")?;
    require_field(&record.from, "from")?;
    require_field(&record.subject, "subject")?;
    require_field(&record.date, "date")?;

    let date = envelope::parse_date(&record.date).ok_or_else(|| {
        IdentityError::InvalidRecord(format!("unparseable date: {}", record.date))
    })?;

    if let Some(raw) = record.message_id.as_deref() {
        let message_id = raw.trim().trim_matches(|c| c == '<' || c == '>');
        if message_id.len() >= MIN_MESSAGE_ID_LEN {
            return Ok(EmailIdentity {
                id: format!("msg-{}", stable_hash(message_id)),
                kind: IdentityKind::MessageId,
            });
        }
        debug!(message_id = %raw, "Message id too short to trust, deriving envelope id");
    }

    let to = extract_address(&record.to);
    let from = extract_address(&record.from);
    let id = envelope::envelope_id(&to, &from, &record.subject, &date);

    Ok(EmailIdentity {
        id,
        kind: IdentityKind::Envelope,
    })
}

fn require_field(value: &str, name: &str) -> Result<(), IdentityError> {
    if value.trim().is_empty() {
        return Err(IdentityError::InvalidRecord(format!("missing field: {}", name)));
    }
    Ok(())
}

fn stable_hash(input: &str) -> String {
    let hash = Sha256::digest(input.as_bytes());
    format!("{:x}", hash)[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> EmailRecord {
        EmailRecord {
            subject: "info".into(),
            to: "hola@uncodie.com".into(),
            from: "Sergio Prado <sergio@external.com>".into(),
            date: "2025-08-29T22:10:00Z".into(),
            message_id: None,
        }
    }

    #[test]
    fn test_deterministic() {
        let a = resolve_identity(&record()).unwrap();
        let b = resolve_identity(&record()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_message_id_precedence() {
        let mut with_id = record();
        with_id.message_id = Some("complex-message-id-456@company.com".into());

        let identity = resolve_identity(&with_id).unwrap();
        assert!(identity.id.starts_with("msg-"));
        assert_eq!(identity.kind, IdentityKind::MessageId);

        let identity = resolve_identity(&record()).unwrap();
        assert!(identity.id.starts_with("env-"));
        assert_eq!(identity.kind, IdentityKind::Envelope);
    }

    #[test]
    fn test_short_message_id_rejected() {
        let mut rec = record();
        rec.message_id = Some("123".into());

        let identity = resolve_identity(&rec).unwrap();
        assert!(identity.id.starts_with("env-"));
        assert_eq!(identity.kind, IdentityKind::Envelope);
    }

    #[test]
    fn test_brackets_do_not_count_toward_length() {
        let mut rec = record();
        rec.message_id = Some("<123456>".into());

        // 6 usable characters once the brackets are stripped.
        let identity = resolve_identity(&rec).unwrap();
        assert!(identity.id.starts_with("env-"));
    }

    #[test]
    fn test_bracketed_and_bare_message_id_agree() {
        let mut bare = record();
        bare.message_id = Some("complex-message-id-456@company.com".into());
        let mut bracketed = record();
        bracketed.message_id = Some("<complex-message-id-456@company.com>".into());

        assert_eq!(
            resolve_identity(&bare).unwrap(),
            resolve_identity(&bracketed).unwrap()
        );
    }

    #[test]
    fn test_envelope_stable_under_display_name() {
        let mut plain = record();
        plain.to = "test@example.com".into();
        let mut display = record();
        display.to = "Test User <test@example.com>".into();

        assert_eq!(
            resolve_identity(&plain).unwrap().id,
            resolve_identity(&display).unwrap().id
        );
    }

    #[test]
    fn test_envelope_sensitivity() {
        let base = resolve_identity(&record()).unwrap();

        let mut changed = record();
        changed.to = "ventas@uncodie.com".into();
        assert_ne!(base.id, resolve_identity(&changed).unwrap().id);

        let mut changed = record();
        changed.from = "other@external.com".into();
        assert_ne!(base.id, resolve_identity(&changed).unwrap().id);

        let mut changed = record();
        changed.subject = "different".into();
        assert_ne!(base.id, resolve_identity(&changed).unwrap().id);

        let mut changed = record();
        changed.date = "2025-08-30T22:10:00Z".into();
        assert_ne!(base.id, resolve_identity(&changed).unwrap().id);
    }

    #[test]
    fn test_same_day_times_collapse() {
        let morning = resolve_identity(&record()).unwrap();

        let mut evening = record();
        evening.date = "2025-08-29T03:00:00Z".into();
        assert_eq!(morning.id, resolve_identity(&evening).unwrap().id);
    }

    #[test]
    fn test_invalid_record() {
        let mut rec = record();
        rec.date = "not-a-date".into();
        assert!(matches!(
            resolve_identity(&rec),
            Err(IdentityError::InvalidRecord(_))
        ));

        let mut rec = record();
        rec.date = "".into();
        assert!(matches!(
            resolve_identity(&rec),
            Err(IdentityError::InvalidRecord(_))
        ));

        let mut rec = record();
        rec.subject = "   ".into();
        assert!(matches!(
            resolve_identity(&rec),
            Err(IdentityError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_end_to_end_scenario() {
        // No message id: deterministic envelope id with the day window.
        let identity = resolve_identity(&record()).unwrap();
        assert!(identity.id.starts_with("env-"));
        assert!(identity.id.ends_with("-20250829"));

        let again = resolve_identity(&record()).unwrap();
        assert_eq!(identity, again);
    }
}
