use serde::{Deserialize, Serialize};

/// How the identifier was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityKind {
    /// Derived from a trustworthy Message-ID header (`msg-` prefix).
    MessageId,
    /// Derived from normalized addresses, subject and day window
    /// (`env-` prefix).
    Envelope,
}

/// Stable identifier for an email record, suitable for deduplication
/// across independently-fed pipelines.
///
/// Derived once per record and never mutated. Two records that are
/// semantically the same message yield the same identity, regardless of
/// which pipeline observed them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailIdentity {
    pub id: String,
    pub kind: IdentityKind,
}

impl std::fmt::Display for EmailIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id)
    }
}
