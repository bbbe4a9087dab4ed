use serde::{Deserialize, Serialize};

use super::address::extract_address;
use crate::config::AliasConfig;
use crate::types::EmailRecord;

/// Routing class of an inbound record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordClass {
    /// Sender and recipient are the same mailbox — a loop or a
    /// misconfigured relay echo. Callers typically drop these.
    SelfSent,
    /// Recipient is a shared/catch-all tenant address. Routed
    /// differently (team fan-out), not dropped.
    Alias,
    /// Person-specific correspondence.
    Normal,
}

impl RecordClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SelfSent => "self_sent",
            Self::Alias => "alias",
            Self::Normal => "normal",
        }
    }
}

/// Classify a record against a tenant's alias configuration.
///
/// Pure function over its inputs. Precedence: self-sent, then alias,
/// then normal. An address that never resolved to something containing
/// `@` is unusable for either comparison and falls through to normal.
pub fn classify(record: &EmailRecord, config: &AliasConfig) -> RecordClass {
    let to = extract_address(&record.to);
    let from = extract_address(&record.from);

    let to_usable = to.contains('@');
    let from_usable = from.contains('@');

    if to_usable && from_usable && to == from {
        return RecordClass::SelfSent;
    }

    if to_usable && config.is_alias(&to) {
        return RecordClass::Alias;
    }

    RecordClass::Normal
}
