//! Ingestion pipeline: resolve, classify, dedup-check, process, record.
//!
//! The ordering is the failure-safety property of the whole scheme: an
//! identity is recorded as seen only after downstream processing
//! succeeds, so a failed record stays eligible for retry instead of
//! being silently dropped forever.

use std::collections::HashSet;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::AliasConfig;
use crate::error::IdentityError;
use crate::resolver::{classify, resolve_identity, RecordClass};
use crate::types::{EmailIdentity, EmailRecord};

/// Which pipeline observed the record. All three must derive identical
/// identities for the same logical message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestSource {
    SyncPoll,
    SendConfirmation,
    InboundWebhook,
}

impl IngestSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SyncPoll => "sync_poll",
            Self::SendConfirmation => "send_confirmation",
            Self::InboundWebhook => "inbound_webhook",
        }
    }
}

/// Membership view over previously-accepted identities, scoped per
/// tenant. Persistence and eviction belong to the implementation; the
/// pipeline only queries membership and records ids after successful
/// processing.
pub trait SeenIdStore {
    fn has(&self, id: &str) -> Result<bool, IdentityError>;
    fn add(&self, id: &str) -> Result<(), IdentityError>;
}

/// HashSet-backed store for tests and single-process pipelines.
#[derive(Debug, Default)]
pub struct InMemorySeenIds {
    ids: RwLock<HashSet<String>>,
}

impl InMemorySeenIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ids.read().map(|ids| ids.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SeenIdStore for InMemorySeenIds {
    fn has(&self, id: &str) -> Result<bool, IdentityError> {
        let ids = self
            .ids
            .read()
            .map_err(|_| IdentityError::Database("seen-id set lock poisoned".into()))?;
        Ok(ids.contains(id))
    }

    fn add(&self, id: &str) -> Result<(), IdentityError> {
        let mut ids = self
            .ids
            .write()
            .map_err(|_| IdentityError::Database("seen-id set lock poisoned".into()))?;
        ids.insert(id.to_string());
        Ok(())
    }
}

/// What happened to one record.
#[derive(Debug, Clone)]
pub enum IngestOutcome {
    /// Record was new; the process callback ran and the id was recorded.
    Processed {
        identity: EmailIdentity,
        class: RecordClass,
    },
    /// Identity was already in the seen set; nothing ran.
    Duplicate { identity: EmailIdentity },
    /// Sender and recipient matched; dropped before the duplicate check.
    SelfSent { identity: EmailIdentity },
}

/// Run one record through the pipeline.
///
/// `process` is the caller's downstream effect (persist, notify, reply).
/// It runs at most once per identity per store, and its failure
/// propagates without the id being recorded.
pub fn ingest<S, F>(
    store: &S,
    config: &AliasConfig,
    record: &EmailRecord,
    source: IngestSource,
    mut process: F,
) -> Result<IngestOutcome, IdentityError>
where
    S: SeenIdStore + ?Sized,
    F: FnMut(&EmailRecord, &EmailIdentity, RecordClass) -> Result<(), IdentityError>,
{
    let identity = resolve_identity(record)?;
    let class = classify(record, config);

    if class == RecordClass::SelfSent {
        debug!(id = %identity.id, source = source.as_str(), "Dropping self-sent record");
        return Ok(IngestOutcome::SelfSent { identity });
    }

    if store.has(&identity.id)? {
        debug!(id = %identity.id, source = source.as_str(), "Skipping duplicate record");
        return Ok(IngestOutcome::Duplicate { identity });
    }

    process(record, &identity, class)?;
    store.add(&identity.id)?;

    Ok(IngestOutcome::Processed { identity, class })
}

/// Per-batch outcome counts.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct BatchReport {
    pub processed: usize,
    pub duplicates: usize,
    pub self_sent: usize,
    pub invalid: usize,
}

/// Ingest a batch of records, tolerating bad upstream data.
///
/// Invalid records are counted and logged as a data-quality signal, not
/// an abort; store failures still abort because every later decision
/// would be made against unknown state.
pub fn ingest_batch<S, F>(
    store: &S,
    config: &AliasConfig,
    records: &[EmailRecord],
    source: IngestSource,
    mut process: F,
) -> Result<BatchReport, IdentityError>
where
    S: SeenIdStore + ?Sized,
    F: FnMut(&EmailRecord, &EmailIdentity, RecordClass) -> Result<(), IdentityError>,
{
    let batch_id = Uuid::new_v4();
    let mut report = BatchReport::default();

    for record in records {
        match ingest(store, config, record, source, &mut process) {
            Ok(IngestOutcome::Processed { .. }) => report.processed += 1,
            Ok(IngestOutcome::Duplicate { .. }) => report.duplicates += 1,
            Ok(IngestOutcome::SelfSent { .. }) => report.self_sent += 1,
            Err(IdentityError::InvalidRecord(reason)) => {
                warn!(batch = %batch_id, %reason, "Skipping invalid record");
                report.invalid += 1;
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        batch = %batch_id,
        source = source.as_str(),
        processed = report.processed,
        duplicates = report.duplicates,
        self_sent = report.self_sent,
        invalid = report.invalid,
        "Batch ingest complete"
    );

    Ok(report)
}
