//! Email identity resolution and deduplication.
//!
//! Derives stable identifiers for email-like records observed by
//! independently-fed pipelines (IMAP sync polls, outbound send
//! confirmations, inbound webhooks) and classifies them (alias-addressed,
//! self-sent, duplicate) so callers can decide whether downstream
//! processing should proceed.
//!
//! ## Module Organization
//!
//! - `resolver/`: identity derivation and classification (pure logic)
//! - `types/`: record and identity values
//! - `services/`: ingestion pipeline and seen-id store contract
//! - `adapters/`: sqlite-backed seen-id store
//! - `config/`: per-tenant alias configuration
//! - `encryption`: tenant token cipher with historical-key rotation

pub mod adapters;
pub mod config;
pub mod encryption;
pub mod error;
pub mod resolver;
pub mod services;
pub mod types;

pub use config::{AliasConfig, IdentityConfig};
pub use error::IdentityError;
pub use resolver::{classify, extract_address, resolve_identity, RecordClass};
pub use services::ingest::{
    ingest, ingest_batch, BatchReport, InMemorySeenIds, IngestOutcome, IngestSource, SeenIdStore,
};
pub use types::{EmailIdentity, EmailRecord, IdentityKind};
