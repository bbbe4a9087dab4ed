use rusqlite::{params, OptionalExtension};

use super::DbPool;
use crate::error::IdentityError;
use crate::services::ingest::{IngestSource, SeenIdStore};

/// Sqlite-backed seen-id set, scoped to one tenant and one pipeline.
///
/// Handles are cheap — the pool is shared — so each pipeline constructs
/// its own with the source it reports under.
pub struct SqliteSeenIds {
    pool: DbPool,
    site_id: String,
    source: IngestSource,
}

impl SqliteSeenIds {
    pub fn new(pool: DbPool, site_id: impl Into<String>, source: IngestSource) -> Self {
        Self {
            pool,
            site_id: site_id.into(),
            source,
        }
    }

    /// Atomic insert-if-absent. Returns true when this call was the
    /// first to record the id.
    ///
    /// For pipelines wanting at-most-once semantics under races, the
    /// insert's success is the single source of truth for "am I the
    /// first to see this" — not a separate read followed by a write.
    pub fn claim(&self, id: &str) -> Result<bool, IdentityError> {
        let conn = self.pool.get()?;
        let now = chrono::Utc::now().timestamp_millis();

        let inserted = conn.execute(
            "INSERT OR IGNORE INTO seen_ids (site_id, identity_id, source, seen_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![self.site_id, id, self.source.as_str(), now],
        )?;

        Ok(inserted > 0)
    }
}

impl SeenIdStore for SqliteSeenIds {
    fn has(&self, id: &str) -> Result<bool, IdentityError> {
        let conn = self.pool.get()?;

        let row = conn
            .query_row(
                "SELECT 1 FROM seen_ids WHERE site_id = ?1 AND identity_id = ?2",
                params![self.site_id, id],
                |_| Ok(()),
            )
            .optional()?;

        Ok(row.is_some())
    }

    fn add(&self, id: &str) -> Result<(), IdentityError> {
        self.claim(id).map(|_| ())
    }
}
