use rusqlite::Connection;

use crate::error::IdentityError;

pub fn initialize_schema(conn: &Connection) -> Result<(), IdentityError> {
    conn.execute_batch("
        -- Identities already accepted by some pipeline, scoped per tenant.
        -- Eviction is the operator's concern; rows are tiny.
        CREATE TABLE IF NOT EXISTS seen_ids (
            site_id     TEXT NOT NULL,
            identity_id TEXT NOT NULL,      -- msg-* or env-* identifier
            source      TEXT NOT NULL,      -- pipeline that recorded it first
            seen_at     INTEGER NOT NULL,   -- unix epoch ms
            PRIMARY KEY (site_id, identity_id)
        );

        CREATE INDEX IF NOT EXISTS idx_seen_ids_seen_at ON seen_ids(site_id, seen_at);
    ")?;

    Ok(())
}
