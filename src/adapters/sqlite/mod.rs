pub mod pool;
pub mod schema;
pub mod seen_ids;

// Re-export the pool type so callers can do `use ...::sqlite::DbPool`
// instead of `use ...::sqlite::pool::DbPool`
pub use pool::DbPool;
pub use seen_ids::SqliteSeenIds;
