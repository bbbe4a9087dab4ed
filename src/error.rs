#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// A required field was missing or the date did not parse. Not
    /// retryable; callers should count and skip the record.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl From<r2d2::Error> for IdentityError {
    fn from(e: r2d2::Error) -> Self {
        IdentityError::Database(e.to_string())
    }
}

impl From<rusqlite::Error> for IdentityError {
    fn from(e: rusqlite::Error) -> Self {
        IdentityError::Database(e.to_string())
    }
}
