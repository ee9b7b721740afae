use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid argument: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("No scores found for nickname '{0}'.")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    /// True when the pool could not hand out a connection at all, as opposed
    /// to a statement failing on a live connection.
    pub fn is_connection_failure(&self) -> bool {
        matches!(
            self,
            StorageError::Unavailable(_)
                | StorageError::Database(
                    sqlx::Error::Io(_)
                        | sqlx::Error::Tls(_)
                        | sqlx::Error::PoolTimedOut
                        | sqlx::Error::PoolClosed
                )
        )
    }
}
