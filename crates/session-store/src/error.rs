use domain::{RepositoryError, UnknownStatus};
use thiserror::Error;

/// Low-level failures of the storage adapters.
///
/// Surfaced to callers as [`RepositoryError::Backend`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The votes column could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored row carries a status this version does not know.
    #[error("Corrupt row: {0}")]
    UnknownStatus(#[from] UnknownStatus),
}

impl From<StoreError> for RepositoryError {
    fn from(err: StoreError) -> Self {
        RepositoryError::backend(err)
    }
}

/// Result type for adapter internals.
pub type Result<T> = std::result::Result<T, StoreError>;
