//! Service error types.

use domain::{RepositoryError, VotingSessionError};
use thiserror::Error;

/// Errors returned by voting use cases.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The transition was rejected by the session's rules.
    #[error(transparent)]
    Domain(#[from] VotingSessionError),

    /// Loading or saving the session failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ServiceError {
    /// Returns true if reloading the session and repeating the call may
    /// succeed, i.e. the save lost an optimistic locking race.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ServiceError::Repository(err) if err.is_conflict())
    }
}

/// Convenience type alias for service results.
pub type Result<T> = std::result::Result<T, ServiceError>;
