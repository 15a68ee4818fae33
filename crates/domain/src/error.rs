//! Infrastructure error types surfaced through the repository port.

use common::SessionId;
use thiserror::Error;

/// Errors returned by voting session repositories.
///
/// These are kept apart from [`VotingSessionError`](crate::VotingSessionError):
/// they describe the storage, not a rejected transition.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No session is stored under this id.
    #[error("Voting session with id = '{0}' not found")]
    NotFound(SessionId),

    /// The stored version moved since the session was read.
    #[error(
        "Failed to update voting session with id = '{0}', possibly due to a concurrent modification"
    )]
    OptimisticLockingConflict(SessionId),

    /// A version-conditioned write touched more than one row.
    #[error("Conditional write of voting session {id} affected {rows} rows")]
    UnexpectedRowCount { id: SessionId, rows: u64 },

    /// The storage backend failed (connection, query or decoding).
    #[error("Storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl RepositoryError {
    /// Wraps any backend failure.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        RepositoryError::Backend(Box::new(err))
    }

    /// Returns true if the failure is a concurrent-modification race that a
    /// caller may resolve by reloading and reapplying.
    pub fn is_conflict(&self) -> bool {
        matches!(self, RepositoryError::OptimisticLockingConflict(_))
    }
}
