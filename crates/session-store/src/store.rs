use common::SessionId;
use domain::RepositoryError;

/// Interprets the number of rows touched by a version-conditioned write.
///
/// Exactly one row is success. Zero means another writer got there first.
/// More than one means the adapter matched rows it should not have and is
/// reported as fatal rather than as a retryable conflict.
pub fn expect_single_row(id: SessionId, rows: u64) -> Result<(), RepositoryError> {
    match rows {
        1 => Ok(()),
        0 => {
            metrics::counter!("voting_session_save_conflicts_total").increment(1);
            tracing::warn!(voting_session_id = %id, "optimistic locking conflict");
            Err(RepositoryError::OptimisticLockingConflict(id))
        }
        rows => {
            tracing::error!(voting_session_id = %id, rows, "conditional write hit several rows");
            Err(RepositoryError::UnexpectedRowCount { id, rows })
        }
    }
}
