use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{SessionId, Version};
use domain::{RepositoryError, VotingSession, VotingSessionRepository};
use tokio::sync::RwLock;

use crate::store::expect_single_row;

/// In-memory voting session repository.
///
/// Applies the same compare-and-increment rules as the PostgreSQL
/// implementation; cloning shares the underlying map.
#[derive(Clone, Default)]
pub struct InMemorySessionRepository {
    sessions: Arc<RwLock<HashMap<SessionId, VotingSession>>>,
}

impl InMemorySessionRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Removes all sessions.
    pub async fn clear(&self) {
        self.sessions.write().await.clear();
    }
}

#[async_trait]
impl VotingSessionRepository for InMemorySessionRepository {
    async fn find(&self, id: SessionId) -> Result<VotingSession, RepositoryError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound(id))
    }

    async fn save(&self, session: &VotingSession) -> Result<Version, RepositoryError> {
        let id = session.id();
        let mut sessions = self.sessions.write().await;

        let stored_version = sessions.get(&id).map(VotingSession::version);

        // Mirrors the affected-row count of the SQL statements.
        let (rows, new_version) = if session.version().is_initial() {
            let rows = if stored_version.is_none() { 1 } else { 0 };
            (rows, Version::first())
        } else {
            let rows = if stored_version == Some(session.version()) {
                1
            } else {
                0
            };
            (rows, session.version().next())
        };

        expect_single_row(id, rows)?;

        sessions.insert(id, session.with_version(new_version));
        tracing::debug!(voting_session_id = %id, version = %new_version, "voting session saved");
        Ok(new_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{CandidateId, VoterId, VotingStatus};

    fn new_session() -> VotingSession {
        VotingSession::builder()
            .name("Test Voting Session")
            .candidates(vec![CandidateId::new(), CandidateId::new()])
            .build()
    }

    #[tokio::test]
    async fn save_new_session_stores_version_one() {
        let repo = InMemorySessionRepository::new();
        let session = new_session();

        let version = repo.save(&session).await.unwrap();
        assert_eq!(version, Version::first());

        let found = repo.find(session.id()).await.unwrap();
        assert_eq!(found, session.with_version(Version::first()));
        assert_eq!(repo.session_count().await, 1);
    }

    #[tokio::test]
    async fn find_unknown_session_is_not_found() {
        let repo = InMemorySessionRepository::new();
        let id = SessionId::new();

        let result = repo.find(id).await;
        assert!(matches!(result, Err(RepositoryError::NotFound(missing)) if missing == id));
    }

    #[tokio::test]
    async fn update_bumps_version() {
        let repo = InMemorySessionRepository::new();
        let session = new_session();
        repo.save(&session).await.unwrap();

        let loaded = repo.find(session.id()).await.unwrap();
        let candidate = loaded.candidates()[0];
        let voted = loaded.vote_for(candidate, VoterId::new()).unwrap().session;

        let version = repo.save(&voted).await.unwrap();
        assert_eq!(version, Version::new(2));

        let found = repo.find(session.id()).await.unwrap();
        assert_eq!(found.version(), Version::new(2));
        assert_eq!(found.votes_for(candidate).len(), 1);
    }

    #[tokio::test]
    async fn stale_version_is_a_conflict() {
        let repo = InMemorySessionRepository::new();
        let session = new_session();
        repo.save(&session).await.unwrap();
        let loaded = repo.find(session.id()).await.unwrap();

        let wrong = loaded.with_version(Version::new(3));
        let result = repo.save(&wrong).await;

        assert!(matches!(result, Err(RepositoryError::OptimisticLockingConflict(_))));
        let found = repo.find(session.id()).await.unwrap();
        assert_eq!(found.version(), Version::first());
    }

    #[tokio::test]
    async fn inserting_an_existing_id_is_a_conflict() {
        let repo = InMemorySessionRepository::new();
        let session = new_session();
        repo.save(&session).await.unwrap();

        let result = repo.save(&session).await;
        assert!(matches!(result, Err(RepositoryError::OptimisticLockingConflict(_))));
    }

    #[tokio::test]
    async fn updating_a_missing_session_is_a_conflict() {
        let repo = InMemorySessionRepository::new();
        let session = new_session().with_version(Version::new(4));

        let result = repo.save(&session).await;
        assert!(matches!(result, Err(RepositoryError::OptimisticLockingConflict(_))));
        assert_eq!(repo.session_count().await, 0);
    }

    #[tokio::test]
    async fn racing_saves_from_same_base_have_one_winner() {
        let repo = InMemorySessionRepository::new();
        let session = new_session();
        repo.save(&session).await.unwrap();

        let first = repo.find(session.id()).await.unwrap();
        let second = repo.find(session.id()).await.unwrap();
        let candidate = first.candidates()[0];

        let a = first.vote_for(candidate, VoterId::new()).unwrap().session;
        let b = second.close(&domain::SystemClock).unwrap().session;

        assert_eq!(repo.save(&a).await.unwrap(), Version::new(2));
        assert!(repo.save(&b).await.unwrap_err().is_conflict());

        let found = repo.find(session.id()).await.unwrap();
        assert_eq!(found.status(), VotingStatus::Open);
        assert_eq!(found.total_votes(), 1);
    }

    #[tokio::test]
    async fn clones_share_state() {
        let repo = InMemorySessionRepository::new();
        let other = repo.clone();
        let session = new_session();

        repo.save(&session).await.unwrap();
        assert!(other.find(session.id()).await.is_ok());

        other.clear().await;
        assert_eq!(repo.session_count().await, 0);
    }
}
