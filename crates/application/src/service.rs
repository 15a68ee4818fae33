//! Voting use cases.

use std::sync::Arc;

use common::{CandidateId, SessionId, VoterId};
use domain::{
    Clock, EventPublisher, IdGenerator, RandomIdGenerator, SystemClock, VotingSession,
    VotingSessionEvent, VotingSessionRepository,
};

use crate::error::Result;

/// Service running the voting use cases.
///
/// Every mutating call is load, transition, one save, then publish. A save
/// that loses the optimistic lock fails the call with a retryable error and
/// nothing is published; retrying is left to the caller.
#[derive(Clone)]
pub struct VotingService<R: VotingSessionRepository> {
    repository: R,
    publisher: Arc<dyn EventPublisher>,
    id_generator: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl<R: VotingSessionRepository> VotingService<R> {
    /// Creates a service using random ids and the system clock.
    pub fn new(repository: R, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            repository,
            publisher,
            id_generator: Arc::new(RandomIdGenerator),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the clock used for creation and closing times.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Replaces the generator of new session ids.
    pub fn with_id_generator(mut self, id_generator: impl IdGenerator + 'static) -> Self {
        self.id_generator = Arc::new(id_generator);
        self
    }

    /// Returns a reference to the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Opens a new session and returns its id.
    #[tracing::instrument(skip(self))]
    pub async fn create(&self, name: String, candidates: Vec<CandidateId>) -> Result<SessionId> {
        let mut created = VotingSession::create(
            name,
            candidates,
            self.id_generator.as_ref(),
            self.clock.as_ref(),
        )?;

        let version = self.repository.save(&created.session).await?;
        created.session = created.session.with_version(version);
        let id = created.session.id();

        self.publisher.publish(&VotingSessionEvent::from(created));
        Ok(id)
    }

    /// Records a vote.
    #[tracing::instrument(skip(self))]
    pub async fn vote(
        &self,
        session_id: SessionId,
        candidate_id: CandidateId,
        voter_id: VoterId,
    ) -> Result<()> {
        let session = self.repository.find(session_id).await?;
        let mut voted = session.vote_for(candidate_id, voter_id)?;

        let version = self.repository.save(&voted.session).await?;
        voted.session = voted.session.with_version(version);

        self.publisher.publish(&VotingSessionEvent::from(voted));
        Ok(())
    }

    /// Closes a session for voting.
    #[tracing::instrument(skip(self))]
    pub async fn close(&self, session_id: SessionId) -> Result<()> {
        let session = self.repository.find(session_id).await?;
        let mut closed = session.close(self.clock.as_ref())?;

        let version = self.repository.save(&closed.session).await?;
        closed.session = closed.session.with_version(version);

        self.publisher.publish(&VotingSessionEvent::from(closed));
        Ok(())
    }

    /// Returns the winners of a closed session.
    #[tracing::instrument(skip(self))]
    pub async fn winners(&self, session_id: SessionId) -> Result<Vec<CandidateId>> {
        let session = self.repository.find(session_id).await?;
        Ok(session.winners()?)
    }

    /// Loads a session.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, session_id: SessionId) -> Result<VotingSession> {
        Ok(self.repository.find(session_id).await?)
    }
}
