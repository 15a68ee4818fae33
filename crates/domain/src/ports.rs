//! Outbound ports of the voting domain.
//!
//! The domain only talks to storage, event delivery, time and id allocation
//! through these traits; adapters live in other crates.

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use common::{SessionId, Version};

use crate::error::RepositoryError;
use crate::session::{VotingSession, VotingSessionEvent};

/// Storage for voting sessions with optimistic concurrency control.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait VotingSessionRepository: Send + Sync {
    /// Loads the latest stored revision of a session.
    ///
    /// Fails with `NotFound` if no session has this id.
    async fn find(&self, id: SessionId) -> Result<VotingSession, RepositoryError>;

    /// Stores a revision of a session and returns the version it was stored at.
    ///
    /// A session at version 0 is inserted at version 1. Any other session is
    /// written only if the stored version still equals `session.version()`,
    /// bumping it by one; otherwise the save fails with
    /// `OptimisticLockingConflict` and nothing is written.
    async fn save(&self, session: &VotingSession) -> Result<Version, RepositoryError>;
}

/// Fire-and-forget delivery of domain events to in-process listeners.
///
/// Publishing never fails from the caller's point of view: a lost event must
/// not undo or fail the transition that produced it.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: &VotingSessionEvent);
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

impl<F> Clock for F
where
    F: Fn() -> DateTime<Utc> + Send + Sync,
{
    fn now(&self) -> DateTime<Utc> {
        self()
    }
}

/// System UTC clock, truncated to microseconds so an instant survives a
/// round trip through a `timestamptz` column unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(6)
    }
}

/// Clock frozen at a single instant, for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Allocator of fresh session identifiers.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> SessionId;
}

impl<F> IdGenerator for F
where
    F: Fn() -> SessionId + Send + Sync,
{
    fn next_id(&self) -> SessionId {
        self()
    }
}

/// Generates random (UUID v4) session ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn next_id(&self) -> SessionId {
        SessionId::new()
    }
}
