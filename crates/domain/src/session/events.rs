//! Voting session domain events.

use common::{CandidateId, SessionId, VoterId};
use serde::{Deserialize, Serialize};

use super::VotingSession;

/// Events emitted by successful voting session transitions.
///
/// Each variant carries the session as it is after the transition. Events are
/// used for side-channel notification only, never to rebuild state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum VotingSessionEvent {
    /// A session was created.
    Created(CreatedData),

    /// A vote was cast.
    Voted(VotedData),

    /// A session was closed.
    Closed(ClosedData),
}

impl VotingSessionEvent {
    /// Returns the event type name.
    pub fn event_type(&self) -> &'static str {
        match self {
            VotingSessionEvent::Created(_) => "Created",
            VotingSessionEvent::Voted(_) => "Voted",
            VotingSessionEvent::Closed(_) => "Closed",
        }
    }

    /// Returns the post-transition session.
    pub fn session(&self) -> &VotingSession {
        match self {
            VotingSessionEvent::Created(data) => &data.session,
            VotingSessionEvent::Voted(data) => &data.session,
            VotingSessionEvent::Closed(data) => &data.session,
        }
    }

    /// Returns the id of the session the event belongs to.
    pub fn session_id(&self) -> SessionId {
        self.session().id()
    }
}

/// Data for the Created event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedData {
    /// The newly created, not yet persisted session.
    pub session: VotingSession,
}

/// Data for the Voted event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotedData {
    /// The session including the new vote.
    pub session: VotingSession,

    /// The candidate that received the vote.
    pub candidate_id: CandidateId,

    /// The voter who cast it.
    pub voter_id: VoterId,
}

/// Data for the Closed event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosedData {
    /// The closed session.
    pub session: VotingSession,
}

impl From<CreatedData> for VotingSessionEvent {
    fn from(data: CreatedData) -> Self {
        VotingSessionEvent::Created(data)
    }
}

impl From<VotedData> for VotingSessionEvent {
    fn from(data: VotedData) -> Self {
        VotingSessionEvent::Voted(data)
    }
}

impl From<ClosedData> for VotingSessionEvent {
    fn from(data: ClosedData) -> Self {
        VotingSessionEvent::Closed(data)
    }
}
