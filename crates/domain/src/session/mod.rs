//! Voting session aggregate and related types.

mod aggregate;
mod events;
mod state;

pub use aggregate::{VotingSession, VotingSessionBuilder};
pub use events::{ClosedData, CreatedData, VotedData, VotingSessionEvent};
pub use state::{UnknownStatus, VotingStatus};

use thiserror::Error;

/// Rejections of a requested voting session transition.
///
/// None of these are ever partially applied: the session is left unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum VotingSessionError {
    /// The session is closed and no longer accepts the transition.
    #[error("Voting session is closed")]
    VotingClosed,

    /// The candidate is not part of the session.
    #[error("Candidate is not present in the voting session")]
    NotPresentCandidateId,

    /// The voter already cast a ballot in this session.
    #[error("Voter has already voted in this voting session")]
    AlreadyVoted,

    /// A session needs at least two candidates.
    #[error("A voting session needs at least two candidates")]
    AtLeastTwoCandidates,

    /// The same candidate was listed more than once.
    #[error("Candidate ids must not be repeated")]
    RepeatedCandidateId,

    /// Winners are only known once the session is closed.
    #[error("Voting session is still open")]
    VotingStillOpen,
}

impl VotingSessionError {
    /// Returns the stable symbolic name of the error.
    pub fn code(&self) -> &'static str {
        match self {
            VotingSessionError::VotingClosed => "VOTING_CLOSED",
            VotingSessionError::NotPresentCandidateId => "NOT_PRESENT_CANDIDATE_ID",
            VotingSessionError::AlreadyVoted => "ALREADY_VOTED",
            VotingSessionError::AtLeastTwoCandidates => "AT_LEAST_TWO_CANDIDATES",
            VotingSessionError::RepeatedCandidateId => "REPEATED_CANDIDATE_ID",
            VotingSessionError::VotingStillOpen => "VOTING_STILL_OPEN",
        }
    }
}
