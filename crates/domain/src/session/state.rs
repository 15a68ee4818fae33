//! Voting session status.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The status of a voting session.
///
/// The only transition is `Open -> Closed`; it never reverses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VotingStatus {
    /// Votes are being accepted.
    #[default]
    Open,

    /// Voting has ended and winners can be computed (terminal state).
    Closed,
}

impl VotingStatus {
    /// Returns true if votes can be cast in this status.
    pub fn can_vote(&self) -> bool {
        matches!(self, VotingStatus::Open)
    }

    /// Returns true if the session can be closed from this status.
    pub fn can_close(&self) -> bool {
        matches!(self, VotingStatus::Open)
    }

    /// Returns the symbolic name used for persistence.
    pub fn as_str(&self) -> &'static str {
        match self {
            VotingStatus::Open => "OPEN",
            VotingStatus::Closed => "CLOSED",
        }
    }
}

impl std::fmt::Display for VotingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when a stored status name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown voting status: {0}")]
pub struct UnknownStatus(pub String);

impl std::str::FromStr for VotingStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(VotingStatus::Open),
            "CLOSED" => Ok(VotingStatus::Closed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}
