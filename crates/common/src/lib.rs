//! Shared types for the voting system.

pub mod types;
pub mod version;

pub use types::{CandidateId, SessionId, VoterId};
pub use version::Version;
