//! Domain layer for the voting system.
//!
//! This crate provides:
//! - The `VotingSession` aggregate with its pure transitions
//!   (create, vote, close) and the winners query
//! - `VotingSessionEvent`, the closed set of transition events
//! - Ports for storage, event publishing, time and id allocation

pub mod error;
pub mod ports;
pub mod session;

pub use common::{CandidateId, SessionId, Version, VoterId};
pub use error::RepositoryError;
pub use ports::{
    Clock, EventPublisher, FixedClock, IdGenerator, RandomIdGenerator, SystemClock,
    VotingSessionRepository,
};
pub use session::{
    ClosedData, CreatedData, UnknownStatus, VotedData, VotingSession, VotingSessionBuilder,
    VotingSessionError, VotingSessionEvent, VotingStatus,
};
