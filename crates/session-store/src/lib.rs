//! Storage adapters for voting sessions.
//!
//! Both repositories implement [`domain::VotingSessionRepository`] with
//! compare-and-increment semantics on the session version.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::InMemorySessionRepository;
pub use postgres::PostgresSessionRepository;
pub use store::expect_single_row;
