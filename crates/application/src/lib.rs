//! Use cases of the voting system.
//!
//! [`VotingService`] loads a session through the repository port, applies
//! one domain transition, saves it under the optimistic lock and then hands
//! the resulting event to an [`EventPublisher`](domain::EventPublisher).
//! Events are delivered in-process by [`InProcessEventPublisher`].

pub mod error;
pub mod publisher;
pub mod service;

pub use error::{Result, ServiceError};
pub use publisher::{
    InProcessEventPublisher, ListenerError, LoggingListener, MetricsListener, NoopEventPublisher,
    VotingSessionEventListener,
};
pub use service::VotingService;
