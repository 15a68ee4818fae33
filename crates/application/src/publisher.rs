//! In-process delivery of voting session events.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use domain::{EventPublisher, VotingSessionEvent};
use thiserror::Error;

/// Failure reported by a listener. Logged by the publisher, never propagated.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ListenerError(pub String);

/// Receives every event published through an [`InProcessEventPublisher`].
pub trait VotingSessionEventListener: Send + Sync {
    /// Name used when logging failures of this listener.
    fn name(&self) -> &'static str;

    fn on_event(&self, event: &VotingSessionEvent) -> Result<(), ListenerError>;
}

/// Publisher that calls its listeners synchronously, in registration order.
///
/// A listener that fails or panics is logged and skipped; the remaining
/// listeners still see the event.
#[derive(Clone, Default)]
pub struct InProcessEventPublisher {
    listeners: Vec<Arc<dyn VotingSessionEventListener>>,
}

impl InProcessEventPublisher {
    /// Creates a publisher without listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a publisher with the logging and metrics listeners attached.
    pub fn with_default_listeners() -> Self {
        Self::new()
            .with_listener(LoggingListener)
            .with_listener(MetricsListener)
    }

    /// Registers a listener.
    pub fn with_listener(mut self, listener: impl VotingSessionEventListener + 'static) -> Self {
        self.listeners.push(Arc::new(listener));
        self
    }

    /// Returns the number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl EventPublisher for InProcessEventPublisher {
    fn publish(&self, event: &VotingSessionEvent) {
        for listener in &self.listeners {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| listener.on_event(event)));
            let error = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => err.to_string(),
                Err(payload) => panic_message(payload.as_ref()),
            };

            metrics::counter!(
                "voting_session_listener_failures_total",
                "listener" => listener.name()
            )
            .increment(1);
            tracing::warn!(
                listener = listener.name(),
                event = event.event_type(),
                voting_session_id = %event.session_id(),
                %error,
                "event listener failed"
            );
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("listener panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("listener panicked: {message}")
    } else {
        "listener panicked".to_string()
    }
}

/// Publisher that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventPublisher;

impl EventPublisher for NoopEventPublisher {
    fn publish(&self, _event: &VotingSessionEvent) {}
}

/// Logs each event at `info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingListener;

impl VotingSessionEventListener for LoggingListener {
    fn name(&self) -> &'static str {
        "logging"
    }

    fn on_event(&self, event: &VotingSessionEvent) -> Result<(), ListenerError> {
        tracing::info!(
            event = event.event_type(),
            voting_session_id = %event.session_id(),
            "voting session event"
        );
        Ok(())
    }
}

/// Counts events by type in `voting_session_events_total`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsListener;

impl VotingSessionEventListener for MetricsListener {
    fn name(&self) -> &'static str {
        "metrics"
    }

    fn on_event(&self, event: &VotingSessionEvent) -> Result<(), ListenerError> {
        metrics::counter!("voting_session_events_total", "event" => event.event_type())
            .increment(1);
        Ok(())
    }
}
