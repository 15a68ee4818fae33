//! HTTP API server with observability for the voting system.
//!
//! Exposes the voting use cases under `/voting-sessions`, with structured
//! logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use application::{InProcessEventPublisher, VotingService};
use axum::Router;
use axum::routing::{get, patch, post};
use domain::VotingSessionRepository;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::voting_sessions::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<R: VotingSessionRepository + Clone + 'static>(
    state: Arc<AppState<R>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/voting-sessions", post(routes::voting_sessions::create::<R>))
        .route("/voting-sessions/{id}", get(routes::voting_sessions::get::<R>))
        .route(
            "/voting-sessions/{id}/vote",
            patch(routes::voting_sessions::vote::<R>),
        )
        .route(
            "/voting-sessions/{id}/close",
            patch(routes::voting_sessions::close::<R>),
        )
        .route(
            "/voting-sessions/{id}/winners",
            get(routes::voting_sessions::winners::<R>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the default application state: the given repository with the
/// logging and metrics event listeners.
pub fn create_default_state<R: VotingSessionRepository + Clone + 'static>(
    repository: R,
) -> Arc<AppState<R>> {
    let publisher = InProcessEventPublisher::with_default_listeners();
    let voting_service = VotingService::new(repository, Arc::new(publisher));

    Arc::new(AppState { voting_service })
}
