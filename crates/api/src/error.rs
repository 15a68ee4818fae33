//! API error types with HTTP response mapping.

use application::ServiceError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::RepositoryError;

/// API-level error type that maps to HTTP responses.
///
/// The body is always `{"error": "<CODE>"}`; requests the server could not
/// read additionally carry a `message`.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed path id or request body.
    BadRequest(String),
    /// A use case failed.
    Service(ServiceError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", Some(msg)),
            ApiError::Service(err) => service_error_to_response(err),
        };

        metrics::counter!("api_errors_total", "error" => code).increment(1);

        let body = match message {
            Some(message) => serde_json::json!({ "error": code, "message": message }),
            None => serde_json::json!({ "error": code }),
        };
        (status, axum::Json(body)).into_response()
    }
}

fn service_error_to_response(err: ServiceError) -> (StatusCode, &'static str, Option<String>) {
    match err {
        ServiceError::Domain(err) => (StatusCode::BAD_REQUEST, err.code(), None),
        ServiceError::Repository(RepositoryError::NotFound(_)) => {
            (StatusCode::NOT_FOUND, "VOTING_SESSION_NOT_FOUND", None)
        }
        ServiceError::Repository(RepositoryError::OptimisticLockingConflict(_)) => {
            (StatusCode::CONFLICT, "OPTIMISTIC_LOCKING_CONFLICT", None)
        }
        ServiceError::Repository(err) => {
            tracing::error!(error = %err, "internal server error");
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", None)
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Service(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
