//! Voting session endpoints.

use std::collections::BTreeMap;
use std::sync::Arc;

use application::VotingService;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::{CandidateId, SessionId, VoterId};
use domain::{VotingSession, VotingSessionRepository};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<R: VotingSessionRepository> {
    pub voting_service: VotingService<R>,
}

// -- Request types --

#[derive(Deserialize)]
pub struct CreateVotingSessionRequest {
    pub name: String,
    pub candidates: Vec<CandidateId>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub candidate_id: CandidateId,
    pub voter_id: VoterId,
}

// -- Response types --

#[derive(Serialize)]
pub struct VotingSessionCreatedResponse {
    pub id: SessionId,
}

#[derive(Serialize)]
pub struct WinnersResponse {
    pub winners: Vec<CandidateId>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VotingSessionResponse {
    pub id: SessionId,
    pub name: String,
    pub candidates: Vec<CandidateId>,
    pub status: String,
    pub votes: BTreeMap<CandidateId, Vec<VoterId>>,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub version: i64,
}

impl From<VotingSession> for VotingSessionResponse {
    fn from(session: VotingSession) -> Self {
        Self {
            id: session.id(),
            name: session.name().to_string(),
            candidates: session.candidates().to_vec(),
            status: session.status().to_string(),
            votes: session.votes().clone(),
            created_at: session.created_at(),
            closed_at: session.closed_at(),
            version: session.version().as_i64(),
        }
    }
}

// -- Handlers --

/// POST /voting-sessions — open a new session.
#[tracing::instrument(skip(state, payload))]
pub async fn create<R: VotingSessionRepository + Clone + 'static>(
    State(state): State<Arc<AppState<R>>>,
    payload: Result<Json<CreateVotingSessionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<VotingSessionCreatedResponse>), ApiError> {
    let Json(req) = payload?;

    let id = state
        .voting_service
        .create(req.name, req.candidates)
        .await?;

    Ok((StatusCode::CREATED, Json(VotingSessionCreatedResponse { id })))
}

/// PATCH /voting-sessions/{id}/vote — cast a vote.
#[tracing::instrument(skip(state, payload))]
pub async fn vote<R: VotingSessionRepository + Clone + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    payload: Result<Json<VoteRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let session_id = parse_session_id(&id)?;
    let Json(req) = payload?;

    state
        .voting_service
        .vote(session_id, req.candidate_id, req.voter_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /voting-sessions/{id}/close — stop accepting votes.
#[tracing::instrument(skip(state))]
pub async fn close<R: VotingSessionRepository + Clone + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let session_id = parse_session_id(&id)?;
    state.voting_service.close(session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /voting-sessions/{id}/winners — winners of a closed session.
#[tracing::instrument(skip(state))]
pub async fn winners<R: VotingSessionRepository + Clone + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<Json<WinnersResponse>, ApiError> {
    let session_id = parse_session_id(&id)?;
    let winners = state.voting_service.winners(session_id).await?;
    Ok(Json(WinnersResponse { winners }))
}

/// GET /voting-sessions/{id} — current state of a session.
#[tracing::instrument(skip(state))]
pub async fn get<R: VotingSessionRepository + Clone + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<Json<VotingSessionResponse>, ApiError> {
    let session_id = parse_session_id(&id)?;
    let session = state.voting_service.get(session_id).await?;
    Ok(Json(session.into()))
}

fn parse_session_id(id: &str) -> Result<SessionId, ApiError> {
    id.parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))
}
