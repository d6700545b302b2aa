//! Axum route handlers for the candidate store.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::candidates::models::CandidateRecord;
use crate::errors::AppError;
use crate::state::AppState;

/// GET /candidates
pub async fn handle_list_candidates(
    State(state): State<AppState>,
) -> Result<Json<Vec<CandidateRecord>>, AppError> {
    Ok(Json(state.store.list().await?))
}

/// POST /candidates
///
/// 409 if the id is already taken.
pub async fn handle_create_candidate(
    State(state): State<AppState>,
    Json(candidate): Json<CandidateRecord>,
) -> Result<Json<CandidateRecord>, AppError> {
    Ok(Json(state.store.create(candidate).await?))
}

/// PUT /candidates/:id
///
/// 404 if no record has this id.
pub async fn handle_update_candidate(
    State(state): State<AppState>,
    Path(candidate_id): Path<i64>,
    Json(candidate): Json<CandidateRecord>,
) -> Result<Json<CandidateRecord>, AppError> {
    Ok(Json(state.store.update(candidate_id, candidate).await?))
}
