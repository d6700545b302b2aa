//! Axum route handler for the query pipeline.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::AppError;
use crate::pipeline::service::Outcome;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub response: String,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_count: Option<usize>,
}

/// POST /api/v1/query
///
/// Runs one query through the pipeline. Pipeline failures come back as a 200 with a
/// fallback message; only an empty query or a saturated service is an HTTP error.
pub async fn handle_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, AppError> {
    if request.query.trim().is_empty() {
        return Err(AppError::Validation(
            "Please enter a query to search for candidates.".to_string(),
        ));
    }

    let permit = tokio::time::timeout(
        state.config.generation_timeout,
        state.query_permits.clone().acquire_owned(),
    )
    .await;
    let _permit = match permit {
        Ok(Ok(permit)) => permit,
        Ok(Err(_)) | Err(_) => {
            warn!("No query permit available; rejecting request");
            return Err(AppError::Busy);
        }
    };

    let answer = state.service.ask(&request.query).await;

    Ok(Json(QueryResponse {
        response: answer.text,
        outcome: answer.outcome,
        requested_count: answer.requested_count,
    }))
}
