use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status, version and the size of the live index.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "hr-bot-api",
        "candidates_indexed": state.service.candidate_count(),
        "chunks_indexed": state.service.chunk_count()
    }))
}
