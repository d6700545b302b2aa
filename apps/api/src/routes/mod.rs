pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::candidates::handlers as candidates;
use crate::pipeline::handlers as pipeline;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Query pipeline
        .route("/api/v1/query", post(pipeline::handle_query))
        // Candidate store
        .route(
            "/candidates",
            get(candidates::handle_list_candidates).post(candidates::handle_create_candidate),
        )
        .route("/candidates/:id", put(candidates::handle_update_candidate))
        .with_state(state)
}
