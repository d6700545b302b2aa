use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::candidates::store::CandidateStore;
use crate::config::Config;
use crate::pipeline::service::HrService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: CandidateStore,
    /// Built once at startup; read-only afterwards.
    pub service: Arc<HrService>,
    /// Bounds in-flight pipeline queries (MAX_CONCURRENT_QUERIES).
    pub query_permits: Arc<Semaphore>,
    pub config: Config,
}
