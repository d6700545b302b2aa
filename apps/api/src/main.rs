mod candidates;
mod config;
mod errors;
mod llm_client;
mod pipeline;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Semaphore;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::candidates::store::CandidateStore;
use crate::config::{Config, EmbeddingBackend};
use crate::llm_client::LlmClient;
use crate::pipeline::embedding::{ApiEmbedder, Embedder, HashEmbedder, EMBEDDING_DIM};
use crate::pipeline::language::WhatlangDetector;
use crate::pipeline::service::{Components, HrService};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting HR Bot API v{}", env!("CARGO_PKG_VERSION"));

    // Candidate store (flat file)
    let store = CandidateStore::new(config.candidates_file.clone());
    let records = store
        .list()
        .await
        .with_context(|| format!("Failed to read {}", store.path().display()))?;
    info!(
        "Loaded {} candidate records from {}",
        records.len(),
        store.path().display()
    );

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let embedder = build_embedder(&config)?;
    info!("Embedder initialized (model: {})", embedder.model_name());

    // Build the index before accepting any query; an empty corpus aborts startup.
    let service = HrService::build(
        &records,
        Components {
            embedder,
            generator: Arc::new(llm),
            detector: Arc::new(WhatlangDetector),
            generation_timeout: config.generation_timeout,
        },
    )
    .await
    .context("Failed to build the candidate index")?;

    let state = AppState {
        store,
        service: Arc::new(service),
        query_permits: Arc::new(Semaphore::new(config.max_concurrent_queries)),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the UI host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Picks the embedding backend shared by the indexer and the retriever.
fn build_embedder(config: &Config) -> Result<Arc<dyn Embedder>> {
    match &config.embedding {
        EmbeddingBackend::Hash => Ok(Arc::new(HashEmbedder::default())),
        EmbeddingBackend::Api {
            base_url,
            api_key,
            model,
        } => {
            let embedder = ApiEmbedder::new(
                api_key,
                base_url,
                model.clone(),
                EMBEDDING_DIM,
                std::time::Duration::from_secs(30),
            )
            .context("Failed to build embedding client")?;
            Ok(Arc::new(embedder))
        }
    }
}
