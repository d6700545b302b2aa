use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Which embedding backend the index and retriever share.
#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddingBackend {
    /// Local feature-hashing embedder. Deterministic, no network.
    Hash,
    /// OpenAI-compatible `/embeddings` endpoint.
    Api {
        base_url: String,
        api_key: String,
        model: String,
    },
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub candidates_file: PathBuf,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub generation_timeout: Duration,
    pub max_concurrent_queries: usize,
    pub embedding: EmbeddingBackend,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let generation_timeout_secs: u64 = parse_env("GENERATION_TIMEOUT_SECS", 60)?;
        let max_concurrent_queries: usize = parse_env("MAX_CONCURRENT_QUERIES", 4)?;
        if max_concurrent_queries == 0 {
            bail!("MAX_CONCURRENT_QUERIES must be at least 1");
        }

        Ok(Config {
            candidates_file: PathBuf::from(
                std::env::var("CANDIDATES_FILE").unwrap_or_else(|_| "candidates.json".to_string()),
            ),
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            generation_timeout: Duration::from_secs(generation_timeout_secs),
            max_concurrent_queries,
            embedding: embedding_from_env()?,
        })
    }
}

fn embedding_from_env() -> Result<EmbeddingBackend> {
    let backend = std::env::var("EMBEDDING_BACKEND").unwrap_or_else(|_| "hash".to_string());
    match backend.trim().to_ascii_lowercase().as_str() {
        "hash" => Ok(EmbeddingBackend::Hash),
        "api" => Ok(EmbeddingBackend::Api {
            base_url: std::env::var("EMBEDDING_API_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            api_key: require_env("EMBEDDING_API_KEY")?,
            model: std::env::var("EMBEDDING_MODEL")
                .unwrap_or_else(|_| "text-embedding-3-small".to_string()),
        }),
        other => bail!("EMBEDDING_BACKEND must be 'hash' or 'api', got '{other}'"),
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
