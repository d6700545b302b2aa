//! Embedding backends. The index and the retriever share one `Embedder` so
//! documents and queries land in the same vector space.
//!
//! - `HashEmbedder`: local feature hashing, deterministic, no network. Default.
//! - `ApiEmbedder`: OpenAI-compatible `/embeddings` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Vector width for both backends; matches the MiniLM sentence encoders.
pub const EMBEDDING_DIM: usize = 384;
pub const HASH_EMBEDDER_NAME: &str = "feature-hash-384";

const API_BATCH_SIZE: usize = 64;
const API_MAX_RETRIES: usize = 3;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("embedding API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("embedding API returned {got} vectors for {expected} inputs")]
    CountMismatch { expected: usize, got: usize },

    #[error("embedding has dimension {got}, expected {expected}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("embedding client misconfigured: {0}")]
    Config(String),
}

#[async_trait]
pub trait Embedder: Send + Sync {
    fn model_name(&self) -> &str;

    fn dimension(&self) -> usize;

    /// One vector per input, same order as `inputs`.
    async fn embed(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}

// ────────────────────────────────────────────────────────────────────────────
// HashEmbedder
// ────────────────────────────────────────────────────────────────────────────

/// Signed feature hashing of lowercase word tokens plus their character
/// trigrams, L2-normalised. Shared vocabulary produces nearby vectors, which is
/// enough to rank short candidate profiles against a staffing query.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dim: usize,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(EMBEDDING_DIM)
    }
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; self.dim];

        for token in tokenize(text) {
            self.add_feature(&mut vector, token.as_bytes(), 1.0);

            let chars: Vec<char> = format!("#{token}#").chars().collect();
            for gram in chars.windows(3) {
                let gram: String = gram.iter().collect();
                self.add_feature(&mut vector, gram.as_bytes(), 0.5);
            }
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }

    fn add_feature(&self, vector: &mut [f32], feature: &[u8], weight: f32) {
        let hash = fnv1a(feature);
        let slot = (hash % self.dim as u64) as usize;
        let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
        vector[slot] += sign * weight;
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn model_name(&self) -> &str {
        HASH_EMBEDDER_NAME
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    async fn embed(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(inputs.iter().map(|text| self.embed_one(text)).collect())
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric() && c != '+' && c != '#')
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes
        .iter()
        .fold(OFFSET, |hash, b| (hash ^ u64::from(*b)).wrapping_mul(PRIME))
}

// ────────────────────────────────────────────────────────────────────────────
// ApiEmbedder
// ────────────────────────────────────────────────────────────────────────────

/// Embeddings client for OpenAI-compatible endpoints. Model and dimension are fixed
/// at construction and every response is checked against them.
#[derive(Clone)]
pub struct ApiEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    dim: usize,
}

impl ApiEmbedder {
    pub fn new(
        api_key: &str,
        base_url: &str,
        model: String,
        dim: usize,
        timeout: Duration,
    ) -> Result<Self, EmbeddingError> {
        if api_key.trim().is_empty() {
            return Err(EmbeddingError::Config("missing embedding API key".to_string()));
        }
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|_| EmbeddingError::Config("invalid embedding API key".to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", base_url.trim_end_matches('/')),
            model,
            dim,
        })
    }

    async fn embed_batch(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut attempt = 0usize;
        loop {
            let request = EmbeddingRequest {
                model: &self.model,
                input: inputs,
                dimensions: Some(self.dim),
            };
            let response = self.client.post(&self.endpoint).json(&request).send().await;

            let failure = match response {
                Ok(resp) if resp.status().is_success() => {
                    let mut parsed: EmbeddingResponse = resp.json().await?;
                    parsed.data.sort_by_key(|entry| entry.index);
                    if parsed.data.len() != inputs.len() {
                        return Err(EmbeddingError::CountMismatch {
                            expected: inputs.len(),
                            got: parsed.data.len(),
                        });
                    }
                    let vectors: Vec<Vec<f32>> =
                        parsed.data.into_iter().map(|e| e.embedding).collect();
                    if let Some(bad) = vectors.iter().find(|v| v.len() != self.dim) {
                        return Err(EmbeddingError::DimensionMismatch {
                            expected: self.dim,
                            got: bad.len(),
                        });
                    }
                    return Ok(vectors);
                }
                Ok(resp) => {
                    let status = resp.status();
                    let body = resp
                        .text()
                        .await
                        .unwrap_or_else(|_| "<body unavailable>".to_string());
                    if !should_retry(status) {
                        return Err(EmbeddingError::Api {
                            status: status.as_u16(),
                            body,
                        });
                    }
                    EmbeddingError::Api {
                        status: status.as_u16(),
                        body,
                    }
                }
                Err(err) if err.is_timeout() || err.is_connect() => EmbeddingError::Http(err),
                Err(err) => return Err(EmbeddingError::Http(err)),
            };

            attempt += 1;
            if attempt >= API_MAX_RETRIES {
                return Err(failure);
            }
            let delay = Duration::from_millis(500 * (1 << attempt.min(5)));
            warn!("Embedding request failed ({failure}), retrying in {}ms", delay.as_millis());
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl Embedder for ApiEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    async fn embed(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut vectors = Vec::with_capacity(inputs.len());
        for batch in inputs.chunks(API_BATCH_SIZE) {
            vectors.extend(self.embed_batch(batch).await?);
        }
        Ok(vectors)
    }
}

fn should_retry(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}
