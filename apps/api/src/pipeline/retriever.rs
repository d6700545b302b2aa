//! Retriever: embeds the query with the indexing embedder and returns the `k`
//! nearest chunks, best match first.
//!
//! Chunks, not candidates, are the retrieval unit: several hits may come from the
//! same candidate, so fewer than `k` distinct candidates can be returned.

use thiserror::Error;
use tracing::debug;

use crate::pipeline::embedding::{Embedder, EmbeddingError};
use crate::pipeline::index::{Chunk, IndexError, VectorIndex};

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("failed to embed query: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("index search failed: {0}")]
    Index(#[from] IndexError),

    #[error("embedder returned no vector for the query")]
    MissingVector,
}

pub async fn retrieve(
    index: &VectorIndex,
    embedder: &dyn Embedder,
    query: &str,
    k: usize,
) -> Result<Vec<Chunk>, RetrievalError> {
    let query_vector = embedder
        .embed(&[query])
        .await?
        .into_iter()
        .next()
        .ok_or(RetrievalError::MissingVector)?;

    let hits = index.search(&query_vector, k)?;
    debug!(
        "Retrieved {} chunks (k={k}): {:?}",
        hits.len(),
        hits.iter()
            .map(|h| (h.chunk.candidate_id, h.distance))
            .collect::<Vec<_>>()
    );

    Ok(hits.into_iter().map(|h| h.chunk).collect())
}
