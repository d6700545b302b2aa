//! Exact nearest-neighbour index over chunk embeddings.
//!
//! Brute-force squared-L2 scan. The corpus is a few hundred chunks at most, so a
//! linear scan is both fast enough and exactly reproducible: results are ordered by
//! ascending distance with ties broken by insertion order.

use std::cmp::Ordering;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IndexError {
    #[error("vector has dimension {got}, index expects {expected}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// A bounded slice of one candidate document, the unit of retrieval.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub text: String,
    /// Id of the candidate whose document this came from. Logged, never used to
    /// group or deduplicate hits.
    pub candidate_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub chunk: Chunk,
    pub distance: f32,
}

#[derive(Debug)]
pub struct VectorIndex {
    dim: usize,
    entries: Vec<(Vec<f32>, Chunk)>,
}

impl VectorIndex {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            entries: Vec::new(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn insert(&mut self, embedding: Vec<f32>, chunk: Chunk) -> Result<(), IndexError> {
        self.check_dimension(&embedding)?;
        self.entries.push((embedding, chunk));
        Ok(())
    }

    /// The `k` chunks closest to `query`, best match first.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>, IndexError> {
        self.check_dimension(query)?;

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, (embedding, _))| (i, squared_l2(embedding, query)))
            .collect();

        scored.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(i, distance)| SearchHit {
                chunk: self.entries[i].1.clone(),
                distance,
            })
            .collect())
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<(), IndexError> {
        if vector.len() != self.dim {
            return Err(IndexError::DimensionMismatch {
                expected: self.dim,
                got: vector.len(),
            });
        }
        Ok(())
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}
