//! The HR query service: built once from the candidate records, then answers
//! free-text staffing queries.
//!
//! Build: load_corpus → split → embed → index. Fails fatally on an empty corpus.
//!
//! Ask: language → length → keyword → count → retrieval → generation → validation.
//! Every step either continues or ends the call with a fixed fallback string, so
//! `ask` always returns non-empty text and never an error.
//!
//! The index is a snapshot of the records passed to `build`. Later store writes do
//! not reach it; build a new service to pick them up.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::candidates::models::CandidateRecord;
use crate::pipeline::chunking::TextSplitter;
use crate::pipeline::corpus::load_corpus;
use crate::pipeline::embedding::{Embedder, EmbeddingError};
use crate::pipeline::index::{Chunk, IndexError, VectorIndex};
use crate::pipeline::language::LanguageDetector;
use crate::pipeline::prompts::GENERATION_ERROR;
use crate::pipeline::query::{interpret_query, QueryRejection};
use crate::pipeline::retriever::retrieve;
use crate::pipeline::synthesizer::{synthesize, GenerationFailure, TextGenerator};
use crate::pipeline::validator::validate_response;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("No valid candidate data available in the database.")]
    NoValidCandidates,

    #[error("failed to embed candidate documents: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("failed to index candidate documents: {0}")]
    Index(#[from] IndexError),

    #[error("embedder returned {got} vectors for {expected} chunks")]
    VectorCount { expected: usize, got: usize },
}

/// How a query ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Answered,
    Rejected { reason: QueryRejection },
    RetrievalFailed,
    GenerationFailed { failure: GenerationFailure },
    LowConfidence,
}

/// What `ask` returns: the user-facing text plus how it was reached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub text: String,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_count: Option<usize>,
}

impl Answer {
    fn fallback(text: &str, outcome: Outcome, requested_count: Option<usize>) -> Self {
        Self {
            text: text.to_string(),
            outcome,
            requested_count,
        }
    }
}

/// The collaborators a service is built with.
pub struct Components {
    pub embedder: Arc<dyn Embedder>,
    pub generator: Arc<dyn TextGenerator>,
    pub detector: Arc<dyn LanguageDetector>,
    pub generation_timeout: Duration,
}

pub struct HrService {
    candidate_count: usize,
    index: VectorIndex,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn TextGenerator>,
    detector: Arc<dyn LanguageDetector>,
    generation_timeout: Duration,
}

impl HrService {
    pub async fn build(
        records: &[CandidateRecord],
        components: Components,
    ) -> Result<Self, BuildError> {
        let corpus = load_corpus(records)?;
        let splitter = TextSplitter::default();

        let chunks: Vec<Chunk> = corpus
            .documents
            .iter()
            .flat_map(|doc| {
                splitter
                    .split(&doc.text)
                    .into_iter()
                    .map(move |text| Chunk {
                        text,
                        candidate_id: doc.candidate_id,
                    })
            })
            .collect();

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let vectors = components.embedder.embed(&texts).await?;
        if vectors.len() != chunks.len() {
            return Err(BuildError::VectorCount {
                expected: chunks.len(),
                got: vectors.len(),
            });
        }

        let mut index = VectorIndex::new(components.embedder.dimension());
        for (vector, chunk) in vectors.into_iter().zip(chunks) {
            index.insert(vector, chunk)?;
        }

        info!(
            "Indexed {} chunks from {} candidates (embedder: {}, dim: {})",
            index.len(),
            corpus.len(),
            components.embedder.model_name(),
            index.dimension()
        );

        Ok(Self {
            candidate_count: corpus.len(),
            index,
            embedder: components.embedder,
            generator: components.generator,
            detector: components.detector,
            generation_timeout: components.generation_timeout,
        })
    }

    /// Number of candidates that made it into the index.
    pub fn candidate_count(&self) -> usize {
        self.candidate_count
    }

    pub fn chunk_count(&self) -> usize {
        self.index.len()
    }

    pub async fn ask(&self, query: &str) -> Answer {
        let parsed = match interpret_query(query, self.candidate_count, self.detector.as_ref()) {
            Ok(parsed) => parsed,
            Err(reason) => {
                info!("Query rejected: {reason:?}");
                return Answer::fallback(reason.message(), Outcome::Rejected { reason }, None);
            }
        };
        let k = parsed.requested_count;
        info!(
            "Query accepted: words={}, language={:?}, keyword={}, requested={k}",
            parsed.word_count, parsed.language, parsed.has_relevant_keyword
        );

        let chunks = match retrieve(&self.index, self.embedder.as_ref(), query, k).await {
            Ok(chunks) => chunks,
            Err(e) => {
                error!("Retrieval failed: {e}");
                return Answer::fallback(GENERATION_ERROR, Outcome::RetrievalFailed, Some(k));
            }
        };

        let generated = match synthesize(
            self.generator.as_ref(),
            &chunks,
            query,
            self.generation_timeout,
        )
        .await
        {
            Ok(text) => text,
            Err(failure) => {
                error!("Generation failed ({}): {failure}", failure.kind());
                return Answer::fallback(
                    GENERATION_ERROR,
                    Outcome::GenerationFailed { failure },
                    Some(k),
                );
            }
        };

        if let Some(fallback) = validate_response(&generated) {
            warn!("Generated answer was empty or low-confidence; using fallback");
            return Answer::fallback(fallback, Outcome::LowConfidence, Some(k));
        }

        info!("Answered query with {} chunks (requested {k})", chunks.len());
        Answer {
            text: generated,
            outcome: Outcome::Answered,
            requested_count: Some(k),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidates::models::sample_record;
    use crate::candidates::store::CandidateStore;
    use crate::pipeline::embedding::HashEmbedder;
    use crate::pipeline::language::WhatlangDetector;
    use crate::pipeline::prompts::{
        LOW_CONFIDENCE, NEEDS_MORE_DETAIL, OFF_TOPIC, UNSUPPORTED_LANGUAGE,
    };
    use crate::pipeline::testing::{roster, service_with, AlwaysEnglish, Scripted};

    #[tokio::test]
    async fn test_build_counts_only_valid_candidates() {
        let mut records = roster();
        records[1].skills = None;
        let service = service_with(&records, Scripted::replying("ok")).await;
        assert_eq!(service.candidate_count(), 3);
        assert_eq!(service.chunk_count(), 3);
    }

    #[tokio::test]
    async fn test_build_fails_on_empty_corpus() {
        let result = HrService::build(
            &[],
            Components {
                embedder: Arc::new(HashEmbedder::default()),
                generator: Scripted::replying("ok"),
                detector: Arc::new(AlwaysEnglish),
                generation_timeout: Duration::from_secs(5),
            },
        )
        .await;
        assert!(matches!(result, Err(BuildError::NoValidCandidates)));
    }

    #[tokio::test]
    async fn test_answer_passes_through_generated_text() {
        let reply = "Based on your requirements for Rust, I found excellent candidates:\n\
                     1) Carol White\nWould you like me to provide more details?";
        let generator = Scripted::replying(reply);
        let service = service_with(&roster(), generator.clone()).await;

        let answer = service.ask("find 1 rust engineer with kubernetes").await;
        assert_eq!(answer.text, reply);
        assert_eq!(answer.outcome, Outcome::Answered);
        assert_eq!(answer.requested_count, Some(1));

        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Carol White"));
        assert!(prompts[0].contains("find 1 rust engineer with kubernetes"));
    }

    #[tokio::test]
    async fn test_requested_count_bounds_retrieved_context() {
        let generator = Scripted::replying("1) Someone");
        let service = service_with(&roster(), generator.clone()).await;

        service.ask("find 2 candidates for a web project").await;
        let context_docs = roster()
            .iter()
            .filter(|r| generator.prompts()[0].contains(r.name.as_deref().unwrap()))
            .count();
        assert_eq!(context_docs, 2);
    }

    #[tokio::test]
    async fn test_count_larger_than_corpus_is_clamped() {
        let service = service_with(&roster(), Scripted::replying("1) A")).await;
        let answer = service.ask("find 50 candidates with experience").await;
        assert_eq!(answer.requested_count, Some(4));
    }

    #[tokio::test]
    async fn test_rejections_skip_generation() {
        let generator = Scripted::replying("should not be called");
        let service = service_with(&roster(), generator.clone()).await;

        let short = service.ask("python devs").await;
        assert_eq!(short.text, NEEDS_MORE_DETAIL);
        assert_eq!(
            short.outcome,
            Outcome::Rejected {
                reason: QueryRejection::TooShort
            }
        );

        let off_topic = service.ask("Tell me about your lunch menu today").await;
        assert_eq!(off_topic.text, OFF_TOPIC);

        assert!(generator.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_non_english_query_gets_language_message() {
        let generator = Scripted::replying("should not be called");
        let service = HrService::build(
            &roster(),
            Components {
                embedder: Arc::new(HashEmbedder::default()),
                generator: generator.clone(),
                detector: Arc::new(WhatlangDetector),
                generation_timeout: Duration::from_secs(5),
            },
        )
        .await
        .unwrap();

        // Contains English staffing keywords, still rejected on language.
        let answer = service
            .ask(
                "Найдите пожалуйста двух опытных кандидатов developer с большим опытом работы experience",
            )
            .await;
        assert_eq!(answer.text, UNSUPPORTED_LANGUAGE);
        assert!(generator.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_short_latin_script_non_english_query_is_rejected() {
        let generator = Scripted::replying("should not be called");
        let service = HrService::build(
            &roster(),
            Components {
                embedder: Arc::new(HashEmbedder::default()),
                generator: generator.clone(),
                detector: Arc::new(WhatlangDetector),
                generation_timeout: Duration::from_secs(5),
            },
        )
        .await
        .unwrap();

        let answer = service.ask("Finde 3 Python Entwickler mit Erfahrung").await;
        assert_eq!(answer.text, UNSUPPORTED_LANGUAGE);
        assert!(generator.prompts().is_empty());

        let answer = service.ask("find 2 python developers").await;
        assert_eq!(answer.outcome, Outcome::Answered);
        assert_eq!(generator.prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_generation_failure_becomes_generic_error() {
        for failure in [
            GenerationFailure::Timeout,
            GenerationFailure::Unavailable("connection refused".to_string()),
            GenerationFailure::MalformedOutput("bad body".to_string()),
        ] {
            let service = service_with(&roster(), Scripted::failing(failure.clone())).await;
            let answer = service.ask("find 2 python developers").await;
            assert_eq!(answer.text, GENERATION_ERROR);
            assert_eq!(answer.outcome, Outcome::GenerationFailed { failure });
        }
    }

    #[tokio::test]
    async fn test_low_confidence_output_is_replaced() {
        for reply in ["", "   ", "I don't know."] {
            let service = service_with(&roster(), Scripted::replying(reply)).await;
            let answer = service.ask("find 2 python developers").await;
            assert_eq!(answer.text, LOW_CONFIDENCE);
            assert_eq!(answer.outcome, Outcome::LowConfidence);
        }
    }

    #[tokio::test]
    async fn test_identical_queries_retrieve_identical_context() {
        let generator = Scripted::replying("1) Alice");
        let service = service_with(&roster(), generator.clone()).await;

        service.ask("find 3 engineers with python experience").await;
        service.ask("find 3 engineers with python experience").await;

        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[0], prompts[1]);
    }

    #[tokio::test]
    async fn test_index_is_a_startup_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = CandidateStore::new(dir.path().join("candidates.json"));
        for record in roster() {
            store.create(record).await.unwrap();
        }

        let generator = Scripted::replying("1) Someone");
        let service = service_with(&store.list().await.unwrap(), generator.clone()).await;

        store
            .create(sample_record(9, "Zed Newcomer", &["Elixir", "Phoenix"], 6))
            .await
            .unwrap();

        let answer = service.ask("find 4 elixir phoenix developers").await;
        assert_eq!(answer.requested_count, Some(4));
        assert_eq!(service.candidate_count(), 4);
        assert!(!generator.prompts()[0].contains("Zed Newcomer"));
    }

    #[tokio::test]
    async fn test_answer_is_never_empty() {
        let service = service_with(&roster(), Scripted::replying("")).await;
        for query in [
            "",
            "hi",
            "Tell me about your lunch menu today",
            "find 2 python developers",
        ] {
            assert!(!service.ask(query).await.text.trim().is_empty(), "{query:?}");
        }
    }
}
