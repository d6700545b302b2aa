//! Answer synthesizer — fills the recommendation prompt with retrieved context and
//! makes exactly one generation call.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::pipeline::index::Chunk;
use crate::pipeline::prompts::RECOMMENDATION_PROMPT_TEMPLATE;

/// Low temperature keeps the phrasing of repeated answers stable.
pub const GENERATION_TEMPERATURE: f32 = 0.2;

/// Why a generation call produced no text.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum GenerationFailure {
    #[error("generation timed out")]
    Timeout,

    #[error("generation model unavailable: {0}")]
    Unavailable(String),

    #[error("generation returned malformed output: {0}")]
    MalformedOutput(String),
}

impl GenerationFailure {
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationFailure::Timeout => "timeout",
            GenerationFailure::Unavailable(_) => "unavailable",
            GenerationFailure::MalformedOutput(_) => "malformed_output",
        }
    }
}

/// The seam between the pipeline and whatever model produces text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String, GenerationFailure>;
}

/// Joins retrieved chunks into the context block, best match first.
pub fn build_context(chunks: &[Chunk]) -> String {
    chunks
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Fills the recommendation template in one left-to-right pass, so placeholder
/// text inside the context or the question is never substituted again.
pub fn build_prompt(context: &str, question: &str) -> String {
    fill_template(
        RECOMMENDATION_PROMPT_TEMPLATE,
        &[("{context}", context), ("{question}", question)],
    )
}

fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match values.iter().find(|(key, _)| tail.starts_with(key)) {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len()..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Runs one generation call under `deadline`. Expiry counts as a failure.
pub async fn synthesize(
    generator: &dyn TextGenerator,
    chunks: &[Chunk],
    question: &str,
    deadline: Duration,
) -> Result<String, GenerationFailure> {
    let prompt = build_prompt(&build_context(chunks), question);
    match tokio::time::timeout(deadline, generator.generate(&prompt, GENERATION_TEMPERATURE)).await
    {
        Ok(result) => result,
        Err(_) => Err(GenerationFailure::Timeout),
    }
}
