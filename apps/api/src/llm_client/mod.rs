/// LLM Client — the single point of entry for all generation-model calls in the HR bot.
///
/// No other module may call the Anthropic API directly. The pipeline sees this client
/// only through the `TextGenerator` trait.
///
/// Model: claude-sonnet-4-5 (hardcoded — do not make configurable to prevent drift)
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::pipeline::synthesizer::{GenerationFailure, TextGenerator};

pub mod prompts;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all LLM calls.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 1024;
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },
}

impl From<LlmError> for GenerationFailure {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Http(e) if e.is_timeout() => GenerationFailure::Timeout,
            LlmError::Http(e) if e.is_decode() => GenerationFailure::MalformedOutput(e.to_string()),
            LlmError::Parse(e) => GenerationFailure::MalformedOutput(e.to_string()),
            other => GenerationFailure::Unavailable(other.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Wraps the Anthropic Messages API with retry logic.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    /// Makes a raw call to the Claude API, returning the full response object.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    pub async fn call(
        &self,
        prompt: &str,
        system: &str,
        temperature: f32,
    ) -> Result<LlmResponse, LlmError> {
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            temperature,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(ANTHROPIC_API_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<AnthropicError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let body = response.bytes().await?;
            let llm_response: LlmResponse = serde_json::from_slice(&body)?;

            debug!(
                "LLM call succeeded: input_tokens={}, output_tokens={}",
                llm_response.usage.input_tokens, llm_response.usage.output_tokens
            );

            return Ok(llm_response);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    /// A response without a text block is returned as empty text; the response
    /// validator decides what the user sees in that case.
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String, GenerationFailure> {
        let response = self
            .call(prompt, prompts::HR_ASSISTANT_SYSTEM, temperature)
            .await?;
        Ok(response.text().unwrap_or_default().trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_text_picks_first_text_block() {
        let json = r#"{
            "content": [
                {"type": "tool_use", "text": null},
                {"type": "text", "text": "1) Alice Johnson"}
            ],
            "usage": {"input_tokens": 10, "output_tokens": 4}
        }"#;
        let response: LlmResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text(), Some("1) Alice Johnson"));
    }

    #[test]
    fn test_response_without_text_block() {
        let json = r#"{"content": [], "usage": {"input_tokens": 1, "output_tokens": 0}}"#;
        let response: LlmResponse = serde_json::from_str(json).unwrap();
        assert!(response.text().is_none());
    }

    #[test]
    fn test_request_carries_temperature() {
        let request = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            temperature: 0.2,
            system: "sys",
            messages: vec![AnthropicMessage {
                role: "user",
                content: "hi",
            }],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!((value["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
        assert_eq!(value["messages"][0]["role"], "user");
    }

    #[test]
    fn test_api_error_maps_to_unavailable() {
        let failure = GenerationFailure::from(LlmError::Api {
            status: 503,
            message: "overloaded".to_string(),
        });
        assert!(matches!(failure, GenerationFailure::Unavailable(_)));
    }

    #[test]
    fn test_parse_error_maps_to_malformed_output() {
        let parse_err = serde_json::from_str::<LlmResponse>("not json").unwrap_err();
        let failure = GenerationFailure::from(LlmError::Parse(parse_err));
        assert!(matches!(failure, GenerationFailure::MalformedOutput(_)));
    }
}
