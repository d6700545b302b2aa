//! Test doubles shared by the pipeline and route tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::candidates::models::{sample_record, CandidateRecord};
use crate::pipeline::embedding::HashEmbedder;
use crate::pipeline::language::{LanguageDetector, LanguageVerdict};
use crate::pipeline::service::{Components, HrService};
use crate::pipeline::synthesizer::{GenerationFailure, TextGenerator};

/// Replies with a fixed result and keeps every prompt it was sent.
pub struct Scripted {
    reply: Result<String, GenerationFailure>,
    prompts: Mutex<Vec<String>>,
}

impl Scripted {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(failure: GenerationFailure) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(failure),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for Scripted {
    async fn generate(&self, prompt: &str, _: f32) -> Result<String, GenerationFailure> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone()
    }
}

pub struct AlwaysEnglish;

impl LanguageDetector for AlwaysEnglish {
    fn detect(&self, _: &str) -> LanguageVerdict {
        LanguageVerdict::Supported
    }
}

pub fn roster() -> Vec<CandidateRecord> {
    vec![
        sample_record(1, "Alice Johnson", &["Python", "Django", "AWS"], 5),
        sample_record(2, "Bob Smith", &["Java", "Spring Boot"], 3),
        sample_record(3, "Carol White", &["Rust", "Tokio", "Kubernetes"], 8),
        sample_record(4, "Dan Brown", &["React", "TypeScript"], 2),
    ]
}

pub async fn service_with(records: &[CandidateRecord], generator: Arc<Scripted>) -> HrService {
    HrService::build(
        records,
        Components {
            embedder: Arc::new(HashEmbedder::default()),
            generator,
            detector: Arc::new(AlwaysEnglish),
            generation_timeout: Duration::from_secs(5),
        },
    )
    .await
    .unwrap()
}
