// Query-to-answer pipeline.
// Startup: corpus → chunking → embedding → index, once, via `service::HrService::build`.
// Per query: query (interpret) → retriever → synthesizer → validator.
// All generation calls go through the `TextGenerator` seam — no direct API calls here.

pub mod chunking;
pub mod corpus;
pub mod embedding;
pub mod handlers;
pub mod index;
pub mod language;
pub mod prompts;
pub mod query;
pub mod retriever;
pub mod service;
pub mod synthesizer;
#[cfg(test)]
pub mod testing;
pub mod validator;
