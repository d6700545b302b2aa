//! Candidate corpus loader — filters stored records and renders each survivor into
//! the text document that gets chunked and embedded.

use tracing::{debug, info};

use crate::candidates::models::CandidateRecord;
use crate::pipeline::service::BuildError;

/// Text rendering of one indexable candidate. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateDocument {
    pub candidate_id: i64,
    pub text: String,
}

/// The documents that feed the index, in stored record order.
#[derive(Debug, Clone)]
pub struct Corpus {
    pub documents: Vec<CandidateDocument>,
}

impl Corpus {
    pub fn len(&self) -> usize {
        self.documents.len()
    }
}

/// Builds the corpus from raw records. Fails when no record is indexable: an empty
/// index must never be brought online.
pub fn load_corpus(records: &[CandidateRecord]) -> Result<Corpus, BuildError> {
    let documents: Vec<CandidateDocument> = records
        .iter()
        .filter(|record| {
            let keep = record.is_indexable();
            if !keep {
                debug!("Skipping incomplete candidate record {}", record.id);
            }
            keep
        })
        .filter_map(render_document)
        .collect();

    info!(
        "Valid candidates found: {} of {} records",
        documents.len(),
        records.len()
    );

    if documents.is_empty() {
        return Err(BuildError::NoValidCandidates);
    }

    Ok(Corpus { documents })
}

fn render_document(record: &CandidateRecord) -> Option<CandidateDocument> {
    let name = record.name.as_deref()?;
    let years = record.experience_years?;
    let skills = record.skills.as_ref()?.join(", ");
    let projects = record.projects.as_ref()?.join(", ");
    let availability = record.availability.as_deref().unwrap_or("unspecified");

    Some(CandidateDocument {
        candidate_id: record.id,
        text: format!(
            "{name} has {years} years of experience. Skills: {skills}. \
             Projects: {projects}. Availability: {availability}."
        ),
    })
}
