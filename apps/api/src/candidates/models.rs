use serde::{Deserialize, Serialize};

/// One candidate as persisted in the flat-file store.
///
/// Every field except `id` is optional on disk: incomplete records are kept by the
/// store but excluded from the search index (see `is_indexable`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience_years: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projects: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<String>,
}

impl CandidateRecord {
    /// A record is indexable when it has a non-empty name, at least one skill, at
    /// least one project and a non-negative experience figure. The name is taken as
    /// stored, so a whitespace-only name still counts.
    pub fn is_indexable(&self) -> bool {
        let has_name = self.name.as_deref().is_some_and(|n| !n.is_empty());
        let has_skills = self.skills.as_ref().is_some_and(|s| !s.is_empty());
        let has_projects = self.projects.as_ref().is_some_and(|p| !p.is_empty());
        let has_experience = self.experience_years.is_some_and(|y| y >= 0);
        has_name && has_skills && has_projects && has_experience
    }

    /// Checks the shape required of records written through the API: every field
    /// present and `experience_years >= 0`. Empty lists are accepted here.
    pub fn validate_for_write(&self) -> Result<(), String> {
        let mut missing = Vec::new();
        if self.name.is_none() {
            missing.push("name");
        }
        if self.skills.is_none() {
            missing.push("skills");
        }
        if self.experience_years.is_none() {
            missing.push("experience_years");
        }
        if self.projects.is_none() {
            missing.push("projects");
        }
        if self.availability.is_none() {
            missing.push("availability");
        }
        if !missing.is_empty() {
            return Err(format!("Missing required fields: {}", missing.join(", ")));
        }
        if self.experience_years.is_some_and(|y| y < 0) {
            return Err("experience_years must be greater than or equal to 0".to_string());
        }
        Ok(())
    }
}

/// One entry of the `employees` array as found on disk.
///
/// Entries that do not fit `CandidateRecord` (a fractional `experience_years`, a
/// string where a list belongs) are kept verbatim so a rewrite of the file never
/// loses them. They are not listed and never indexed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredCandidate {
    Record(CandidateRecord),
    Malformed(serde_json::Value),
}

impl StoredCandidate {
    pub fn id(&self) -> Option<i64> {
        match self {
            StoredCandidate::Record(record) => Some(record.id),
            StoredCandidate::Malformed(value) => value.get("id").and_then(|id| id.as_i64()),
        }
    }

    pub fn into_record(self) -> Option<CandidateRecord> {
        match self {
            StoredCandidate::Record(record) => Some(record),
            StoredCandidate::Malformed(_) => None,
        }
    }
}

/// Top-level shape of the candidates file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateFile {
    #[serde(default)]
    pub employees: Vec<StoredCandidate>,
}

#[cfg(test)]
pub(crate) fn sample_record(id: i64, name: &str, skills: &[&str], years: i64) -> CandidateRecord {
    CandidateRecord {
        id,
        name: Some(name.to_string()),
        skills: Some(skills.iter().map(|s| s.to_string()).collect()),
        experience_years: Some(years),
        projects: Some(vec![format!("{name} platform rewrite")]),
        availability: Some("available".to_string()),
    }
}
