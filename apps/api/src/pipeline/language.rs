//! Query language detection.

use whatlang::{Lang, Script};

/// What the detector concluded about a query's language.
#[derive(Debug, Clone, PartialEq)]
pub enum LanguageVerdict {
    Supported,
    /// ISO 639-3 code of the detected language, `und` when no language was named.
    Unsupported(&'static str),
    /// The text has no letters at all. Allowed through; later checks decide.
    Undetermined,
}

impl LanguageVerdict {
    pub fn is_rejected(&self) -> bool {
        matches!(self, LanguageVerdict::Unsupported(_))
    }
}

pub trait LanguageDetector: Send + Sync {
    fn detect(&self, text: &str) -> LanguageVerdict;
}

/// Share of a query's words that must be common English words before a non-English
/// trigram verdict is overruled.
const ENGLISH_WORD_SHARE: f64 = 0.5;

/// Frequent English function words and the staffing vocabulary recruiters use.
const ENGLISH_WORDS: &[&str] = &[
    "a", "about", "all", "an", "and", "any", "are", "as", "at", "available", "be",
    "best", "by", "can", "candidate", "candidates", "could", "developer", "developers",
    "do", "engineer", "engineers", "experience", "experienced", "expert", "experts",
    "find", "five", "for", "four", "from", "get", "give", "good", "has", "have",
    "i", "in", "is", "it", "know", "knowledge", "looking", "me", "more", "most",
    "my", "need", "needed", "of", "on", "one", "or", "our", "people", "person",
    "please", "profile", "profiles", "project", "projects", "recommend", "senior",
    "show", "skill", "skilled", "skills", "some", "strong", "suggest", "team",
    "than", "that", "the", "three", "to", "two", "us", "want", "we", "who", "with",
    "work", "worked", "working", "year", "years", "you",
];

/// Trigram-based detection via `whatlang`. English is the only supported language.
///
/// A non-Latin script is rejected outright and an English trigram verdict is
/// accepted. Short staffing queries are often misread as Latin, Dutch or similar,
/// so any other verdict is checked against `ENGLISH_WORDS`: the query is English
/// when at least half of its words are common English words, and rejected
/// otherwise. Text without letters is undetermined.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhatlangDetector;

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, text: &str) -> LanguageVerdict {
        let words: Vec<String> = text
            .split(|c: char| !c.is_alphabetic())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .collect();
        if words.is_empty() {
            return LanguageVerdict::Undetermined;
        }

        let info = whatlang::detect(text);
        if let Some(info) = &info {
            if info.script() != Script::Latin {
                return LanguageVerdict::Unsupported(info.lang().code());
            }
            if info.lang() == Lang::Eng {
                return LanguageVerdict::Supported;
            }
        }

        if english_word_share(&words) >= ENGLISH_WORD_SHARE {
            return LanguageVerdict::Supported;
        }
        LanguageVerdict::Unsupported(info.map_or("und", |i| i.lang().code()))
    }
}

fn english_word_share(words: &[String]) -> f64 {
    let known = words
        .iter()
        .filter(|w| ENGLISH_WORDS.contains(&w.as_str()))
        .count();
    known as f64 / words.len() as f64
}
