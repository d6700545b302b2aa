//! Query interpreter — decides whether a raw query is answerable and how many
//! candidates it asks for.
//!
//! Checks run in a fixed order and the first failure short-circuits:
//! language → word count → staffing keyword → requested count.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::pipeline::language::{LanguageDetector, LanguageVerdict};
use crate::pipeline::prompts::{NEEDS_MORE_DETAIL, OFF_TOPIC, UNSUPPORTED_LANGUAGE};

pub const MIN_QUERY_WORDS: usize = 3;
pub const DEFAULT_REQUESTED_COUNT: usize = 2;

/// Substrings (matched case-insensitively) that mark a query as a staffing request.
pub const RELEVANT_KEYWORDS: &[&str] = &[
    "find",
    "suggest",
    "developer",
    "engineer",
    "project",
    "skills",
    "experience",
    "candidate",
    "people",
    "profiles",
];

/// Why a query was turned away before retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryRejection {
    UnsupportedLanguage,
    TooShort,
    OffTopic,
}

impl QueryRejection {
    /// The fixed message shown to the user for this rejection.
    pub fn message(&self) -> &'static str {
        match self {
            QueryRejection::UnsupportedLanguage => UNSUPPORTED_LANGUAGE,
            QueryRejection::TooShort => NEEDS_MORE_DETAIL,
            QueryRejection::OffTopic => OFF_TOPIC,
        }
    }
}

/// Interpretation of a query that passed every check.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedQuery {
    pub language: LanguageVerdict,
    pub word_count: usize,
    pub has_relevant_keyword: bool,
    pub requested_count: usize,
}

/// Runs the ordered checks against `query`. `total_candidates` is the number of
/// indexed candidates and bounds the requested count.
pub fn interpret_query(
    query: &str,
    total_candidates: usize,
    detector: &dyn LanguageDetector,
) -> Result<ParsedQuery, QueryRejection> {
    let language = detector.detect(query);
    if language.is_rejected() {
        return Err(QueryRejection::UnsupportedLanguage);
    }

    let word_count = query.split_whitespace().count();
    if word_count < MIN_QUERY_WORDS {
        return Err(QueryRejection::TooShort);
    }

    if !has_relevant_keyword(query) {
        return Err(QueryRejection::OffTopic);
    }

    Ok(ParsedQuery {
        language,
        word_count,
        has_relevant_keyword: true,
        requested_count: extract_requested_count(query, total_candidates),
    })
}

pub fn has_relevant_keyword(query: &str) -> bool {
    let lowered = query.to_lowercase();
    RELEVANT_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}

/// How many candidates the query asks for.
///
/// Takes the first run of digits in the query (optionally followed by a count noun
/// such as "candidates" or "people") and clamps it to `1..=total_candidates`.
/// Without a number the default is `min(2, total_candidates)`. This is a heuristic:
/// "3+ years" reads as three candidates.
pub fn extract_requested_count(query: &str, total_candidates: usize) -> usize {
    let lowered = query.to_lowercase();
    match count_pattern().captures(&lowered) {
        Some(caps) => {
            // Digit runs too long for usize are still "more than we have".
            let n = caps[1].parse::<usize>().unwrap_or(usize::MAX);
            n.max(1).min(total_candidates)
        }
        None => DEFAULT_REQUESTED_COUNT.min(total_candidates),
    }
}

fn count_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(\d+)\s*(candidate|person|people|profiles)?")
            .expect("count pattern is a valid regex")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(LanguageVerdict);

    impl LanguageDetector for Fixed {
        fn detect(&self, _text: &str) -> LanguageVerdict {
            self.0.clone()
        }
    }

    const ENGLISH: Fixed = Fixed(LanguageVerdict::Supported);

    #[test]
    fn test_extract_explicit_count() {
        assert_eq!(extract_requested_count("find 5 candidates", 10), 5);
    }

    #[test]
    fn test_extract_clamps_to_corpus_size() {
        assert_eq!(extract_requested_count("find 50 candidates", 10), 10);
    }

    #[test]
    fn test_extract_default_is_capped_by_corpus() {
        assert_eq!(extract_requested_count("find good people", 1), 1);
        assert_eq!(extract_requested_count("find good people", 10), 2);
    }

    #[test]
    fn test_extract_zero_is_raised_to_one() {
        assert_eq!(extract_requested_count("find 0 people", 10), 1);
    }

    #[test]
    fn test_extract_takes_first_number() {
        assert_eq!(
            extract_requested_count("find 3 engineers with 7 years experience", 10),
            3
        );
        assert_eq!(
            extract_requested_count("Find Python developers with 3+ years experience", 10),
            3
        );
    }

    #[test]
    fn test_extract_huge_number_saturates() {
        assert_eq!(
            extract_requested_count("find 99999999999999999999999 people", 4),
            4
        );
    }

    #[test]
    fn test_extract_with_no_candidates_is_zero() {
        assert_eq!(extract_requested_count("find 3 people", 0), 0);
        assert_eq!(extract_requested_count("find people", 0), 0);
    }

    #[test]
    fn test_keyword_match_is_case_insensitive_substring() {
        assert!(has_relevant_keyword("We need ENGINEERS urgently"));
        assert!(has_relevant_keyword("who has Kubernetes experience?"));
        assert!(!has_relevant_keyword("Tell me about your lunch menu today"));
    }

    #[test]
    fn test_unsupported_language_short_circuits() {
        let detector = Fixed(LanguageVerdict::Unsupported("spa"));
        assert_eq!(
            interpret_query("find 3 python developers", 10, &detector),
            Err(QueryRejection::UnsupportedLanguage)
        );
    }

    #[test]
    fn test_language_checked_before_length() {
        let detector = Fixed(LanguageVerdict::Unsupported("rus"));
        assert_eq!(
            interpret_query("hi", 10, &detector),
            Err(QueryRejection::UnsupportedLanguage)
        );
    }

    #[test]
    fn test_short_query_is_rejected() {
        assert_eq!(
            interpret_query("find developers", 10, &ENGLISH),
            Err(QueryRejection::TooShort)
        );
    }

    #[test]
    fn test_off_topic_query_is_rejected() {
        assert_eq!(
            interpret_query("Tell me about your lunch menu today", 10, &ENGLISH),
            Err(QueryRejection::OffTopic)
        );
    }

    #[test]
    fn test_undetermined_language_is_allowed_through() {
        let detector = Fixed(LanguageVerdict::Undetermined);
        let parsed = interpret_query("find 4 rust engineers", 10, &detector).unwrap();
        assert_eq!(parsed.requested_count, 4);
    }

    #[test]
    fn test_accepted_query_is_fully_parsed() {
        let parsed =
            interpret_query("Suggest 3 people for a React project", 10, &ENGLISH).unwrap();
        assert_eq!(
            parsed,
            ParsedQuery {
                language: LanguageVerdict::Supported,
                word_count: 7,
                has_relevant_keyword: true,
                requested_count: 3,
            }
        );
    }

    #[test]
    fn test_rejection_messages_are_fixed() {
        assert_eq!(QueryRejection::TooShort.message(), NEEDS_MORE_DETAIL);
        assert_eq!(QueryRejection::OffTopic.message(), OFF_TOPIC);
        assert_eq!(
            QueryRejection::UnsupportedLanguage.message(),
            UNSUPPORTED_LANGUAGE
        );
    }
}
