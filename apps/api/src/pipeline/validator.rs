//! Response validator — replaces empty or "don't know" answers with a fixed
//! refine-your-query message.

use crate::pipeline::prompts::LOW_CONFIDENCE;

/// Lowercase phrases that mark a generated answer as a non-answer.
const NON_ANSWER_MARKERS: &[&str] = &["i don't know", "i don\u{2019}t know", "i do not know"];

pub fn is_low_confidence(text: &str) -> bool {
    if text.trim().is_empty() {
        return true;
    }
    let lowered = text.to_lowercase();
    NON_ANSWER_MARKERS.iter().any(|m| lowered.contains(m))
}

/// `None` when the text passes, otherwise the fallback to show instead.
pub fn validate_response(text: &str) -> Option<&'static str> {
    is_low_confidence(text).then_some(LOW_CONFIDENCE)
}
