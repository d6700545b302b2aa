// Prompt template and the fixed user-facing fallback strings for the query pipeline.

/// Returned when the query is detected as a language other than English.
pub const UNSUPPORTED_LANGUAGE: &str = "Currently, this HR assistant supports English queries only. \
    Please translate your request to English.";

/// Returned when the query has fewer than the minimum number of words.
pub const NEEDS_MORE_DETAIL: &str =
    "Please provide a more detailed query to help me find the best candidates for you.";

/// Returned when the query mentions none of the staffing keywords.
pub const OFF_TOPIC: &str = "No matching candidates found for your request. \
    Please provide a query related to candidate or project matching.";

/// Returned when generation fails for any reason (error, timeout, malformed output).
pub const GENERATION_ERROR: &str =
    "An error occurred while processing your request. Please try again.";

/// Returned when the model produced nothing usable.
pub const LOW_CONFIDENCE: &str = "No matching candidates found for your request. \
    Please refine your query with different skills, projects, or technologies.";

/// Answer synthesis template. Replace `{context}` and `{question}` before sending.
pub const RECOMMENDATION_PROMPT_TEMPLATE: &str = r#"Based on the following context about available candidates, answer the user's request with a warm, structured, human-like recommendation listing the requested number of candidates with their details.

Context:
{context}

User Request:
{question}

Answer in this format:
"Based on your requirements for <requirements>, I found excellent candidates:
1) <Name>...
2) <Name>...
...
All have the technical depth and domain expertise you need. Would you like me to provide more details about their specific projects or check their availability for meetings?""#;
