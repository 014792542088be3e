//! Request-side checks

use super::Verdict;

/// Terms of which at least one must appear in a query
pub const MATH_KEYWORDS: &[&str] = &[
    "calculate",
    "solve",
    "equation",
    "derivative",
    "integral",
    "algebra",
    "geometry",
    "theorem",
    "formula",
    "math",
    "probability",
    "trigonometry",
    "calculus",
    "matrix",
    "vector",
    "statistics",
];

pub const MIN_QUERY_CHARS: usize = 3;

pub const QUERY_TOO_SHORT: &str = "Query too short. Please provide a complete question.";
pub const OFF_TOPIC: &str =
    "This system only processes mathematics-related queries. Please ask a math question.";

/// Validate a raw query against the length floor and keyword allowlist.
///
/// Keywords match as case-insensitive substrings, so "mathematics" passes
/// through "math".
pub fn validate_input(query: &str, keywords: &[String]) -> Verdict {
    let trimmed = query.trim();
    if trimmed.chars().count() < MIN_QUERY_CHARS {
        return Verdict::Reject(QUERY_TOO_SHORT.to_string());
    }

    let lower = trimmed.to_lowercase();
    if !keywords.iter().any(|k| lower.contains(k.as_str())) {
        return Verdict::Reject(OFF_TOPIC.to_string());
    }

    Verdict::Pass
}

/// Phrases in retrieved material that mean the source had nothing to offer
pub const UNCERTAINTY_PHRASES: &[&str] = &[
    "i don't know",
    "i cannot",
    "not sure",
    "uncertain",
    "no information",
    "not found",
    "unable to",
    "don't have",
];

pub fn contains_uncertainty(text: &str) -> bool {
    let lower = text.to_lowercase();
    UNCERTAINTY_PHRASES.iter().any(|p| lower.contains(p))
}
