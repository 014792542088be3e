//! Response-side checks and sanitization

use super::Verdict;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref STEP_MARKER_RE: Regex = Regex::new(r"Step \d+|step \d+|•|\d+\.").unwrap();
    static ref EXCESS_NEWLINES_RE: Regex = Regex::new(r"\n{3,}").unwrap();
    static ref DISALLOWED_RES: Vec<Regex> = vec![
        // vagueness
        Regex::new(r"(?i)\b(cannot|can't|don't know|unsure|guess|maybe|perhaps)\b").unwrap(),
        // safety
        Regex::new(r"(?i)\b(illegal|dangerous|harmful|violent|inappropriate)\b").unwrap(),
        // commercial
        Regex::new(r"(?i)\b(\$\$|money|cash|price|cost|buy|sell)\b").unwrap(),
    ];
}

/// Words of which at least one must appear in a solution
pub const EDUCATIONAL_KEYWORDS: &[&str] = &[
    "step",
    "solution",
    "calculate",
    "formula",
    "equation",
    "theorem",
    "proof",
    "derivative",
    "integral",
    "solve",
    "therefore",
    "thus",
    "hence",
    "result",
    "answer",
];

pub const MIN_STEP_MARKERS: usize = 2;
pub const MIN_WORDS: usize = 20;

pub const NOT_STEP_BY_STEP: &str = "Response should provide step-by-step solution";
pub const NOT_MATHEMATICAL: &str = "Response should contain mathematical explanations";
pub const INAPPROPRIATE: &str = "Response contains inappropriate content";
pub const TOO_BRIEF: &str = "Response should be sufficiently detailed";

pub const REDACTION: &str = "[REDACTED]";

/// Validate a generated solution. Checks run in a fixed order and the first
/// failure wins.
pub fn validate_output(response: &str) -> Verdict {
    if STEP_MARKER_RE.find_iter(response).count() < MIN_STEP_MARKERS {
        return Verdict::Reject(NOT_STEP_BY_STEP.to_string());
    }

    let lower = response.to_lowercase();
    if !EDUCATIONAL_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return Verdict::Reject(NOT_MATHEMATICAL.to_string());
    }

    if DISALLOWED_RES.iter().any(|re| re.is_match(response)) {
        return Verdict::Reject(INAPPROPRIATE.to_string());
    }

    if response.split_whitespace().count() < MIN_WORDS {
        return Verdict::Reject(TOO_BRIEF.to_string());
    }

    Verdict::Pass
}

/// Redact disallowed terms and tidy whitespace
pub fn sanitize(response: &str) -> String {
    let mut out = response.to_string();
    for re in DISALLOWED_RES.iter() {
        out = re.replace_all(&out, REDACTION).into_owned();
    }
    EXCESS_NEWLINES_RE
        .replace_all(&out, "\n\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &str = "Step 1: Write the equation x + 2 = 5. \
        Step 2: Subtract 2 from both sides to isolate x. \
        Therefore the solution is x = 3, which we can check by substituting back in.";

    #[test]
    fn test_good_solution_passes() {
        assert_eq!(validate_output(GOOD), Verdict::Pass);
    }

    #[test]
    fn test_missing_steps() {
        let text = "The answer is x = 3 because subtracting two from both sides gives it.";
        assert_eq!(validate_output(text).reason(), Some(NOT_STEP_BY_STEP));
    }

    #[test]
    fn test_bullets_and_numbers_count_as_steps() {
        let text = "• first\n• second";
        assert_ne!(validate_output(text).reason(), Some(NOT_STEP_BY_STEP));
        let text = "1. first\n2. second";
        assert_ne!(validate_output(text).reason(), Some(NOT_STEP_BY_STEP));
    }

    #[test]
    fn test_no_educational_keyword() {
        let text = "• do a thing\n• do another";
        assert_eq!(validate_output(text).reason(), Some(NOT_MATHEMATICAL));
    }

    #[test]
    fn test_vague_language_rejected_before_length() {
        let text = "Step 1 maybe. Step 2 the answer.";
        assert_eq!(validate_output(text).reason(), Some(INAPPROPRIATE));
    }

    #[test]
    fn test_words_inside_other_words_not_flagged() {
        let text = "Step 1: costume. Step 2: the answer is 4 since selling points \
            are not relevant here and we have more than enough words to pass the length check.";
        assert_eq!(validate_output(text), Verdict::Pass);
    }

    #[test]
    fn test_too_brief() {
        let text = "Step 1 x. Step 2 answer 3.";
        assert_eq!(validate_output(text).reason(), Some(TOO_BRIEF));
    }

    #[test]
    fn test_sanitize_redacts_and_collapses() {
        let text = "  Maybe x = 2.\n\n\n\nIt would COST nothing.  ";
        assert_eq!(
            sanitize(text),
            "[REDACTED] x = 2.\n\nIt would [REDACTED] nothing."
        );
    }

    #[test]
    fn test_sanitize_clean_text_unchanged() {
        assert_eq!(sanitize(GOOD), GOOD);
    }
}
