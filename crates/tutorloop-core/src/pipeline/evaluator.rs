//! Solution scoring

use super::prompts::{evaluation_prompt, REVIEW_MARKER};
use crate::llm::TextGenerator;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

lazy_static! {
    static ref ACCURACY_RE: Regex = Regex::new(r"Accuracy Score:\s*([0-9]+)").unwrap();
    static ref CLARITY_RE: Regex = Regex::new(r"Clarity Score:\s*([0-9]+)").unwrap();
    static ref REASON_RE: Regex =
        Regex::new(r"(?s)Reason:\s*(.+?)(?:HUMAN_FEEDBACK_NEEDED|$)").unwrap();
}

pub const MAX_SCORE: u8 = 10;
pub const NO_REASON: &str = "No reason provided";

/// Review scores extracted from an evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub accuracy: u8,
    pub clarity: u8,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluationVerdict {
    Approved,
    NeedsReview(Evaluation),
}

fn score(re: &Regex, text: &str) -> u8 {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| {
            m.as_str()
                .parse::<u32>()
                .map(|n| n.min(MAX_SCORE as u32) as u8)
                // too many digits for u32, clamp all the same
                .unwrap_or(MAX_SCORE)
        })
        .unwrap_or(0)
}

/// Pull scores and reason out of evaluator text, defaulting what is missing
pub fn extract_scores(text: &str) -> Evaluation {
    let reason = REASON_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| NO_REASON.to_string());

    Evaluation {
        accuracy: score(&ACCURACY_RE, text),
        clarity: score(&CLARITY_RE, text),
        reason,
    }
}

/// Interpret evaluator output. Anything without the review marker counts as
/// approved, including degraded `Error: ...` output.
pub fn parse_evaluation(text: &str) -> EvaluationVerdict {
    if text.contains(REVIEW_MARKER) {
        EvaluationVerdict::NeedsReview(extract_scores(text))
    } else {
        EvaluationVerdict::Approved
    }
}

/// Scores generated solutions with a second model call
pub struct Evaluator {
    generator: Arc<dyn TextGenerator>,
}

impl Evaluator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub async fn evaluate(&self, question: &str, solution: &str) -> EvaluationVerdict {
        let raw = self
            .generator
            .generate(&evaluation_prompt(question, solution))
            .await;
        parse_evaluation(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_scores_and_reason() {
        let text = "HUMAN_FEEDBACK_NEEDED: Accuracy Score: 5, Clarity Score: 9. Reason: too terse";
        assert_eq!(
            extract_scores(text),
            Evaluation {
                accuracy: 5,
                clarity: 9,
                reason: "too terse".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_fields_default() {
        let eval = extract_scores("HUMAN_FEEDBACK_NEEDED");
        assert_eq!(eval.accuracy, 0);
        assert_eq!(eval.clarity, 0);
        assert_eq!(eval.reason, NO_REASON);
    }

    #[test]
    fn test_scores_clamped() {
        let eval = extract_scores("Accuracy Score: 12, Clarity Score: 99999999999999");
        assert_eq!(eval.accuracy, 10);
        assert_eq!(eval.clarity, 10);
    }

    #[test]
    fn test_non_ascii_digits_are_not_scores() {
        let eval = extract_scores("Accuracy Score: \u{0665}, Clarity Score: \u{096F}");
        assert_eq!(eval.accuracy, 0);
        assert_eq!(eval.clarity, 0);

        let mixed = extract_scores("Accuracy Score: 7\u{0665}");
        assert_eq!(mixed.accuracy, 7);
    }

    #[test]
    fn test_reason_stops_at_next_marker() {
        let text = "HUMAN_FEEDBACK_NEEDED: Accuracy Score: 3, Clarity Score: 4. Reason: wrong sign\n\
                    spans lines HUMAN_FEEDBACK_NEEDED again";
        assert_eq!(extract_scores(text).reason, "wrong sign\nspans lines");
    }

    #[test]
    fn test_verdicts() {
        assert_eq!(parse_evaluation("APPROVED: fine"), EvaluationVerdict::Approved);
        assert_eq!(parse_evaluation("looks ok"), EvaluationVerdict::Approved);
        assert_eq!(
            parse_evaluation("Error: LLM error: down"),
            EvaluationVerdict::Approved
        );
        assert!(matches!(
            parse_evaluation("HUMAN_FEEDBACK_NEEDED: Accuracy Score: 2"),
            EvaluationVerdict::NeedsReview(Evaluation { accuracy: 2, .. })
        ));
    }
}
