//! Content guardrails
//!
//! Gate incoming queries to the math domain and hold generated solutions to
//! an educational standard. None of these checks fail: each returns a
//! [`Verdict`] or a rewritten string.

mod input;
mod output;

pub use input::{
    contains_uncertainty, MATH_KEYWORDS, MIN_QUERY_CHARS, OFF_TOPIC, QUERY_TOO_SHORT,
    UNCERTAINTY_PHRASES,
};
pub use output::{
    sanitize, validate_output, EDUCATIONAL_KEYWORDS, INAPPROPRIATE, MIN_STEP_MARKERS, MIN_WORDS,
    NOT_MATHEMATICAL, NOT_STEP_BY_STEP, REDACTION, TOO_BRIEF,
};

use serde::{Deserialize, Serialize};

/// Outcome of a guardrail check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", content = "reason", rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Reject(String),
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Pass)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Verdict::Pass => None,
            Verdict::Reject(reason) => Some(reason),
        }
    }
}

/// Guardrail set used by the query pipeline
#[derive(Debug, Clone)]
pub struct Guardrails {
    keywords: Vec<String>,
}

impl Default for Guardrails {
    fn default() -> Self {
        Self {
            keywords: MATH_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl Guardrails {
    /// Accept queries mentioning `keyword` in addition to the built-in list
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keywords.push(keyword.into().to_lowercase());
        self
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn validate_input(&self, query: &str) -> Verdict {
        input::validate_input(query, &self.keywords)
    }

    pub fn validate_output(&self, response: &str) -> Verdict {
        output::validate_output(response)
    }

    pub fn sanitize(&self, response: &str) -> String {
        output::sanitize(response)
    }

    pub fn contains_uncertainty(&self, text: &str) -> bool {
        input::contains_uncertainty(text)
    }
}
