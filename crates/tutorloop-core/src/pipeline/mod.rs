//! Query routing and self-correction pipeline
//!
//! A query is validated, routed to the knowledge base or web search, answered
//! by the language model, scored, and if the score is too low, rewritten
//! and stored for next time.

mod correction;
mod evaluator;
mod orchestrator;
pub mod prompts;
mod solver;

pub use correction::{
    probe_from_config, AlwaysAvailable, AvailabilityProbe, CorrectionLoop, CorrectionOutcome,
    HttpStatusProbe, CORRECTION_DEGRADED,
};
pub use evaluator::{extract_scores, parse_evaluation, Evaluation, EvaluationVerdict, Evaluator};
pub use orchestrator::{
    QueryOrchestrator, RoutingSettings, INSUFFICIENT_INFORMATION, REVIEW_UNAVAILABLE,
};
pub use solver::SolutionGenerator;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the generation context came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    KnowledgeBase,
    WebSearch,
    /// Web search was attempted but failed; context holds the failure notice
    WebSearchDegraded,
}

impl Provenance {
    /// Label shown to the model and in CLI output
    pub fn label(&self) -> &'static str {
        match self {
            Provenance::KnowledgeBase => "Knowledge Base",
            Provenance::WebSearch => "Web Search",
            Provenance::WebSearchDegraded => "Web Search (Failed)",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Material handed to the solution generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    pub provenance: Provenance,
    pub text: String,
}

impl Context {
    pub fn from_knowledge(matched_question: &str, answer: &str) -> Self {
        Self {
            provenance: Provenance::KnowledgeBase,
            text: format!(
                "The answer was found in the knowledge base.\n\
                 QUESTION IN KB: {}\n\
                 ANSWER IN KB: {}\n\
                 Please use this information to create a step-by-step solution.",
                matched_question, answer
            ),
        }
    }

    pub fn from_web(search_context: &str) -> Self {
        Self {
            provenance: Provenance::WebSearch,
            text: format!(
                "The answer was not in our knowledge base. Web search context: {}",
                search_context
            ),
        }
    }

    pub fn degraded(search_context: &str) -> Self {
        Self {
            provenance: Provenance::WebSearchDegraded,
            text: format!(
                "The answer was not in our knowledge base. Web search was unavailable: {}",
                search_context
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Validating,
    Routing,
    Generating,
    Evaluating,
    Approved,
    Escalating,
    Done,
}

/// How a query was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    Rejected,
    InsufficientInformation,
    Approved,
    Corrected,
    ReviewUnavailable,
    CorrectionFailed,
}

/// Final result of one pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    pub answer: String,
    pub disposition: Disposition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review: Option<Evaluation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    pub states: Vec<PipelineState>,
}

impl PipelineOutcome {
    fn new(answer: impl Into<String>, disposition: Disposition) -> Self {
        Self {
            answer: answer.into(),
            disposition,
            provenance: None,
            review: None,
            record_id: None,
            states: Vec::new(),
        }
    }
}
