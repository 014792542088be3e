//! Solution generation

use super::prompts::solution_prompt;
use super::Context;
use crate::guardrails::{Guardrails, Verdict};
use crate::llm::TextGenerator;
use std::sync::Arc;

/// Produces a sanitized step-by-step solution from a routed context
pub struct SolutionGenerator {
    generator: Arc<dyn TextGenerator>,
}

impl SolutionGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Generate, flag output that misses the guardrails, then sanitize
    pub async fn solve(&self, question: &str, context: &Context, guardrails: &Guardrails) -> String {
        let prompt = solution_prompt(question, context.provenance.label(), &context.text);
        let mut solution = self.generator.generate(&prompt).await;

        if let Verdict::Reject(reason) = guardrails.validate_output(&solution) {
            tracing::debug!("Solution failed output checks: {}", reason);
            solution = format!("Note: {}\n\nProceeding with caution:\n{}", reason, solution);
        }

        guardrails.sanitize(&solution)
    }
}
