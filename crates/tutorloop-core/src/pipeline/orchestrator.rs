//! Query orchestrator
//!
//! Drives one question through `Validating -> Routing -> Generating ->
//! Evaluating -> Approved | Escalating -> Done`. Every dependency is injected;
//! only a failed knowledge write escapes as an error.

use super::{
    probe_from_config, Context, CorrectionLoop, CorrectionOutcome, Disposition,
    EvaluationVerdict, Evaluator, PipelineOutcome, PipelineState, Provenance, SolutionGenerator,
};
use crate::config::Config;
use crate::error::Result;
use crate::guardrails::{Guardrails, Verdict};
use crate::knowledge::{KnowledgeLookup, KnowledgeSource, KnowledgeStore};
use crate::llm::{embedder_from_config, LlmTextGenerator, TextGenerator};
use crate::web::{HttpSearchGateway, SearchGateway};
use std::sync::Arc;

pub const INSUFFICIENT_INFORMATION: &str = "I don't have enough information to answer this question accurately. The topic may be too specialized or I need more context.";

pub const REVIEW_UNAVAILABLE: &str = "I need human review for this answer, but the feedback system is currently unavailable. Please try again later or ask a different question.";

/// Lookup limits used while routing
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingSettings {
    pub kb_max_results: usize,
    pub kb_threshold: f64,
    pub search_max_results: usize,
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self {
            kb_max_results: 2,
            kb_threshold: 0.6,
            search_max_results: 3,
        }
    }
}

impl RoutingSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            kb_max_results: config.knowledge.max_results,
            kb_threshold: config.knowledge.threshold,
            search_max_results: config.search.max_results,
        }
    }
}

enum Routed {
    Context(Context),
    Insufficient,
}

/// Records visited states and logs each transition
struct StateTrace {
    states: Vec<PipelineState>,
}

impl StateTrace {
    fn new() -> Self {
        Self { states: Vec::new() }
    }

    fn enter(&mut self, state: PipelineState) {
        tracing::debug!("Pipeline state: {:?}", state);
        self.states.push(state);
    }

    fn finish(mut self, mut outcome: PipelineOutcome) -> PipelineOutcome {
        self.enter(PipelineState::Done);
        outcome.states = self.states;
        outcome
    }
}

pub struct QueryOrchestrator {
    guardrails: Guardrails,
    knowledge: Arc<dyn KnowledgeSource>,
    search: Arc<dyn SearchGateway>,
    solver: SolutionGenerator,
    evaluator: Evaluator,
    correction: Option<CorrectionLoop>,
    routing: RoutingSettings,
}

impl QueryOrchestrator {
    /// Orchestrator using `generator` for both solving and evaluation, with
    /// no correction loop
    pub fn new(
        knowledge: Arc<dyn KnowledgeSource>,
        search: Arc<dyn SearchGateway>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            guardrails: Guardrails::default(),
            knowledge,
            search,
            solver: SolutionGenerator::new(generator.clone()),
            evaluator: Evaluator::new(generator),
            correction: None,
            routing: RoutingSettings::default(),
        }
    }

    pub fn with_evaluator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.evaluator = Evaluator::new(generator);
        self
    }

    pub fn with_correction(mut self, correction: CorrectionLoop) -> Self {
        self.correction = Some(correction);
        self
    }

    pub fn with_guardrails(mut self, guardrails: Guardrails) -> Self {
        self.guardrails = guardrails;
        self
    }

    pub fn with_routing(mut self, routing: RoutingSettings) -> Self {
        self.routing = routing;
        self
    }

    /// Build the production pipeline from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let embedder = embedder_from_config(config)?;
        let store = Arc::new(KnowledgeStore::open(&config.knowledge, embedder)?);
        Self::with_store(config, store)
    }

    /// Build the production pipeline around an already opened store
    pub fn with_store(config: &Config, store: Arc<KnowledgeStore>) -> Result<Self> {
        let generator: Arc<dyn TextGenerator> =
            Arc::new(LlmTextGenerator::from_config(config.llm_service.clone())?);
        let search = Arc::new(HttpSearchGateway::new(config.search.clone()));

        let mut orchestrator = Self::new(store.clone(), search, generator.clone())
            .with_routing(RoutingSettings::from_config(config));

        if config.correction.enabled {
            let correction = CorrectionLoop::new(generator, store)
                .with_probe(probe_from_config(&config.correction));
            orchestrator = orchestrator.with_correction(correction);
        }

        Ok(orchestrator)
    }

    /// Answer a question, returning only the final text
    pub async fn answer_question(&self, question: &str) -> Result<String> {
        self.run(question).await.map(|outcome| outcome.answer)
    }

    /// Run the full pipeline for one question
    pub async fn run(&self, question: &str) -> Result<PipelineOutcome> {
        let mut trace = StateTrace::new();

        trace.enter(PipelineState::Validating);
        if let Verdict::Reject(reason) = self.guardrails.validate_input(question) {
            tracing::info!("Query rejected: {}", reason);
            return Ok(trace.finish(PipelineOutcome::new(
                format!("Error: {}", reason),
                Disposition::Rejected,
            )));
        }

        trace.enter(PipelineState::Routing);
        let context = match self.route(question).await {
            Routed::Context(context) => context,
            Routed::Insufficient => {
                let mut outcome = PipelineOutcome::new(
                    INSUFFICIENT_INFORMATION,
                    Disposition::InsufficientInformation,
                );
                outcome.provenance = Some(Provenance::WebSearch);
                return Ok(trace.finish(outcome));
            }
        };
        let provenance = context.provenance;

        trace.enter(PipelineState::Generating);
        let solution = self.solver.solve(question, &context, &self.guardrails).await;

        trace.enter(PipelineState::Evaluating);
        let review = match self.evaluator.evaluate(question, &solution).await {
            EvaluationVerdict::Approved => {
                trace.enter(PipelineState::Approved);
                let mut outcome = PipelineOutcome::new(solution, Disposition::Approved);
                outcome.provenance = Some(provenance);
                return Ok(trace.finish(outcome));
            }
            EvaluationVerdict::NeedsReview(review) => review,
        };

        trace.enter(PipelineState::Escalating);
        tracing::info!(
            "Solution needs review (accuracy {}, clarity {})",
            review.accuracy,
            review.clarity
        );

        // Availability is checked per escalation, not cached
        let correction = match self.correction {
            Some(ref correction) => {
                if correction.is_available().await {
                    Some(correction)
                } else {
                    None
                }
            }
            None => None,
        };

        let mut outcome = match correction {
            Some(correction) => {
                match correction.correct(question, &review).await? {
                    CorrectionOutcome::Corrected { answer, record_id } => {
                        let mut outcome = PipelineOutcome::new(answer, Disposition::Corrected);
                        outcome.record_id = Some(record_id);
                        outcome
                    }
                    CorrectionOutcome::Failed(message) => {
                        PipelineOutcome::new(message, Disposition::CorrectionFailed)
                    }
                }
            }
            _ => {
                tracing::warn!("Review needed but correction is unavailable");
                PipelineOutcome::new(REVIEW_UNAVAILABLE, Disposition::ReviewUnavailable)
            }
        };
        outcome.provenance = Some(provenance);
        outcome.review = Some(review);
        Ok(trace.finish(outcome))
    }

    async fn route(&self, question: &str) -> Routed {
        let lookup = self
            .knowledge
            .search(question, self.routing.kb_max_results, self.routing.kb_threshold)
            .await;

        match lookup {
            KnowledgeLookup::Hit(hit) => {
                tracing::info!(
                    "Answering from knowledge base (similarity {:.3}): {}",
                    hit.similarity_score,
                    hit.matched_question
                );
                return Routed::Context(Context::from_knowledge(
                    &hit.matched_question,
                    &hit.record.answer,
                ));
            }
            KnowledgeLookup::Miss => {
                tracing::info!("No knowledge base match, searching the web");
            }
            KnowledgeLookup::Unavailable(reason) => {
                tracing::warn!("Knowledge base unavailable ({}), searching the web", reason);
            }
        }

        let response = self
            .search
            .search(question, self.routing.search_max_results)
            .await;

        if response.is_failed() {
            tracing::warn!("Web search failed: {:?}", response.status);
            return Routed::Context(Context::degraded(&response.to_context()));
        }

        if response
            .entries
            .iter()
            .any(|entry| self.guardrails.contains_uncertainty(entry))
        {
            tracing::info!("Web results signal uncertainty, not generating");
            return Routed::Insufficient;
        }

        Routed::Context(Context::from_web(&response.to_context()))
    }
}
