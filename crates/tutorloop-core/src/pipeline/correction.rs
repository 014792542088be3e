//! Correction loop
//!
//! Rewrites a low-scoring answer and stores the rewrite so the next identical
//! question is answered from the knowledge base.

use super::prompts::correction_prompt;
use super::Evaluation;
use crate::config::CorrectionConfig;
use crate::error::Result;
use crate::knowledge::{CorrectionMetadata, KnowledgeSource};
use crate::llm::TextGenerator;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;

pub const CORRECTION_DEGRADED: &str =
    "We're experiencing technical difficulties with our feedback system. Please try again later.";

/// Whether the review path can take work right now
#[async_trait]
pub trait AvailabilityProbe: Send + Sync {
    async fn is_available(&self) -> bool;
}

pub struct AlwaysAvailable;

#[async_trait]
impl AvailabilityProbe for AlwaysAvailable {
    async fn is_available(&self) -> bool {
        true
    }
}

/// `GET` a status URL; only a 200 within the timeout counts as available
pub struct HttpStatusProbe {
    client: Client,
    url: String,
    timeout: Duration,
}

impl HttpStatusProbe {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            timeout,
        }
    }
}

#[async_trait]
impl AvailabilityProbe for HttpStatusProbe {
    async fn is_available(&self) -> bool {
        match self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response.status() == StatusCode::OK,
            Err(e) => {
                tracing::warn!("Review status check failed: {}", e);
                false
            }
        }
    }
}

/// Probe selected by configuration
pub fn probe_from_config(config: &CorrectionConfig) -> Arc<dyn AvailabilityProbe> {
    match config.status_url {
        Some(ref url) => Arc::new(HttpStatusProbe::new(
            url.clone(),
            Duration::from_secs(config.status_timeout_secs),
        )),
        None => Arc::new(AlwaysAvailable),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorrectionOutcome {
    /// Rewrite generated and stored
    Corrected { answer: String, record_id: String },
    /// Rewrite could not be generated; nothing was stored
    Failed(String),
}

pub struct CorrectionLoop {
    generator: Arc<dyn TextGenerator>,
    knowledge: Arc<dyn KnowledgeSource>,
    probe: Arc<dyn AvailabilityProbe>,
}

impl CorrectionLoop {
    pub fn new(generator: Arc<dyn TextGenerator>, knowledge: Arc<dyn KnowledgeSource>) -> Self {
        Self {
            generator,
            knowledge,
            probe: Arc::new(AlwaysAvailable),
        }
    }

    pub fn with_probe(mut self, probe: Arc<dyn AvailabilityProbe>) -> Self {
        self.probe = probe;
        self
    }

    pub async fn is_available(&self) -> bool {
        self.probe.is_available().await
    }

    /// Generate a rewrite and store it.
    ///
    /// A generation failure is degraded into [`CorrectionOutcome::Failed`];
    /// a storage failure is returned as an error.
    pub async fn correct(&self, question: &str, review: &Evaluation) -> Result<CorrectionOutcome> {
        tracing::info!(
            "Correcting answer (accuracy {}/10, clarity {}/10): {}",
            review.accuracy,
            review.clarity,
            review.reason
        );

        let improved = match self
            .generator
            .try_generate(&correction_prompt(question, review))
            .await
        {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Correction generation failed: {}", e);
                return Ok(CorrectionOutcome::Failed(CORRECTION_DEGRADED.to_string()));
            }
        };

        let metadata = CorrectionMetadata::new(
            question,
            review.accuracy,
            review.clarity,
            review.reason.clone(),
        );
        let record_id = self
            .knowledge
            .add_corrected_answer(question, &improved, metadata)
            .await?;

        Ok(CorrectionOutcome::Corrected {
            answer: format!(
                "Solution Enhanced by Professor Review:\n\n{}\n\n\
                 *This improved solution has been added to our knowledge base for future students.*",
                improved
            ),
            record_id,
        })
    }
}
