//! Knowledge base
//!
//! Question/answer records with similarity lookup. Seeded with a small
//! corpus on first use and extended by the correction loop; nothing is ever
//! edited or removed.

mod seed;
mod store;

pub use seed::{seed_records, SeedEntry, SEED_CORPUS};
pub use store::KnowledgeStore;

use crate::db::RecordInfo;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Source tag for records loaded from the seed corpus
pub const SOURCE_SEED: &str = "seed_corpus";

/// Source tag for records written by the correction loop
pub const SOURCE_CORRECTION: &str = "human_feedback_loop";

/// Review details stored alongside a corrected record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionMetadata {
    pub original_question: String,
    pub accuracy_score: u8,
    pub clarity_score: u8,
    pub correction_reason: String,
    pub source: String,
}

impl CorrectionMetadata {
    pub fn new(
        original_question: impl Into<String>,
        accuracy_score: u8,
        clarity_score: u8,
        correction_reason: impl Into<String>,
    ) -> Self {
        Self {
            original_question: original_question.into(),
            accuracy_score,
            clarity_score,
            correction_reason: correction_reason.into(),
            source: SOURCE_CORRECTION.to_string(),
        }
    }
}

/// The closest record accepted for a query
#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeHit {
    pub matched_question: String,
    pub record: RecordInfo,
    pub similarity_score: f32,
}

impl KnowledgeHit {
    pub fn distance(&self) -> f64 {
        1.0 - self.similarity_score as f64
    }
}

/// Result of a knowledge lookup
#[derive(Debug, Clone)]
pub enum KnowledgeLookup {
    Hit(Box<KnowledgeHit>),
    Miss,
    /// The store could not be consulted
    Unavailable(String),
}

impl KnowledgeLookup {
    pub fn hit(&self) -> Option<&KnowledgeHit> {
        match self {
            KnowledgeLookup::Hit(hit) => Some(hit),
            _ => None,
        }
    }
}

/// Read/append access to a knowledge base
#[async_trait]
pub trait KnowledgeSource: Send + Sync {
    /// Find the closest record; it counts only if its cosine distance is
    /// strictly below `threshold`.
    async fn search(&self, query: &str, max_results: usize, threshold: f64) -> KnowledgeLookup;

    /// Persist a corrected answer and return its id.
    ///
    /// Failures are reported as [`crate::TutorLoopError::KnowledgeWrite`].
    async fn add_corrected_answer(
        &self,
        question: &str,
        answer: &str,
        metadata: CorrectionMetadata,
    ) -> Result<String>;
}
