//! LLM trait definitions

use crate::error::Result;
use async_trait::async_trait;

/// Embedding generation trait
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embedding for single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for batch of texts
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Prefix carried by every degraded generation output
pub const GENERATION_ERROR_PREFIX: &str = "Error:";

/// Single-prompt text generation.
///
/// `generate` never fails: any error becomes an `"Error: ..."` string that
/// callers treat like ordinary model output.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion, surfacing failures
    async fn try_generate(&self, prompt: &str) -> Result<String>;

    /// Generate a completion, folding failures into the output text
    async fn generate(&self, prompt: &str) -> String {
        match self.try_generate(prompt).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Generation failed: {}", e);
                format!("{} {}", GENERATION_ERROR_PREFIX, e)
            }
        }
    }

    /// Get model name
    fn model_name(&self) -> &str;
}
