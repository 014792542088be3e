//! LLM integration
//!
//! Provides traits and implementations for:
//! - Chat completion via external services (vLLM, OpenAI, etc.)
//! - Embedding generation, remote or local hash-based
//! - Single-prompt text generation used by the query pipeline

mod cache;
mod client;
mod generator;
mod hash_embedder;
mod http_embedder;
mod traits;

pub use cache::LLMCache;
pub use client::{ChatMessage, LLMClient, VLLMClient};
pub use generator::{LlmTextGenerator, EMPTY_COMPLETION_FALLBACK};
pub use hash_embedder::{HashEmbedder, DEFAULT_HASH_DIMENSIONS};
pub use http_embedder::HttpEmbedder;
pub use traits::*;

use crate::config::{Config, EmbedderKind};
use crate::error::Result;
use std::sync::Arc;

/// Build the embedder selected by configuration
pub fn embedder_from_config(config: &Config) -> Result<Arc<dyn Embedder>> {
    match config.knowledge.embedder {
        EmbedderKind::Hash => Ok(Arc::new(HashEmbedder::new(
            config.knowledge.hash_dimensions,
        )?)),
        EmbedderKind::Http => Ok(Arc::new(HttpEmbedder::from_config(
            config.llm_service.clone(),
        )?)),
    }
}
