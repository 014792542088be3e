//! CLI command handlers

pub mod ask;
pub mod config;
pub mod kb;

use std::sync::Arc;
use tutorloop_core::llm::embedder_from_config;
use tutorloop_core::{Config, KnowledgeStore};

/// Open the knowledge base described by `config`
pub(crate) fn open_store(config: &Config) -> anyhow::Result<Arc<KnowledgeStore>> {
    let embedder = embedder_from_config(config)?;
    Ok(Arc::new(KnowledgeStore::open(&config.knowledge, embedder)?))
}
