//! Tutorloop Core Library
//!
//! Answers math questions through a self-correcting pipeline.
//!
//! # Features
//! - Input and output guardrails for educational math content
//! - SQLite knowledge base with embedding similarity lookup
//! - Web search fallback through an MCP-style HTTP search service
//! - LLM solution generation with self-evaluation
//! - Correction loop that writes improved answers back to the knowledge base

pub mod config;
pub mod db;
pub mod error;
pub mod guardrails;
pub mod knowledge;
pub mod llm;
pub mod pipeline;
pub mod web;

pub use config::{Config, CorrectionConfig, KnowledgeConfig, LLMServiceConfig, SearchGatewayConfig};
pub use db::{Database, KnowledgeStats, NewRecord, RecordInfo};
pub use error::{Error, Result, TutorLoopError};
pub use guardrails::{Guardrails, Verdict};
pub use knowledge::{
    CorrectionMetadata, KnowledgeHit, KnowledgeLookup, KnowledgeSource, KnowledgeStore,
};
pub use llm::{
    ChatMessage, Embedder, HashEmbedder, HttpEmbedder, LLMClient, LlmTextGenerator,
    TextGenerator, VLLMClient,
};
pub use pipeline::{
    CorrectionLoop, Disposition, Evaluation, PipelineOutcome, PipelineState, Provenance,
    QueryOrchestrator,
};
pub use web::{HttpSearchGateway, SearchGateway, SearchResponse, SearchStatus};

/// Default cache directory name
pub const CACHE_DIR_NAME: &str = "tutorloop";

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "tutorloop";
