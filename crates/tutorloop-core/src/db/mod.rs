//! Database layer for tutorloop
//!
//! SQLite storage for the knowledge base:
//! - Append-only question/answer records
//! - Per-record embeddings with in-process cosine ranking

mod records;
mod schema;
mod stats;
pub mod vectors;

pub use records::{NewRecord, RecordInfo};
pub use schema::Database;
pub use stats::KnowledgeStats;
pub use vectors::RankedRecord;
use std::path::PathBuf;

impl Database {
    /// Get the default database path
    pub fn default_path() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CACHE_DIR_NAME)
            .join("knowledge.sqlite")
    }
}
