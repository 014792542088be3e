//! Error types for tutorloop

use thiserror::Error;

/// Result type alias using TutorLoopError
pub type Result<T> = std::result::Result<T, TutorLoopError>;

/// Error type alias for convenience
pub type Error = TutorLoopError;

/// Exit codes for CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const NOT_FOUND: i32 = 2;
    pub const INVALID_INPUT: i32 = 3;
    pub const KNOWLEDGE_WRITE_FAILED: i32 = 4;
}

/// Main error type for tutorloop
#[derive(Debug, Error)]
pub enum TutorLoopError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// The store holds records, but none were embedded by the active model
    #[error("embedding model mismatch: store has {stored}, active embedder is {active}")]
    EmbeddingModelMismatch { stored: String, active: String },

    #[error("Search error: {0}")]
    Search(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External service error: {0}")]
    ExternalError(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    /// A corrected answer could not be persisted. This is the only failure
    /// the query pipeline surfaces to its caller.
    #[error("Knowledge base write failed: {0}")]
    KnowledgeWrite(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl TutorLoopError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::RecordNotFound(_) => exit_codes::NOT_FOUND,
            Self::InvalidInput(_) | Self::Config(_) | Self::EmbeddingModelMismatch { .. } => {
                exit_codes::INVALID_INPUT
            }
            Self::KnowledgeWrite(_) => exit_codes::KNOWLEDGE_WRITE_FAILED,
            _ => exit_codes::GENERAL_ERROR,
        }
    }

    /// Whether this error must reach the caller of the query pipeline
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::KnowledgeWrite(_))
    }
}
