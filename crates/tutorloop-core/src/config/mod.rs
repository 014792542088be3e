//! Configuration management

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// LLM service configuration (generation, evaluation, correction, embeddings)
    #[serde(default)]
    pub llm_service: LLMServiceConfig,

    /// Web search gateway configuration
    #[serde(default)]
    pub search: SearchGatewayConfig,

    /// Knowledge base configuration
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Correction (review) loop configuration
    #[serde(default)]
    pub correction: CorrectionConfig,
}

/// LLM service configuration for external inference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMServiceConfig {
    /// Base URL of the LLM service for chat/completions
    #[serde(default = "default_llm_url")]
    pub url: String,

    /// Model name for chat completions
    #[serde(default = "default_chat_model")]
    pub model: String,

    /// Base URL for embeddings service (can be different from LLM URL)
    #[serde(default)]
    pub embedding_url: Option<String>,

    /// Model name for embeddings
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Embedding dimensions (will be auto-detected if not specified)
    #[serde(default)]
    pub embedding_dimensions: Option<usize>,

    /// API key (optional, for authenticated services)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Sampling temperature for completions
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Completion token budget
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl LLMServiceConfig {
    /// Get the embeddings URL (falls back to main URL if not specified)
    pub fn embeddings_url(&self) -> &str {
        self.embedding_url.as_deref().unwrap_or(&self.url)
    }
}

impl Default for LLMServiceConfig {
    fn default() -> Self {
        Self {
            url: default_llm_url(),
            model: default_chat_model(),
            embedding_url: std::env::var("TUTORLOOP_EMBEDDING_URL").ok(),
            embedding_model: default_embedding_model(),
            embedding_dimensions: std::env::var("TUTORLOOP_EMBEDDING_DIMS")
                .ok()
                .and_then(|s| s.parse().ok()),
            api_key: std::env::var("TUTORLOOP_LLM_API_KEY").ok(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_llm_url() -> String {
    std::env::var("TUTORLOOP_LLM_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

fn default_chat_model() -> String {
    std::env::var("TUTORLOOP_LLM_MODEL")
        .unwrap_or_else(|_| "meta-llama/Llama-3.1-8B-Instruct".to_string())
}

fn default_embedding_model() -> String {
    std::env::var("TUTORLOOP_EMBEDDING_MODEL")
        .unwrap_or_else(|_| "sentence-transformers/all-MiniLM-L6-v2".to_string())
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_timeout() -> u64 {
    30
}

/// Web search gateway (MCP-style HTTP search service)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchGatewayConfig {
    /// Base URL of the search service (`/health` and `/call` live under it)
    #[serde(default = "default_search_url")]
    pub url: String,

    /// Search call timeout in seconds
    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,

    /// Health probe timeout in seconds
    #[serde(default = "default_probe_timeout")]
    pub health_timeout_secs: u64,

    /// Maximum results requested per search
    #[serde(default = "default_search_results")]
    pub max_results: usize,

    /// Prefix prepended to every query sent to the search service
    #[serde(default = "default_query_prefix")]
    pub query_prefix: String,

    /// Domains the search service is asked to restrict itself to
    #[serde(default = "default_include_domains")]
    pub include_domains: Vec<String>,
}

impl Default for SearchGatewayConfig {
    fn default() -> Self {
        Self {
            url: default_search_url(),
            timeout_secs: default_search_timeout(),
            health_timeout_secs: default_probe_timeout(),
            max_results: default_search_results(),
            query_prefix: default_query_prefix(),
            include_domains: default_include_domains(),
        }
    }
}

fn default_search_url() -> String {
    std::env::var("TUTORLOOP_SEARCH_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

fn default_search_timeout() -> u64 {
    10
}

fn default_probe_timeout() -> u64 {
    5
}

fn default_search_results() -> usize {
    3
}

fn default_query_prefix() -> String {
    "mathematics".to_string()
}

fn default_include_domains() -> Vec<String> {
    vec![
        "khanacademy.org".to_string(),
        "mathsisfun.com".to_string(),
        "wolfram.com".to_string(),
    ]
}

/// Which embedding engine backs the knowledge base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmbedderKind {
    /// Deterministic token-hashing embedder, no network required
    #[default]
    Hash,
    /// OpenAI-compatible `/v1/embeddings` endpoint
    Http,
}

/// Knowledge base configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Database path (defaults to the cache directory)
    #[serde(default)]
    pub db_path: Option<PathBuf>,

    /// Candidates fetched per lookup
    #[serde(default = "default_kb_results")]
    pub max_results: usize,

    /// Maximum cosine distance (1 - similarity) accepted as a hit
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Embedding engine
    #[serde(default)]
    pub embedder: EmbedderKind,

    /// Dimensions of the hash embedder
    #[serde(default = "default_hash_dimensions")]
    pub hash_dimensions: usize,

    /// Load the seed corpus into an empty store on first use
    #[serde(default = "default_true")]
    pub seed: bool,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::var("TUTORLOOP_DB").ok().map(PathBuf::from),
            max_results: default_kb_results(),
            threshold: default_threshold(),
            embedder: EmbedderKind::default(),
            hash_dimensions: default_hash_dimensions(),
            seed: true,
        }
    }
}

impl KnowledgeConfig {
    /// Resolve the database path
    pub fn resolved_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(crate::db::Database::default_path)
    }
}

fn default_kb_results() -> usize {
    2
}

fn default_threshold() -> f64 {
    0.6
}

fn default_hash_dimensions() -> usize {
    256
}

fn default_true() -> bool {
    true
}

/// Correction loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionConfig {
    /// Whether escalated answers may be corrected at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Status endpoint polled before each correction; `None` means always available
    #[serde(default)]
    pub status_url: Option<String>,

    /// Status probe timeout in seconds
    #[serde(default = "default_probe_timeout")]
    pub status_timeout_secs: u64,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            status_url: std::env::var("TUTORLOOP_REVIEW_STATUS_URL").ok(),
            status_timeout_secs: default_probe_timeout(),
        }
    }
}

impl Config {
    /// Load config from default path
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_path())
    }

    /// Load config from a specific path, falling back to defaults if it does not exist
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to default path
    pub fn save(&self) -> Result<()> {
        self.save_to(Self::default_path())
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = r#"
knowledge:
  threshold: 0.4
search:
  url: http://search.local:9000
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!((config.knowledge.threshold - 0.4).abs() < f64::EPSILON);
        assert_eq!(config.knowledge.max_results, 2);
        assert_eq!(config.knowledge.embedder, EmbedderKind::Hash);
        assert_eq!(config.search.url, "http://search.local:9000");
        assert_eq!(config.search.max_results, 3);
        assert_eq!(config.search.include_domains.len(), 3);
        assert!(config.correction.enabled);
    }

    #[test]
    fn test_embedder_kind_is_snake_case() {
        let config: KnowledgeConfig = serde_yaml::from_str("embedder: http").unwrap();
        assert_eq!(config.embedder, EmbedderKind::Http);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yml");

        let mut config = Config::default();
        config.search.timeout_secs = 3;
        config.correction.enabled = false;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.search.timeout_secs, 3);
        assert!(!loaded.correction.enabled);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_from(dir.path().join("absent.yml")).unwrap();
        assert_eq!(loaded.llm_service.max_tokens, 1000);
    }
}
