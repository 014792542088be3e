//! Web search gateway
//!
//! Asks an external search service for math material when the knowledge base
//! has nothing close enough. Transport problems never surface as errors: the
//! response always carries at least one printable entry plus a status saying
//! how it was obtained.

mod gateway;

pub use gateway::HttpSearchGateway;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Characters of each result body kept in an entry
pub const SNIPPET_CHARS: usize = 150;

/// Why a search produced no usable results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchFailure {
    Connection,
    Timeout,
    HttpStatus(u16),
    MalformedBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    /// Service answered with results
    Found,
    /// Service answered but had nothing
    Empty,
    Failed(SearchFailure),
}

/// Normalized search output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub entries: Vec<String>,
    pub status: SearchStatus,
}

impl SearchResponse {
    pub fn found(query: &str, entries: Vec<String>) -> Self {
        Self {
            query: query.to_string(),
            entries,
            status: SearchStatus::Found,
        }
    }

    pub fn empty(query: &str) -> Self {
        Self {
            query: query.to_string(),
            entries: vec![format!("No relevant web results found for '{}'", query)],
            status: SearchStatus::Empty,
        }
    }

    pub fn failed(query: &str, failure: SearchFailure, detail: impl Into<String>) -> Self {
        Self {
            query: query.to_string(),
            entries: vec![detail.into()],
            status: SearchStatus::Failed(failure),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, SearchStatus::Failed(_))
    }

    /// Render as a context block for solution generation
    pub fn to_context(&self) -> String {
        let mut out = format!("Web Search Results for '{}':", self.query);
        for entry in &self.entries {
            out.push_str("\n• ");
            out.push_str(entry);
        }
        out
    }
}

/// Format one result item from the search service
pub fn format_entry(item: &serde_json::Value) -> String {
    match item {
        serde_json::Value::Object(map) => {
            let title = map
                .get("title")
                .map(value_text)
                .unwrap_or_else(|| "No title".to_string());
            let content = map
                .get("content")
                .map(value_text)
                .unwrap_or_else(|| "No content".to_string());
            let snippet: String = content.chars().take(SNIPPET_CHARS).collect();
            format!("{}: {}...", title, snippet)
        }
        other => value_text(other),
    }
}

fn value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Search capability used by the query pipeline
#[async_trait]
pub trait SearchGateway: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> SearchResponse;
}
