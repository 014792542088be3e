//! HTTP client for the MCP-style search service

use super::{format_entry, SearchFailure, SearchGateway, SearchResponse};
use crate::config::SearchGatewayConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

#[derive(Serialize)]
struct CallRequest<'a> {
    function: &'a str,
    arguments: SearchArguments<'a>,
}

#[derive(Serialize)]
struct SearchArguments<'a> {
    query: String,
    max_results: usize,
    include_domains: &'a [String],
}

/// Search gateway speaking `POST {url}/call` / `GET {url}/health`
pub struct HttpSearchGateway {
    client: Client,
    config: SearchGatewayConfig,
    connected: AtomicBool,
}

impl HttpSearchGateway {
    pub fn new(config: SearchGatewayConfig) -> Self {
        let client = Client::builder()
            .user_agent(concat!("tutorloop/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            config,
            connected: AtomicBool::new(false),
        }
    }

    /// Whether a health probe has succeeded yet
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    /// Probe `GET {url}/health`; success is remembered for the life of the gateway
    pub async fn probe(&self) -> bool {
        if self.is_connected() {
            return true;
        }

        let url = format!("{}/health", self.config.url.trim_end_matches('/'));
        let result = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(self.config.health_timeout_secs))
            .send()
            .await;

        match result {
            Ok(response) if response.status() == StatusCode::OK => {
                tracing::info!("Search service reachable at {}", self.config.url);
                self.connected.store(true, Ordering::Relaxed);
                true
            }
            Ok(response) => {
                tracing::warn!("Search service health check returned {}", response.status());
                false
            }
            Err(e) => {
                tracing::warn!("Search service health check failed: {}", e);
                false
            }
        }
    }

    fn map_send_error(&self, query: &str, e: reqwest::Error) -> SearchResponse {
        if e.is_timeout() {
            SearchResponse::failed(
                query,
                SearchFailure::Timeout,
                "Search timeout: Server took too long to respond",
            )
        } else if e.is_decode() || e.is_body() {
            SearchResponse::failed(
                query,
                SearchFailure::MalformedBody,
                format!("Search response could not be read: {}", e),
            )
        } else {
            SearchResponse::failed(
                query,
                SearchFailure::Connection,
                format!("Search connection failed: {}", e),
            )
        }
    }
}

/// Normalize a successful response body
pub(crate) fn parse_body(query: &str, body: &Value, max_results: usize) -> SearchResponse {
    let entries: Vec<String> = match body.get("content") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().map(format_entry).collect(),
        Some(other) => vec![format_entry(other)],
    };

    if entries.is_empty() {
        return SearchResponse::empty(query);
    }

    SearchResponse::found(query, entries.into_iter().take(max_results.max(1)).collect())
}

#[async_trait]
impl SearchGateway for HttpSearchGateway {
    async fn search(&self, query: &str, max_results: usize) -> SearchResponse {
        if !self.probe().await {
            tracing::debug!("Searching without a successful health check");
        }

        let request = CallRequest {
            function: "search",
            arguments: SearchArguments {
                query: format!("{} {}", self.config.query_prefix, query),
                max_results,
                include_domains: &self.config.include_domains,
            },
        };

        let url = format!("{}/call", self.config.url.trim_end_matches('/'));
        let response = match self
            .client
            .post(&url)
            .json(&request)
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Search request failed: {}", e);
                return self.map_send_error(query, e);
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!("Search service returned {}", status);
            return SearchResponse::failed(
                query,
                SearchFailure::HttpStatus(status.as_u16()),
                format!("Search service returned HTTP {}", status.as_u16()),
            );
        }

        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => return self.map_send_error(query, e),
        };

        match serde_json::from_str::<Value>(&text) {
            Ok(body) => {
                let parsed = parse_body(query, &body, max_results);
                tracing::debug!(
                    "Search for '{}' returned {} entries ({:?})",
                    query,
                    parsed.entries.len(),
                    parsed.status
                );
                parsed
            }
            Err(e) => {
                tracing::warn!("Malformed search response: {}", e);
                SearchResponse::failed(
                    query,
                    SearchFailure::MalformedBody,
                    format!("Search response could not be parsed: {}", e),
                )
            }
        }
    }
}
