//! HTTP client for external LLM services (vLLM, OpenAI, etc.)

use crate::config::LLMServiceConfig;
use crate::error::{Result, TutorLoopError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Trait for LLM service clients
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate chat completion
    async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<String>;

    /// Generate embeddings for text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get embedding dimensions
    fn embedding_dimensions(&self) -> usize;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Chat message for completion requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// vLLM/OpenAI-compatible client
pub struct VLLMClient {
    http_client: reqwest::Client,
    config: LLMServiceConfig,
    embedding_dimensions: usize,
    cache: Arc<super::cache::LLMCache>,
}

impl VLLMClient {
    /// Create new vLLM client from configuration
    pub fn new(config: LLMServiceConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(TutorLoopError::Http)?;

        // Use configured dimensions or default to 384
        let embedding_dimensions = config.embedding_dimensions.unwrap_or(384);

        Ok(Self {
            http_client,
            config,
            embedding_dimensions,
            cache: Arc::new(super::cache::LLMCache::new()),
        })
    }

    async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
        service: &str,
    ) -> Result<reqwest::Response> {
        let mut req = self.http_client.post(url).json(body);

        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                TutorLoopError::Timeout(format!("{} did not respond in time", service))
            } else {
                TutorLoopError::Http(e)
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TutorLoopError::ExternalError(format!(
                "{} error (HTTP {}): {}",
                service, status, body
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl LLMClient for VLLMClient {
    async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let start = Instant::now();
        let messages_json = serde_json::to_string(&messages)?;
        let cache_key = super::cache::chat_cache_key(&self.config.model, &messages_json);

        if let Some(cached) = self.cache.get(&cache_key) {
            tracing::debug!("Cache hit for chat completion");
            return Ok(cached);
        }

        #[derive(Serialize)]
        struct ChatRequest {
            model: String,
            messages: Vec<ChatMessage>,
            temperature: f32,
            max_tokens: u32,
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<ChatChoice>,
        }

        #[derive(Deserialize)]
        struct ChatChoice {
            message: ChatMessage,
        }

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let url = format!("{}/v1/chat/completions", self.config.url);
        let response = self.post_json(&url, &request, "LLM service").await?;

        let chat_response: ChatResponse = response.json().await.map_err(TutorLoopError::Http)?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| TutorLoopError::Llm("No response from LLM".to_string()))?
            .message
            .content;

        self.cache.set(cache_key, content.clone());
        tracing::debug!("Chat completion took {:?}", start.elapsed());

        Ok(content)
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed_batch(&[text.to_string()]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| TutorLoopError::Llm("No embedding returned".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let start = Instant::now();
        let mut results: Vec<Option<Vec<f32>>> = Vec::with_capacity(texts.len());
        let mut uncached_texts = Vec::new();
        let mut uncached_indices = Vec::new();

        for (i, text) in texts.iter().enumerate() {
            let cache_key = super::cache::embedding_cache_key(&self.config.embedding_model, text);
            if let Some(embedding) = self
                .cache
                .get(&cache_key)
                .and_then(|cached| serde_json::from_str::<Vec<f32>>(&cached).ok())
            {
                results.push(Some(embedding));
                continue;
            }
            results.push(None);
            uncached_texts.push(text.clone());
            uncached_indices.push(i);
        }

        if !uncached_texts.is_empty() {
            tracing::debug!(
                "Embedding batch: {} cached, {} to fetch",
                texts.len() - uncached_texts.len(),
                uncached_texts.len()
            );

            #[derive(Serialize)]
            struct EmbedRequest<'a> {
                model: &'a str,
                input: &'a [String],
            }

            #[derive(Deserialize)]
            struct EmbedResponse {
                data: Vec<EmbedData>,
            }

            #[derive(Deserialize)]
            struct EmbedData {
                embedding: Vec<f32>,
            }

            let request = EmbedRequest {
                model: &self.config.embedding_model,
                input: &uncached_texts,
            };

            let url = format!("{}/v1/embeddings", self.config.embeddings_url());
            let response = self.post_json(&url, &request, "Embedding service").await?;

            let embed_response: EmbedResponse =
                response.json().await.map_err(TutorLoopError::Http)?;

            if embed_response.data.len() != uncached_texts.len() {
                return Err(TutorLoopError::Llm(format!(
                    "Embedding service returned {} vectors for {} inputs",
                    embed_response.data.len(),
                    uncached_texts.len()
                )));
            }

            for (i, data) in embed_response.data.into_iter().enumerate() {
                let cache_key = super::cache::embedding_cache_key(
                    &self.config.embedding_model,
                    &uncached_texts[i],
                );
                if let Ok(json) = serde_json::to_string(&data.embedding) {
                    self.cache.set(cache_key, json);
                }
                results[uncached_indices[i]] = Some(data.embedding);
            }
        }

        tracing::debug!("Embedding batch of {} took {:?}", texts.len(), start.elapsed());

        results
            .into_iter()
            .map(|r| r.ok_or_else(|| TutorLoopError::Llm("Missing embedding".to_string())))
            .collect()
    }

    fn embedding_dimensions(&self) -> usize {
        self.embedding_dimensions
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_config() -> LLMServiceConfig {
        LLMServiceConfig {
            url: "http://127.0.0.1:1".to_string(),
            embedding_url: None,
            timeout_secs: 2,
            ..LLMServiceConfig::default()
        }
    }

    #[tokio::test]
    async fn test_unreachable_service_is_an_error() {
        let client = VLLMClient::new(unreachable_config()).unwrap();
        let result = client
            .chat_completion(vec![ChatMessage::user("solve x + 1 = 2")])
            .await;

        assert!(matches!(result, Err(TutorLoopError::Http(_))));

        // Failures are not cached
        let again = client
            .chat_completion(vec![ChatMessage::user("solve x + 1 = 2")])
            .await;
        assert!(again.is_err());
    }

    #[test]
    fn test_chat_message_roles() {
        assert_eq!(ChatMessage::system("s").role, "system");
        assert_eq!(ChatMessage::user("u").role, "user");
    }
}
