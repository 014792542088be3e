//! Text generation backed by a chat-completion client

use super::{ChatMessage, LLMClient, TextGenerator};
use crate::config::LLMServiceConfig;
use crate::error::{Result, TutorLoopError};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Returned in place of an empty completion
pub const EMPTY_COMPLETION_FALLBACK: &str =
    "I don't have enough information to answer this question.";

/// Adapts an [`LLMClient`] to the single-prompt [`TextGenerator`] interface
pub struct LlmTextGenerator {
    client: Arc<dyn LLMClient>,
    timeout: Duration,
}

impl LlmTextGenerator {
    pub fn new(client: Arc<dyn LLMClient>, timeout: Duration) -> Self {
        Self {
            client,
            timeout,
        }
    }

    /// Create from configuration
    pub fn from_config(config: LLMServiceConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = super::VLLMClient::new(config)?;
        Ok(Self::new(Arc::new(client), timeout))
    }
}

#[async_trait]
impl TextGenerator for LlmTextGenerator {
    async fn try_generate(&self, prompt: &str) -> Result<String> {
        let messages = vec![ChatMessage::user(prompt)];

        let content = tokio::time::timeout(self.timeout, self.client.chat_completion(messages))
            .await
            .map_err(|_| {
                TutorLoopError::Timeout(format!(
                    "generation exceeded {}s",
                    self.timeout.as_secs_f32()
                ))
            })??;

        if content.trim().is_empty() {
            tracing::debug!("Empty completion, using fallback text");
            return Ok(EMPTY_COMPLETION_FALLBACK.to_string());
        }

        Ok(content)
    }

    fn model_name(&self) -> &str {
        self.client.model_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedClient {
        reply: Option<String>,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl ScriptedClient {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Some(reply.to_string()),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl LLMClient for ScriptedClient {
        async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(messages.last().map(|m| m.role.as_str()), Some("user"));
            tokio::time::sleep(self.delay).await;
            self.reply
                .clone()
                .ok_or_else(|| TutorLoopError::Llm("quota exceeded".to_string()))
        }

        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![])
        }

        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(vec![])
        }

        fn embedding_dimensions(&self) -> usize {
            0
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    #[tokio::test]
    async fn test_passes_completion_through() {
        let generator = LlmTextGenerator::new(
            Arc::new(ScriptedClient::replying("Step 1. x = 2")),
            Duration::from_secs(1),
        );
        assert_eq!(generator.generate("solve").await, "Step 1. x = 2");
    }

    #[tokio::test]
    async fn test_empty_completion_uses_fallback() {
        let generator = LlmTextGenerator::new(
            Arc::new(ScriptedClient::replying("  \n")),
            Duration::from_secs(1),
        );
        assert_eq!(generator.generate("solve").await, EMPTY_COMPLETION_FALLBACK);
    }

    #[tokio::test]
    async fn test_failure_becomes_error_string() {
        let client = ScriptedClient {
            reply: None,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        };
        let generator = LlmTextGenerator::new(Arc::new(client), Duration::from_secs(1));

        let out = generator.generate("solve").await;
        assert!(out.starts_with("Error: "));
        assert!(out.contains("quota exceeded"));
        assert!(generator.try_generate("solve").await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_becomes_error_string() {
        let client = ScriptedClient {
            reply: Some("late".to_string()),
            delay: Duration::from_secs(60),
            calls: AtomicUsize::new(0),
        };
        let generator = LlmTextGenerator::new(Arc::new(client), Duration::from_secs(5));

        let out = generator.generate("solve").await;
        assert!(out.starts_with("Error: Timed out"));
    }
}
