//! Brain module — language model abstraction.
//!
//! Defines the `LlmProvider` trait used for the explanation step and by the
//! summarizer, plus a queue-backed mock for tests.

use crate::error::CollaboratorError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Trait for language model providers: one prompt in, generated text out.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Complete a single prompt and return the generated text.
    async fn complete(&self, prompt: &str) -> Result<String, CollaboratorError>;

    /// Return the model name.
    fn model_name(&self) -> &str;
}

/// Build the prompt for the detailed explanation step.
pub fn explanation_prompt(topic: &str) -> String {
    format!(
        "Explain this research topic in simple terms like you're teaching a beginner:\n\n{}",
        topic
    )
}

/// A mock LLM provider for tests.
///
/// Returns queued responses in order and records every prompt it receives.
/// Once the queue is empty it answers with a fixed placeholder.
pub struct MockLlmProvider {
    model: String,
    responses: Mutex<VecDeque<Result<String, CollaboratorError>>>,
    prompts: Mutex<Vec<String>>,
}

impl MockLlmProvider {
    pub fn new() -> Self {
        Self {
            model: "mock-model".to_string(),
            responses: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Create a MockLlmProvider whose first response is `text`.
    pub fn with_response(text: &str) -> Self {
        let provider = Self::new();
        provider.queue_response(text);
        provider
    }

    /// Queue a response to be returned by the next `complete` call.
    pub fn queue_response(&self, text: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(text.to_string()));
    }

    /// Queue an error to be returned by the next `complete` call.
    pub fn queue_error(&self, error: CollaboratorError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Default for MockLlmProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    async fn complete(&self, prompt: &str) -> Result<String, CollaboratorError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("I'm a mock LLM. No queued responses available.".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explanation_prompt() {
        assert_eq!(
            explanation_prompt("quantum computing"),
            "Explain this research topic in simple terms like you're teaching a beginner:\n\nquantum computing"
        );
    }

    #[tokio::test]
    async fn test_mock_returns_queued_in_order() {
        let mock = MockLlmProvider::new();
        mock.queue_response("first");
        mock.queue_response("second");
        assert_eq!(mock.complete("a").await.unwrap(), "first");
        assert_eq!(mock.complete("b").await.unwrap(), "second");
        assert!(mock.complete("c").await.unwrap().contains("mock LLM"));
        assert_eq!(mock.prompts(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_mock_returns_queued_error() {
        let mock = MockLlmProvider::new();
        mock.queue_error(CollaboratorError::RateLimited {
            service: "OpenAI".into(),
        });
        assert!(matches!(
            mock.complete("x").await,
            Err(CollaboratorError::RateLimited { .. })
        ));
    }
}
