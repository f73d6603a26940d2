//! OpenAI-compatible chat completions provider.
//!
//! Works with OpenAI and any endpoint that follows the chat completions API.

use crate::brain::LlmProvider;
use crate::config::LlmConfig;
use crate::error::CollaboratorError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

const SERVICE: &str = "OpenAI";

pub struct OpenAiProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl OpenAiProvider {
    /// Create a provider with an explicitly injected API key.
    pub fn new(config: &LlmConfig, api_key: String) -> Result<Self, CollaboratorError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CollaboratorError::transport(SERVICE, e))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    /// Build the request body for a single-turn completion.
    fn request_body(&self, prompt: &str) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": self.temperature,
            "stream": false,
        });
        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        body
    }

    /// Extract the assistant text from a chat completions response.
    fn parse_response(body: &Value) -> Result<String, CollaboratorError> {
        let choice = body
            .get("choices")
            .and_then(|c| c.get(0))
            .ok_or_else(|| CollaboratorError::ResponseParse {
                service: SERVICE.into(),
                message: "No choices in response".into(),
            })?;

        choice
            .get("message")
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| CollaboratorError::ResponseParse {
                service: SERVICE.into(),
                message: "No text content in first choice".into(),
            })
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(&self, prompt: &str) -> Result<String, CollaboratorError> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!(url = %url, model = %self.model, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| CollaboratorError::transport(SERVICE, e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| CollaboratorError::transport(SERVICE, e))?;

        if !status.is_success() {
            return Err(CollaboratorError::from_status(SERVICE, status, &text));
        }

        let json: Value = serde_json::from_str(&text).map_err(|e| CollaboratorError::ResponseParse {
            service: SERVICE.into(),
            message: format!("Invalid JSON: {}", e),
        })?;

        Self::parse_response(&json)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
