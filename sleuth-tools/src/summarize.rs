//! Summarizer backed by the language model.

use async_trait::async_trait;
use sleuth_core::brain::LlmProvider;
use sleuth_core::collaborators::Summarizer;
use sleuth_core::error::CollaboratorError;
use std::sync::Arc;
use tracing::debug;

/// Returned for blank input; the model is not called.
pub const EMPTY_INPUT_MESSAGE: &str = "No web content to summarize.";

/// Build the summarization prompt for `text`.
pub fn summary_prompt(text: &str) -> String {
    format!(
        "Summarize the following web content into concise key points. \
         Use a markdown bullet list with one point per line.\n\n{}",
        text.trim()
    )
}

pub struct LlmSummarizer {
    llm: Arc<dyn LlmProvider>,
}

impl LlmSummarizer {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize(&self, text: &str) -> Result<String, CollaboratorError> {
        if text.trim().is_empty() {
            return Ok(EMPTY_INPUT_MESSAGE.to_string());
        }
        debug!(chars = text.len(), model = %self.llm.model_name(), "Summarizing");
        self.llm.complete(&summary_prompt(text)).await
    }
}
