//! Language model provider implementations.

pub mod openai;

pub use openai::OpenAiProvider;

use crate::brain::LlmProvider;
use crate::config::LlmConfig;
use crate::config::Secrets;
use crate::error::SleuthError;
use std::sync::Arc;

/// Create the configured LLM provider, taking its API key from `secrets`.
pub fn create_provider(
    config: &LlmConfig,
    secrets: &Secrets,
) -> Result<Arc<dyn LlmProvider>, SleuthError> {
    let api_key = secrets.require(&config.api_key_name)?;
    let provider = OpenAiProvider::new(config, api_key.to_string())?;
    Ok(Arc::new(provider))
}
