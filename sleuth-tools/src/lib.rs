//! # Sleuth Tools
//!
//! Concrete collaborators for the research pipeline: SerpAPI web search,
//! GitHub repository search, an LLM-backed summarizer, and PDF export.

pub mod export;
pub mod github;
pub mod serpapi;
pub mod summarize;

pub use github::GitHubRepoSearch;
pub use serpapi::SerpApiSearch;
pub use summarize::LlmSummarizer;

use sleuth_core::config::{Secrets, SleuthConfig};
use sleuth_core::error::SleuthError;
use sleuth_core::memory::SnippetStore;
use sleuth_core::pipeline::{Collaborators, ExecutionMode, ResearchPipeline};
use sleuth_core::providers::create_provider;
use std::sync::Arc;
use tracing::info;

/// Build the live collaborator set from settings and injected secrets.
///
/// Fails when a required key is missing or the memory store is unreadable.
pub fn build_collaborators(
    config: &SleuthConfig,
    secrets: &Secrets,
) -> Result<Collaborators, SleuthError> {
    let llm = create_provider(&config.llm, secrets)?;
    let serp_key = secrets.require(&config.search.api_key_name)?.to_string();
    let github_token = secrets.get(&config.github.token_name).map(str::to_string);
    let memory = SnippetStore::open(&config.memory.path, config.memory.dimensions)?;

    info!(
        model = %llm.model_name(),
        memory = memory.len(),
        github_token = github_token.is_some(),
        "Collaborators ready"
    );

    Ok(Collaborators {
        memory: Arc::new(memory),
        search: Arc::new(SerpApiSearch::new(&config.search, serp_key)?),
        summarizer: Arc::new(LlmSummarizer::new(llm.clone())),
        repos: Arc::new(GitHubRepoSearch::new(&config.github, github_token)?),
        llm,
    })
}

/// Build a pipeline with live collaborators and the configured execution mode.
pub fn build_pipeline(
    config: &SleuthConfig,
    secrets: &Secrets,
) -> Result<ResearchPipeline, SleuthError> {
    let collaborators = build_collaborators(config, secrets)?;
    Ok(ResearchPipeline::new(collaborators, config.memory.k)
        .with_mode(ExecutionMode::from_flag(config.pipeline.concurrent)))
}
