//! # Sleuth Core
//!
//! Core library for the Sleuth research assistant.
//! Provides the research pipeline, collaborator traits, the LLM interface
//! (brain), snippet memory, the report model, configuration, and errors.

pub mod brain;
pub mod collaborators;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod memory;
pub mod pipeline;
pub mod providers;
pub mod report;

// Re-export commonly used types at the crate root.
pub use brain::{LlmProvider, MockLlmProvider, explanation_prompt};
pub use collaborators::{CannedMemory, CannedText, MemoryStore, RepoSearch, Summarizer, WebSearch};
pub use config::{
    GithubConfig, LlmConfig, MemoryConfig, PageLayout, PipelineConfig, SearchConfig, Secrets,
    ServerConfig, SleuthConfig, load_config, load_secrets,
};
pub use error::{CollaboratorError, ConfigError, ExportError, Result, SleuthError};
pub use memory::{NO_MEMORY_MESSAGE, SnippetStore, format_recalled};
pub use pipeline::{Collaborators, ExecutionMode, ResearchPipeline, ResearchRun};
pub use report::Report;
