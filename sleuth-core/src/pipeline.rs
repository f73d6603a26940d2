//! The research pipeline: one topic in, one report out.
//!
//! Steps run in a fixed order (memory, web search, explanation, summary,
//! repositories). The first failing collaborator aborts the run; nothing is
//! retried and no partial report is produced.

use crate::brain::{LlmProvider, explanation_prompt};
use crate::collaborators::{MemoryStore, RepoSearch, Summarizer, WebSearch};
use crate::error::{Result, SleuthError};
use crate::report::Report;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{Instrument, info, info_span};

/// How independent collaborators are scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// One call after another, in step order.
    #[default]
    Sequential,
    /// Memory, search + summary, explanation, and repositories as joined
    /// futures. Output is identical to sequential mode.
    Concurrent,
}

impl ExecutionMode {
    pub fn from_flag(concurrent: bool) -> Self {
        if concurrent {
            ExecutionMode::Concurrent
        } else {
            ExecutionMode::Sequential
        }
    }
}

/// Result of one run: recalled memory (display only) and the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchRun {
    pub recalled_memory: Vec<String>,
    pub report: Report,
}

/// The set of collaborators a pipeline calls.
#[derive(Clone)]
pub struct Collaborators {
    pub memory: Arc<dyn MemoryStore>,
    pub search: Arc<dyn WebSearch>,
    pub llm: Arc<dyn LlmProvider>,
    pub summarizer: Arc<dyn Summarizer>,
    pub repos: Arc<dyn RepoSearch>,
}

/// Sequences the collaborators for a single research topic.
#[derive(Clone)]
pub struct ResearchPipeline {
    collaborators: Collaborators,
    memory_k: usize,
    mode: ExecutionMode,
}

impl std::fmt::Debug for ResearchPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResearchPipeline")
            .field("model", &self.collaborators.llm.model_name())
            .field("memory_k", &self.memory_k)
            .field("mode", &self.mode)
            .finish()
    }
}

impl ResearchPipeline {
    pub fn new(collaborators: Collaborators, memory_k: usize) -> Self {
        Self {
            collaborators,
            memory_k,
            mode: ExecutionMode::Sequential,
        }
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Run every step for `topic` and assemble the report.
    ///
    /// The topic is passed to collaborators exactly as given; it only has to
    /// contain something other than whitespace.
    pub async fn run(&self, topic: &str) -> Result<ResearchRun> {
        if topic.trim().is_empty() {
            return Err(SleuthError::EmptyTopic);
        }

        let span = info_span!("research", topic = %topic, mode = ?self.mode);
        async {
            let run = match self.mode {
                ExecutionMode::Sequential => self.run_sequential(topic).await?,
                ExecutionMode::Concurrent => self.run_concurrent(topic).await?,
            };
            info!(recalled = run.recalled_memory.len(), "Report assembled");
            Ok(run)
        }
        .instrument(span)
        .await
    }

    async fn run_sequential(&self, topic: &str) -> Result<ResearchRun> {
        let c = &self.collaborators;

        info!("Searching memory");
        let recalled_memory = c.memory.similarity_search(topic, self.memory_k).await?;

        info!("Searching the web");
        let web_raw = c.search.run(topic).await?;

        info!("Generating detailed explanation");
        let explanation = c.llm.complete(&explanation_prompt(topic)).await?;

        info!("Summarizing web content");
        let summary = c.summarizer.summarize(&web_raw).await?;

        info!("Fetching repositories");
        let repositories = c.repos.search(topic).await?;

        Ok(ResearchRun {
            recalled_memory,
            report: Report::new(topic, explanation, summary, repositories),
        })
    }

    async fn run_concurrent(&self, topic: &str) -> Result<ResearchRun> {
        let c = &self.collaborators;
        let prompt = explanation_prompt(topic);

        let memory = async {
            info!("Searching memory");
            c.memory.similarity_search(topic, self.memory_k).await
        };
        let summary = async {
            info!("Searching the web");
            let web_raw = c.search.run(topic).await?;
            info!("Summarizing web content");
            c.summarizer.summarize(&web_raw).await
        };
        let explanation = async {
            info!("Generating detailed explanation");
            c.llm.complete(&prompt).await
        };
        let repositories = async {
            info!("Fetching repositories");
            c.repos.search(topic).await
        };

        let (recalled_memory, summary, explanation, repositories) =
            futures::try_join!(memory, summary, explanation, repositories)?;

        Ok(ResearchRun {
            recalled_memory,
            report: Report::new(topic, explanation, summary, repositories),
        })
    }
}
