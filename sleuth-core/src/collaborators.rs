//! Collaborator traits: the external services a research run calls into.
//!
//! Each collaborator exposes one operation taking a string and returning
//! text. The pipeline treats them as black boxes.

use crate::error::CollaboratorError;
use async_trait::async_trait;

/// Similarity search over previously stored text snippets.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Return up to `k` snippets, most similar first.
    async fn similarity_search(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<String>, CollaboratorError>;
}

/// A web search API returning raw result text.
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn run(&self, query: &str) -> Result<String, CollaboratorError>;
}

/// Condenses raw text into key points.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str) -> Result<String, CollaboratorError>;
}

/// Code-hosting repository search returning formatted text.
#[async_trait]
pub trait RepoSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<String, CollaboratorError>;
}

/// A collaborator that always answers with the same text.
///
/// Implements every text collaborator trait; used for tests and dry runs.
#[derive(Debug, Clone)]
pub struct CannedText(pub String);

impl CannedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }
}

#[async_trait]
impl WebSearch for CannedText {
    async fn run(&self, _query: &str) -> Result<String, CollaboratorError> {
        Ok(self.0.clone())
    }
}

#[async_trait]
impl Summarizer for CannedText {
    async fn summarize(&self, _text: &str) -> Result<String, CollaboratorError> {
        Ok(self.0.clone())
    }
}

#[async_trait]
impl RepoSearch for CannedText {
    async fn search(&self, _query: &str) -> Result<String, CollaboratorError> {
        Ok(self.0.clone())
    }
}

/// A memory store that always recalls the same snippets.
#[derive(Debug, Clone, Default)]
pub struct CannedMemory(pub Vec<String>);

#[async_trait]
impl MemoryStore for CannedMemory {
    async fn similarity_search(
        &self,
        _query: &str,
        k: usize,
    ) -> Result<Vec<String>, CollaboratorError> {
        Ok(self.0.iter().take(k).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canned_text_ignores_input() {
        let canned = CannedText::new("fixed");
        assert_eq!(tokio_test::block_on(canned.run("a")).unwrap(), "fixed");
        assert_eq!(tokio_test::block_on(canned.summarize("b")).unwrap(), "fixed");
        assert_eq!(tokio_test::block_on(canned.search("c")).unwrap(), "fixed");
    }

    #[test]
    fn test_canned_memory_takes_k() {
        let memory = CannedMemory(vec!["one".into(), "two".into(), "three".into()]);
        let recalled = tokio_test::block_on(memory.similarity_search("q", 2)).unwrap();
        assert_eq!(recalled, vec!["one", "two"]);
        assert!(
            tokio_test::block_on(memory.similarity_search("q", 0))
                .unwrap()
                .is_empty()
        );
    }
}
