//! Snippet memory: a small persisted vector store consulted for context.
//!
//! Snippets are stored with their embeddings in a single JSON file. Recall is
//! a cosine-similarity ranking against the query embedding. Recalled snippets
//! are shown to the user but never written into the report.

use crate::collaborators::MemoryStore;
use crate::embeddings::{Embedder, LocalEmbedder, cosine_similarity};
use crate::error::CollaboratorError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Text shown when recall finds nothing.
pub const NO_MEMORY_MESSAGE: &str = "No relevant memory found.";

/// A stored snippet and its embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemorySnippet {
    pub text: String,
    pub embedding: Vec<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    dimensions: usize,
    snippets: Vec<MemorySnippet>,
}

/// JSON-file-backed snippet store.
pub struct SnippetStore {
    path: PathBuf,
    embedder: LocalEmbedder,
    snippets: Vec<MemorySnippet>,
}

impl std::fmt::Debug for SnippetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnippetStore")
            .field("path", &self.path)
            .field("dimensions", &self.embedder.dimensions())
            .field("snippets", &self.snippets.len())
            .finish()
    }
}

impl SnippetStore {
    /// Open the store at `path`. A missing file yields an empty store that
    /// uses `dimensions`; an existing file keeps its own dimensionality.
    pub fn open(path: impl Into<PathBuf>, dimensions: usize) -> Result<Self, CollaboratorError> {
        let path = path.into();
        if !path.exists() {
            debug!(path = %path.display(), "Memory store not found, starting empty");
            return Ok(Self {
                path,
                embedder: LocalEmbedder::new(dimensions),
                snippets: Vec::new(),
            });
        }

        let text = std::fs::read_to_string(&path).map_err(|e| CollaboratorError::Memory {
            message: format!("Failed to read {}: {}", path.display(), e),
        })?;
        let file: StoreFile = serde_json::from_str(&text).map_err(|e| CollaboratorError::Memory {
            message: format!("Corrupt memory store {}: {}", path.display(), e),
        })?;
        debug!(
            path = %path.display(),
            snippets = file.snippets.len(),
            "Opened memory store"
        );

        Ok(Self {
            path,
            embedder: LocalEmbedder::new(file.dimensions),
            snippets: file.snippets,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.snippets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }

    pub fn snippets(&self) -> impl Iterator<Item = &str> {
        self.snippets.iter().map(|s| s.text.as_str())
    }

    /// Embed and append a snippet. Call [`SnippetStore::save`] to persist.
    pub fn add(&mut self, text: &str) {
        let embedding = self.embedder.embed(text);
        self.snippets.push(MemorySnippet {
            text: text.to_string(),
            embedding,
        });
    }

    /// Write the store back to its file, creating parent directories.
    pub fn save(&self) -> Result<(), CollaboratorError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| CollaboratorError::Memory {
                message: format!("Failed to create {}: {}", parent.display(), e),
            })?;
        }
        let file = StoreFile {
            dimensions: self.embedder.dimensions(),
            snippets: self.snippets.clone(),
        };
        let json = serde_json::to_string_pretty(&file).map_err(|e| CollaboratorError::Memory {
            message: e.to_string(),
        })?;
        std::fs::write(&self.path, json).map_err(|e| CollaboratorError::Memory {
            message: format!("Failed to write {}: {}", self.path.display(), e),
        })
    }

    /// Rank snippets by similarity to `query`, dropping zero-similarity ones.
    pub fn search(&self, query: &str, k: usize) -> Vec<(String, f32)> {
        let query_vec = self.embedder.embed(query);
        let mut scored: Vec<(String, f32)> = self
            .snippets
            .iter()
            .map(|s| (s.text.clone(), cosine_similarity(&query_vec, &s.embedding)))
            .filter(|(_, score)| *score > 0.0)
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        scored
    }
}

#[async_trait]
impl MemoryStore for SnippetStore {
    async fn similarity_search(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<String>, CollaboratorError> {
        Ok(self.search(query, k).into_iter().map(|(text, _)| text).collect())
    }
}

/// Format recalled snippets for display: one `- ` bullet per snippet.
pub fn format_recalled(snippets: &[String]) -> String {
    if snippets.is_empty() {
        return NO_MEMORY_MESSAGE.to_string();
    }
    snippets
        .iter()
        .map(|s| format!("- {}", s))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn seeded_store(dir: &TempDir) -> SnippetStore {
        let mut store = SnippetStore::open(dir.path().join("memory.json"), 128).unwrap();
        store.add("Quantum computing uses qubits and superposition");
        store.add("Rust has ownership and borrowing");
        store.add("Qubits decohere quickly in quantum hardware");
        store
    }

    #[test]
    fn test_open_missing_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = SnippetStore::open(dir.path().join("absent.json"), 64).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_search_ranks_relevant_first() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir);
        let results = store.search("quantum qubits", 3);
        assert!(results.len() >= 2);
        assert!(results[..2].iter().all(|(text, _)| text.to_lowercase().contains("qubits")));
        assert!(results.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn test_search_respects_k() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir);
        assert_eq!(store.search("quantum qubits", 1).len(), 1);
        assert!(store.search("quantum qubits", 0).is_empty());
    }

    #[test]
    fn test_search_empty_query_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir);
        assert!(store.search("", 3).is_empty());
    }

    #[test]
    fn test_save_and_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("memory.json");
        let mut store = SnippetStore::open(&path, 32).unwrap();
        store.add("first snippet");
        store.save().unwrap();

        let reopened = SnippetStore::open(&path, 999).unwrap();
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.snippets().collect::<Vec<_>>(), vec!["first snippet"]);
        assert_eq!(reopened.embedder.dimensions(), 32);
    }

    #[test]
    fn test_open_corrupt_file_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("memory.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            SnippetStore::open(&path, 32),
            Err(CollaboratorError::Memory { .. })
        ));
    }

    #[tokio::test]
    async fn test_memory_store_trait() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir);
        let recalled = store.similarity_search("rust ownership", 3).await.unwrap();
        assert_eq!(recalled[0], "Rust has ownership and borrowing");
    }

    #[test]
    fn test_format_recalled() {
        assert_eq!(format_recalled(&[]), NO_MEMORY_MESSAGE);
        assert_eq!(
            format_recalled(&["a".to_string(), "b".to_string()]),
            "- a\n- b"
        );
    }
}
