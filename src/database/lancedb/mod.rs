// LanceDB vector database module
// Handles vector storage and filtered similarity search for chunk embeddings

pub mod vector_store;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub use vector_store::{SearchResult, VectorStore};

/// Embedding record stored in LanceDB
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    /// Stable identifier for this record
    pub id: String,
    /// The vector embedding for the chunk text
    pub vector: Vec<f32>,
    /// Metadata about the chunk this embedding represents
    pub metadata: ChunkMetadata,
}

/// Metadata for a chunk stored alongside its embedding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Normalized document name (file name without extension, `-`/`_`
    /// replaced by spaces); the filterable identity of a document
    pub doc_name: String,
    /// Original file path the chunk was extracted from
    pub source: String,
    /// 1-based page number within the source document
    pub page: u32,
    /// Index of this chunk within the document (for ordering)
    pub chunk_index: u32,
    /// The actual text content of the chunk
    pub content: String,
    /// Timestamp when this record was created
    pub created_at: String,
}

/// Set-membership predicate over document names, applied before top-k
/// selection so ranking only ever sees eligible records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFilter {
    allowed: BTreeSet<String>,
}

impl DocumentFilter {
    #[inline]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: names.into_iter().map(Into::into).collect(),
        }
    }

    #[inline]
    pub fn matches(&self, doc_name: &str) -> bool {
        self.allowed.contains(doc_name)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.allowed.len()
    }

    #[inline]
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.allowed.iter().map(String::as_str)
    }

    /// SQL predicate for LanceDB prefiltering. Callers must short-circuit
    /// an empty filter; `IN ()` is not valid SQL.
    pub(crate) fn to_predicate(&self) -> String {
        let quoted: Vec<String> = self
            .allowed
            .iter()
            .map(|name| format!("'{}'", name.replace('\'', "''")))
            .collect();
        format!("doc_name IN ({})", quoted.join(", "))
    }
}
