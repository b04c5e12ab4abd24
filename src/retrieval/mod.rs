
use std::sync::Arc;

use tracing::debug;

use crate::database::lancedb::{DocumentFilter, SearchResult, VectorStore};
use crate::embeddings::cohere::CohereClient;
use crate::{DocChatError, Result};

/// Policy wrapper over the vector index: cosine similarity, a fixed
/// result count, and an optional document allow-list
pub struct Retriever {
    embedder: CohereClient,
    store: Arc<VectorStore>,
    k: usize,
    filter: Option<DocumentFilter>,
}

/// A chunk returned from retrieval, ready for prompt assembly and
/// citation display
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedChunk {
    pub content: String,
    pub doc_name: String,
    pub source: String,
    pub page: u32,
    /// Cosine similarity to the query, higher is better
    pub score: f32,
}

impl From<SearchResult> for RetrievedChunk {
    #[inline]
    fn from(result: SearchResult) -> Self {
        Self {
            content: result.chunk_metadata.content,
            doc_name: result.chunk_metadata.doc_name,
            source: result.chunk_metadata.source,
            page: result.chunk_metadata.page,
            score: result.similarity_score,
        }
    }
}

impl Retriever {
    #[inline]
    pub fn new(embedder: CohereClient, store: Arc<VectorStore>, k: usize) -> Self {
        Self {
            embedder,
            store,
            k,
            filter: None,
        }
    }

    #[inline]
    pub fn with_filter(mut self, filter: Option<DocumentFilter>) -> Self {
        self.filter = filter;
        self
    }

    #[inline]
    pub fn filter(&self) -> Option<&DocumentFilter> {
        self.filter.as_ref()
    }

    /// Embed the question and return the top-k most similar chunks.
    /// Zero results is a valid outcome, not an error.
    #[inline]
    pub async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedChunk>> {
        debug!("Retrieving top {} chunks for query", self.k);

        let query_vector = self
            .embedder
            .embed_query(query)
            .map_err(|e| DocChatError::Embedding(e.to_string()))?;

        let results = self
            .store
            .search(&query_vector, self.k, self.filter.as_ref())
            .await?;

        debug!("Retrieved {} chunks", results.len());
        Ok(results.into_iter().map(RetrievedChunk::from).collect())
    }
}

/// Resolve a requested document allow-list against the names known to the
/// index. An empty request or one covering every known document means
/// "search all" (no filter); a request naming an unknown document is
/// rejected so typos do not silently search nothing.
#[inline]
pub fn resolve_filter(requested: &[String], known: &[String]) -> Result<Option<DocumentFilter>> {
    if requested.is_empty() {
        return Ok(None);
    }

    for name in requested {
        if !known.contains(name) {
            return Err(DocChatError::Config(format!(
                "Unknown document {:?}; available documents: {}",
                name,
                known.join(", ")
            )));
        }
    }

    let filter = DocumentFilter::new(requested.iter().cloned());
    if known.iter().all(|name| filter.matches(name)) {
        // The allow-list covers everything, same as searching all
        return Ok(None);
    }

    Ok(Some(filter))
}
