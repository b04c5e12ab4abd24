// Ingestion pipeline
// Discovers PDF files, extracts and chunks their text, embeds every chunk,
// and rebuilds the vector index as one delete-then-bulk-insert batch

#[cfg(test)]
mod tests;

pub mod extractor;

use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::database::lancedb::{ChunkMetadata, EmbeddingRecord, VectorStore};
use crate::embeddings::chunking::{PageChunk, chunk_pages};
use crate::embeddings::cohere::CohereClient;
use crate::ingest::extractor::extract_pages;
use crate::{DocChatError, Result};

const UPSERT_BATCH_SIZE: usize = 512;

/// Ingests a directory of PDFs into the vector index
pub struct Ingestor {
    config: Config,
    embedder: CohereClient,
    store: VectorStore,
}

/// Summary of one ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Documents successfully ingested
    pub documents: usize,
    /// Pages extracted across all ingested documents
    pub pages: usize,
    /// Chunks written to the index
    pub chunks: usize,
    /// Normalized names of the ingested documents, sorted
    pub doc_names: Vec<String>,
    /// Files that were skipped, with the reason
    pub skipped: Vec<SkippedFile>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// A chunk waiting for its embedding, carrying full provenance
struct PendingChunk {
    doc_name: String,
    source: String,
    chunk: PageChunk,
}

impl Ingestor {
    /// Build the ingestion resources once: embedding client and a
    /// writable vector store handle
    #[inline]
    pub async fn new(config: Config, api_key: impl Into<String>) -> Result<Self> {
        let embedder = CohereClient::new(&config.embedding, api_key)
            .map_err(|e| DocChatError::Config(e.to_string()))?;

        let store = VectorStore::create(
            &config.vector_database_path(),
            config.embedding.dimension as usize,
        )
        .await?;

        Ok(Self {
            config,
            embedder,
            store,
        })
    }

    /// Ingest every PDF in `dir` as a full index rebuild.
    ///
    /// Unreadable or text-free files are skipped and reported, not fatal.
    /// An embedding failure aborts the whole run before anything is
    /// written, so the prior index survives intact.
    #[inline]
    pub async fn ingest_directory(&mut self, dir: &Path) -> Result<IngestReport> {
        let files = discover_pdfs(dir)?;
        if files.is_empty() {
            return Err(DocChatError::Ingestion(format!(
                "No PDF files found in {}",
                dir.display()
            )));
        }

        info!("Ingesting {} PDF files from {}", files.len(), dir.display());

        let mut report = IngestReport::default();
        let mut pending = Vec::new();

        for path in &files {
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());

            let pages = match extract_pages(path) {
                Ok(pages) => pages,
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    report.skipped.push(SkippedFile {
                        path: path.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let chunks = chunk_pages(&pages, &self.config.chunking);
            if chunks.is_empty() {
                warn!("Skipping {}: no extractable text", path.display());
                report.skipped.push(SkippedFile {
                    path: path.clone(),
                    reason: "no extractable text".to_string(),
                });
                continue;
            }

            let doc_name = normalize_doc_name(&file_name);
            info!(
                "{}: {} pages, {} chunks (doc_name: {:?})",
                file_name,
                pages.len(),
                chunks.len(),
                doc_name
            );

            report.documents += 1;
            report.pages += pages.len();
            report.chunks += chunks.len();
            report.doc_names.push(doc_name.clone());

            let source = path.display().to_string();
            pending.extend(chunks.into_iter().map(|chunk| PendingChunk {
                doc_name: doc_name.clone(),
                source: source.clone(),
                chunk,
            }));
        }

        if pending.is_empty() {
            return Err(DocChatError::Ingestion(format!(
                "None of the {} PDF files in {} yielded extractable text",
                files.len(),
                dir.display()
            )));
        }

        // Embed everything before touching the store, so an embedding
        // failure leaves the prior index untouched
        let vectors = self.embed_pending(&pending)?;

        self.store.rebuild().await?;

        let created_at = chrono::Utc::now().to_rfc3339();
        let records: Vec<EmbeddingRecord> = pending
            .into_iter()
            .zip(vectors)
            .map(|(pending, vector)| EmbeddingRecord {
                id: Uuid::new_v4().to_string(),
                vector,
                metadata: ChunkMetadata {
                    doc_name: pending.doc_name,
                    source: pending.source,
                    page: pending.chunk.page,
                    chunk_index: pending.chunk.chunk_index,
                    content: pending.chunk.content,
                    created_at: created_at.clone(),
                },
            })
            .collect();

        for batch in records.chunks(UPSERT_BATCH_SIZE) {
            self.store.upsert_batch(batch.to_vec()).await?;
        }

        report.doc_names.sort();
        report.doc_names.dedup();

        info!(
            "Ingestion complete: {} documents, {} chunks, {} skipped",
            report.documents,
            report.chunks,
            report.skipped.len()
        );

        Ok(report)
    }

    fn embed_pending(&self, pending: &[PendingChunk]) -> Result<Vec<Vec<f32>>> {
        let bar = if console::user_attended_stderr() {
            ProgressBar::new(pending.len() as u64).with_style(
                ProgressStyle::with_template("{bar:30} [{pos}/{len}] Embedding chunks")
                    .expect("style template is valid"),
            )
        } else {
            ProgressBar::hidden()
        };

        let mut vectors = Vec::with_capacity(pending.len());
        for batch in pending.chunks(self.config.embedding.batch_size as usize) {
            let texts: Vec<String> = batch.iter().map(|p| p.chunk.content.clone()).collect();
            let embedded = self
                .embedder
                .embed_documents(&texts)
                .map_err(|e| DocChatError::Embedding(e.to_string()))?;
            vectors.extend(embedded);
            bar.inc(batch.len() as u64);
        }
        bar.finish_and_clear();

        Ok(vectors)
    }
}

/// Find every PDF file directly inside `dir`, sorted by file name
#[inline]
pub fn discover_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        DocChatError::Ingestion(format!("Failed to read directory {}: {}", dir.display(), e))
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| DocChatError::Ingestion(format!("Failed to read entry: {}", e)))?;
        let path = entry.path();
        if path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Derive the filterable document name from a file name: drop the
/// extension and replace `-`/`_` with spaces, so `Travel_Policy.pdf`
/// becomes `Travel Policy`
#[inline]
pub fn normalize_doc_name(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .map_or_else(|| file_name.to_string(), |s| s.to_string_lossy().into_owned());
    stem.replace(['-', '_'], " ")
}
