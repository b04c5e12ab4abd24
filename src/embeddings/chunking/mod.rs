
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ingest::extractor::PdfPage;

/// Configuration for text chunking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Overlap in characters between adjacent chunks from the same page
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 75,
        }
    }
}

/// A chunk of page text ready for embedding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageChunk {
    /// The chunk text, an exact substring of the page
    pub content: String,
    /// 1-based page number the chunk was cut from
    pub page: u32,
    /// Index of this chunk within the document
    pub chunk_index: u32,
}

/// Split text into overlapping chunks of at most `chunk_size` characters.
///
/// Each adjacent pair of chunks overlaps by exactly `chunk_overlap`
/// characters. Break points prefer the highest-priority separator that
/// fits the size budget: paragraph break, then line break, then word
/// boundary, then a raw character cut. Chunks are exact substrings of the
/// input, so concatenating them with the overlap of each successor removed
/// reconstructs the input.
#[inline]
pub fn split_text(text: &str, config: &ChunkingConfig) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.iter().all(|c| c.is_whitespace()) {
        return Vec::new();
    }

    let size = config.chunk_size.max(1);
    // Overlap must leave room for the chunk to advance
    let overlap = config.chunk_overlap.min(size - 1);

    let mut chunks = Vec::new();
    let mut start = 0;
    loop {
        let budget_end = (start + size).min(chars.len());
        let end = if budget_end == chars.len() {
            budget_end
        } else {
            find_break(&chars, start + overlap + 1, budget_end)
        };

        chunks.push(chars[start..end].iter().collect());

        if end == chars.len() {
            break;
        }
        start = end - overlap;
    }

    chunks
}

/// Pick a break position in `[min_end, budget_end]`, scanning backward.
///
/// A position is one past the last character of the candidate chunk. The
/// paragraph separator wins outright; otherwise the latest line break,
/// then the latest word boundary, then the full budget.
fn find_break(chars: &[char], min_end: usize, budget_end: usize) -> usize {
    let mut line_break = None;
    let mut word_break = None;

    for end in (min_end..=budget_end).rev() {
        if end >= 2 && chars[end - 1] == '\n' && chars[end - 2] == '\n' {
            return end;
        }
        if line_break.is_none() && chars[end - 1] == '\n' {
            line_break = Some(end);
        }
        if word_break.is_none() && chars[end - 1].is_whitespace() {
            word_break = Some(end);
        }
    }

    line_break.or(word_break).unwrap_or(budget_end)
}

/// Chunk a sequence of pages, numbering chunks consecutively across the
/// document. Pages without extractable text contribute zero chunks; the
/// overlap never crosses a page boundary.
#[inline]
pub fn chunk_pages(pages: &[PdfPage], config: &ChunkingConfig) -> Vec<PageChunk> {
    let mut chunks = Vec::new();
    let mut chunk_index = 0;

    for page in pages {
        for content in split_text(&page.text, config) {
            chunks.push(PageChunk {
                content,
                page: page.number,
                chunk_index,
            });
            chunk_index += 1;
        }
    }

    debug!(
        "Chunked {} pages into {} chunks (max {} chars, {} overlap)",
        pages.len(),
        chunks.len(),
        config.chunk_size,
        config.chunk_overlap
    );

    chunks
}
