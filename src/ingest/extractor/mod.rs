#[cfg(test)]
mod tests;

use std::path::Path;

use lopdf::Document;
use tracing::{debug, warn};

use crate::{DocChatError, Result};

/// A single page of text extracted from a PDF document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfPage {
    /// 1-based page number
    pub number: u32,
    /// Raw text content of the page; may be empty when the page has no
    /// extractable text (scanned images, vector drawings)
    pub text: String,
}

/// Extract per-page text from a PDF file.
///
/// A page that yields no text is kept with an empty `text` so page
/// numbering stays faithful to the document; it contributes zero chunks
/// downstream. An unreadable or encrypted file is an ingestion error.
#[inline]
pub fn extract_pages(path: &Path) -> Result<Vec<PdfPage>> {
    debug!("Extracting text from {}", path.display());

    let document = Document::load(path)
        .map_err(|e| DocChatError::Ingestion(format!("Failed to read {}: {}", path.display(), e)))?;

    if document.is_encrypted() {
        return Err(DocChatError::Ingestion(format!(
            "{} is encrypted and cannot be ingested",
            path.display()
        )));
    }

    let mut pages = Vec::new();
    for (number, _object_id) in document.get_pages() {
        let text = match document.extract_text(&[number]) {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    "No extractable text on page {} of {}: {}",
                    number,
                    path.display(),
                    e
                );
                String::new()
            }
        };

        pages.push(PdfPage { number, text });
    }

    debug!("Extracted {} pages from {}", pages.len(), path.display());
    Ok(pages)
}
