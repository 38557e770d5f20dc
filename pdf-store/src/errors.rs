//! Error type for PDF loading, slicing and chunking.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdfError {
    /// The bytes are not a readable PDF.
    #[error("failed to load PDF: {0}")]
    Load(#[source] lopdf::Error),

    /// The upload is empty, has no pages, or yields no text.
    #[error("document is empty: {0}")]
    EmptyDocument(&'static str),

    /// Writing the re-sliced document failed.
    #[error("failed to save sliced PDF: {0}")]
    Save(#[source] lopdf::Error),

    /// Chunker settings are inconsistent.
    #[error("invalid chunking settings: {0}")]
    InvalidChunking(String),
}
