//! In-memory PDF page store.
//!
//! A [`PdfDocument`] is parsed once from the uploaded bytes and then serves
//! three purposes:
//! - page texts for chunking ([`chunker::RecursiveSplitter`])
//! - page windows around a focus page ([`PageWindow`])
//! - re-sliced, base64-embedded PDF fragments for inline display ([`frame`])

pub mod chunker;
mod document;
mod errors;
pub mod frame;
mod slicer;
mod window;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;

pub use chunker::{Chunk, RecursiveSplitter};
pub use document::{PageText, PdfDocument, RenderedWindow};
pub use errors::PdfError;
pub use slicer::slice_pages;
pub use window::PageWindow;
