use std::sync::Arc;

use lopdf::Document;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{errors::PdfError, frame, slicer, window::PageWindow};

/// Extracted text of one page, numbered from 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageText {
    pub number: usize,
    pub text: String,
}

/// A sliced page window ready to be served or embedded.
#[derive(Debug, Clone)]
pub struct RenderedWindow {
    pub window: PageWindow,
    pub pdf: Vec<u8>,
    pub iframe: String,
}

/// An uploaded PDF: original bytes plus per-page text.
#[derive(Debug, Clone)]
pub struct PdfDocument {
    name: String,
    bytes: Arc<[u8]>,
    pages: Vec<PageText>,
}

impl PdfDocument {
    /// Parses `bytes` and extracts the text of every page.
    ///
    /// Pages whose text cannot be decoded are kept with empty text so page
    /// numbering stays aligned with the document.
    ///
    /// # Errors
    /// - [`PdfError::EmptyDocument`] for an empty upload or a PDF without pages
    /// - [`PdfError::Load`] when the bytes are not a readable PDF
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, PdfError> {
        let name = name.into();
        if bytes.is_empty() {
            return Err(PdfError::EmptyDocument("upload contains no bytes"));
        }

        let doc = Document::load_mem(&bytes).map_err(PdfError::Load)?;
        let numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
        if numbers.is_empty() {
            return Err(PdfError::EmptyDocument("PDF has no pages"));
        }

        let pages = numbers
            .iter()
            .enumerate()
            .map(|(idx, &n)| {
                let text = doc.extract_text(&[n]).unwrap_or_else(|e| {
                    warn!(%name, page = idx, error = %e, "text extraction failed; using empty page");
                    String::new()
                });
                PageText { number: idx, text }
            })
            .collect::<Vec<_>>();

        info!(%name, pages = pages.len(), bytes = bytes.len(), "pdf loaded");
        Ok(Self {
            name,
            bytes: bytes.into(),
            pages,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> &[PageText] {
        &self.pages
    }

    /// `true` when no page produced any non-whitespace text.
    pub fn is_blank(&self) -> bool {
        self.pages.iter().all(|p| p.text.trim().is_empty())
    }

    /// Window of `radius` pages on each side of `focus`.
    pub fn window(&self, focus: usize, radius: usize) -> Result<PageWindow, PdfError> {
        PageWindow::around(focus, self.page_count(), radius)
    }

    /// Slices the window around `focus` and renders it as an inline viewer
    /// opened at the focus page.
    pub fn render_window(&self, focus: usize, radius: usize) -> Result<RenderedWindow, PdfError> {
        let window = self.window(focus, radius)?;
        let pdf = slicer::slice_pages(&self.bytes, &window)?;
        let iframe = frame::iframe(&pdf, window.anchor());
        debug!(name = %self.name, ?window, sliced_bytes = pdf.len(), "window rendered");
        Ok(RenderedWindow {
            window,
            pdf,
            iframe,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_pdf;

    #[test]
    fn loads_every_page_in_order() {
        let doc = PdfDocument::from_bytes("contract.pdf", sample_pdf(4)).unwrap();
        assert_eq!(doc.name(), "contract.pdf");
        assert_eq!(doc.page_count(), 4);
        let numbers: Vec<usize> = doc.pages().iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![0, 1, 2, 3]);
    }

    #[test]
    fn empty_upload_is_rejected() {
        assert!(matches!(
            PdfDocument::from_bytes("x.pdf", Vec::new()),
            Err(PdfError::EmptyDocument(_))
        ));
    }

    #[test]
    fn non_pdf_is_rejected() {
        assert!(matches!(
            PdfDocument::from_bytes("x.pdf", b"hello".to_vec()),
            Err(PdfError::Load(_))
        ));
    }

    #[test]
    fn render_window_anchors_on_focus() {
        let doc = PdfDocument::from_bytes("x.pdf", sample_pdf(10)).unwrap();
        let rendered = doc.render_window(9, PageWindow::DEFAULT_RADIUS).unwrap();
        assert_eq!((rendered.window.start, rendered.window.end), (7, 9));
        assert!(rendered.iframe.contains("#page=3\""));
        assert_eq!(
            Document::load_mem(&rendered.pdf).unwrap().get_pages().len(),
            3
        );
    }
}
