use lopdf::Document;
use tracing::debug;

use crate::{errors::PdfError, window::PageWindow};

/// Re-slices `bytes` into a standalone PDF holding only the pages of `window`.
///
/// Page order is preserved. Objects no longer reachable from the kept pages are
/// pruned before saving.
pub fn slice_pages(bytes: &[u8], window: &PageWindow) -> Result<Vec<u8>, PdfError> {
    let mut doc = Document::load_mem(bytes).map_err(PdfError::Load)?;

    // lopdf numbers pages from 1.
    let drop: Vec<u32> = doc
        .get_pages()
        .keys()
        .copied()
        .filter(|n| !window.contains(*n as usize - 1))
        .collect();
    if drop.len() == doc.get_pages().len() {
        return Err(PdfError::EmptyDocument("page window is outside the document"));
    }

    debug!(
        start = window.start,
        end = window.end,
        kept = window.page_count(),
        dropped = drop.len(),
        "slicing pdf"
    );
    doc.delete_pages(&drop);
    doc.prune_objects();
    doc.renumber_objects();
    doc.compress();

    let mut out = Vec::with_capacity(bytes.len() / 2);
    doc.save_to(&mut out).map_err(|e| PdfError::Save(e.into()))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_pdf;

    fn page_count(bytes: &[u8]) -> usize {
        Document::load_mem(bytes).unwrap().get_pages().len()
    }

    #[test]
    fn slice_keeps_exactly_the_window() {
        let pdf = sample_pdf(10);
        let window = PageWindow::around(9, 10, 2).unwrap();
        let sliced = slice_pages(&pdf, &window).unwrap();
        assert_eq!(page_count(&sliced), 3);
    }

    #[test]
    fn slice_near_start() {
        let pdf = sample_pdf(10);
        let window = PageWindow::around(0, 10, 2).unwrap();
        assert_eq!(page_count(&slice_pages(&pdf, &window).unwrap()), 3);

        let window = PageWindow::around(4, 10, 2).unwrap();
        assert_eq!(page_count(&slice_pages(&pdf, &window).unwrap()), 5);
    }

    #[test]
    fn slice_of_short_document_keeps_all_pages() {
        let pdf = sample_pdf(2);
        let window = PageWindow::around(1, 2, 2).unwrap();
        assert_eq!(page_count(&slice_pages(&pdf, &window).unwrap()), 2);
    }

    #[test]
    fn garbage_bytes_fail_to_load() {
        let window = PageWindow::around(0, 1, 2).unwrap();
        assert!(matches!(
            slice_pages(b"not a pdf", &window),
            Err(PdfError::Load(_))
        ));
    }
}
