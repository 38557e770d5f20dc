//! Page window around the page an answer was sourced from.

use serde::Serialize;

use crate::errors::PdfError;

/// Inclusive, 0-based page range centred (where possible) on `focus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub start: usize,
    pub end: usize,
    pub focus: usize,
}

impl PageWindow {
    /// Pages shown on each side of the focus page.
    pub const DEFAULT_RADIUS: usize = 2;

    /// Computes `[max(N - r, 0), min(N + r, P - 1)]`.
    ///
    /// Near the document edges the window shrinks instead of shifting.
    /// A focus past the last page is clamped to the last page.
    ///
    /// # Errors
    /// [`PdfError::EmptyDocument`] when `total` is zero.
    pub fn around(focus: usize, total: usize, radius: usize) -> Result<Self, PdfError> {
        if total == 0 {
            return Err(PdfError::EmptyDocument("no pages to display"));
        }
        let focus = focus.min(total - 1);
        Ok(Self {
            start: focus.saturating_sub(radius),
            end: focus.saturating_add(radius).min(total - 1),
            focus,
        })
    }

    /// Number of pages in the window; at least one since `start <= end`.
    pub fn page_count(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn contains(&self, page: usize) -> bool {
        (self.start..=self.end).contains(&page)
    }

    /// 1-based position of the focus page inside the sliced document,
    /// used as the `#page=` fragment of the inline viewer.
    pub fn anchor(&self) -> usize {
        self.focus - self.start + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_at_document_start_shrinks() {
        let w = PageWindow::around(0, 10, 2).unwrap();
        assert_eq!((w.start, w.end), (0, 2));
        assert_eq!(w.anchor(), 1);
    }

    #[test]
    fn window_at_document_end_shrinks() {
        let w = PageWindow::around(9, 10, 2).unwrap();
        assert_eq!((w.start, w.end), (7, 9));
        assert_eq!(w.anchor(), 3);
    }

    #[test]
    fn window_formula_holds_for_every_focus() {
        for total in 5..=12usize {
            for n in 0..total {
                let w = PageWindow::around(n, total, PageWindow::DEFAULT_RADIUS).unwrap();
                assert_eq!(w.start, n.saturating_sub(2));
                assert_eq!(w.end, (n + 2).min(total - 1));
                assert!(w.start <= w.end);
                assert!(w.end - w.start <= 4);
                assert!(w.contains(n));
            }
        }
    }

    #[test]
    fn single_page_document() {
        let w = PageWindow::around(0, 1, 2).unwrap();
        assert_eq!((w.start, w.end, w.page_count()), (0, 0, 1));
    }

    #[test]
    fn focus_past_end_is_clamped() {
        let w = PageWindow::around(42, 10, 2).unwrap();
        assert_eq!((w.start, w.end, w.focus), (7, 9, 9));
        assert_eq!(w.page_count(), 3);
    }

    #[test]
    fn empty_document_is_an_error() {
        assert!(matches!(
            PageWindow::around(0, 0, 2),
            Err(PdfError::EmptyDocument(_))
        ));
    }
}
