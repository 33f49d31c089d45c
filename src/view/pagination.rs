//! Page-window arithmetic for the table view.

use std::ops::Range;

/// Rows per page.
pub const PAGE_SIZE: u64 = 10;

/// Current page of a table plus the total the store last reported.
///
/// `page` is 1-based. While `total > 0` the window is expected to satisfy
/// `(page - 1) * page_size < total`, and an empty table sits on page 1; the
/// controller restores that after a fetch reveals the table shrank (see
/// [`PageWindow::is_past_end`]). Row arithmetic saturates, so any page
/// number is safe to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
}

impl Default for PageWindow {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: PAGE_SIZE,
            total: 0,
        }
    }
}

impl PageWindow {
    pub fn new(page: u64, total: u64) -> Self {
        Self {
            page: page.max(1),
            page_size: PAGE_SIZE,
            total,
        }
    }

    /// Index of the first row on the page.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// Row index range requested for the page: `[(p-1)*size, p*size)`.
    pub fn range(&self) -> Range<u64> {
        self.offset()..self.page.saturating_mul(self.page_size)
    }

    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.page_size)
    }

    /// Page count shown in the pager; an empty table still shows one page.
    pub fn display_total_pages(&self) -> u64 {
        self.total_pages().max(1)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page.saturating_mul(self.page_size) < self.total
    }

    /// True when the page starts beyond the last row, or is not page 1 of an
    /// empty table.
    pub fn is_past_end(&self) -> bool {
        self.page > 1 && self.offset() >= self.total
    }

    /// Moves forward one page if there is one.
    pub fn next(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.page += 1;
        true
    }

    /// Moves back one page if there is one.
    pub fn prev(&mut self) -> bool {
        if !self.has_prev() {
            return false;
        }
        self.page -= 1;
        true
    }

    pub fn label(&self) -> String {
        format!("Page {} of {}", self.page, self.display_total_pages())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_pages_for_23_rows() {
        let mut w = PageWindow::new(1, 23);
        assert_eq!(w.total_pages(), 3);
        assert_eq!(w.range(), 0..10);
        assert!(!w.has_prev());
        assert!(w.has_next());

        assert!(w.next());
        assert_eq!(w.range(), 10..20);
        assert!(w.next());
        assert_eq!(w.range(), 20..30);
        assert!(!w.has_next());
        assert!(!w.next());
        assert_eq!(w.page, 3);
        assert_eq!(w.label(), "Page 3 of 3");
    }

    #[test]
    fn empty_table_shows_one_page() {
        let mut w = PageWindow::default();
        assert_eq!(w.total_pages(), 0);
        assert_eq!(w.display_total_pages(), 1);
        assert_eq!(w.label(), "Page 1 of 1");
        assert!(!w.has_prev());
        assert!(!w.has_next());
        assert!(!w.prev());
        assert!(!w.next());
        assert!(!w.is_past_end());
    }

    #[test]
    fn exact_multiple_has_no_extra_page() {
        let w = PageWindow::new(2, 20);
        assert_eq!(w.total_pages(), 2);
        assert!(!w.has_next());
        assert!(w.has_prev());
    }

    #[test]
    fn past_end_detection() {
        assert!(PageWindow::new(4, 23).is_past_end());
        assert!(!PageWindow::new(3, 23).is_past_end());
        assert!(PageWindow::new(4, 0).is_past_end());
        assert!(!PageWindow::new(1, 0).is_past_end());
        assert_eq!(PageWindow::new(4, 0).display_total_pages(), 1);
        assert_eq!(PageWindow::new(4, 23).display_total_pages(), 3);
    }

    #[test]
    fn huge_page_saturates_instead_of_overflowing() {
        let w = PageWindow::new(u64::MAX, 23);
        assert_eq!(w.offset(), u64::MAX);
        assert_eq!(w.range(), u64::MAX..u64::MAX);
        assert!(!w.has_next());
        assert!(w.has_prev());
        assert!(w.is_past_end());
        assert_eq!(w.display_total_pages(), 3);
    }

    #[test]
    fn page_zero_is_clamped_to_one() {
        assert_eq!(PageWindow::new(0, 5).page, 1);
    }
}
