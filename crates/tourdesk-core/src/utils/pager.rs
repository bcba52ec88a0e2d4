//! Client-side pagination over an already-fetched list.

/// Rows per page on the users, cities and destinations screens.
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Rows per page on the appointments screen.
pub const APPOINTMENT_PAGE_SIZE: usize = 10;

/// One-based page cursor. The page is clamped whenever the list length
/// changes, so a delete on the last page never leaves an empty view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page: usize,
    page_size: usize,
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Total pages for `total` rows; zero rows still show one (empty) page.
    pub fn total_pages(&self, total: usize) -> usize {
        total.div_ceil(self.page_size).max(1)
    }

    /// Index range of the current page within a list of `total` rows.
    pub fn range(&self, total: usize) -> std::ops::Range<usize> {
        let start = ((self.page - 1) * self.page_size).min(total);
        let end = (start + self.page_size).min(total);
        start..end
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.range(items.len())]
    }

    pub fn next(&mut self, total: usize) {
        if self.page < self.total_pages(total) {
            self.page += 1;
        }
    }

    pub fn prev(&mut self) {
        if self.page > 1 {
            self.page -= 1;
        }
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }

    pub fn clamp(&mut self, total: usize) {
        self.page = self.page.min(self.total_pages(total));
    }

    /// "Showing 6-10 of 12" style summary.
    pub fn summary(&self, total: usize) -> String {
        let range = self.range(total);
        if range.is_empty() {
            format!("Showing 0 of {}", total)
        } else {
            format!("Showing {}-{} of {}", range.start + 1, range.end, total)
        }
    }
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        let pager = Pager::new(5);
        assert_eq!(pager.total_pages(0), 1);
        assert_eq!(pager.total_pages(5), 1);
        assert_eq!(pager.total_pages(6), 2);
        assert_eq!(pager.total_pages(12), 3);
    }

    #[test]
    fn test_next_stops_at_last_page() {
        let mut pager = Pager::new(5);
        pager.next(12);
        pager.next(12);
        pager.next(12);
        assert_eq!(pager.page(), 3);
        assert_eq!(pager.range(12), 10..12);
        assert_eq!(pager.summary(12), "Showing 11-12 of 12");
    }

    #[test]
    fn test_prev_stops_at_first_page() {
        let mut pager = Pager::new(10);
        pager.prev();
        assert_eq!(pager.page(), 1);
        assert_eq!(pager.summary(0), "Showing 0 of 0");
    }

    #[test]
    fn test_clamp_after_shrink() {
        let mut pager = Pager::new(5);
        pager.next(11);
        pager.next(11);
        assert_eq!(pager.page(), 3);
        pager.clamp(10);
        assert_eq!(pager.page(), 2);
        let items: Vec<usize> = (0..10).collect();
        assert_eq!(pager.slice(&items), &[5, 6, 7, 8, 9]);
    }
}
