// Paginator - fixed-size pages over a filtered view
use serde::Serialize;

use crate::domain::reading::Reading;

pub const PAGE_SIZE: usize = 25;

/// Number of pages for `len` items. Never less than one.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    len.div_ceil(page_size).max(1)
}

/// Slice for a 1-based page. Out of range page numbers are clamped.
pub fn page(view: &[Reading], page_number: usize, page_size: usize) -> &[Reading] {
    let page_size = page_size.max(1);
    let page_number = page_number.clamp(1, total_pages(view.len(), page_size));
    let start = (page_number - 1) * page_size;
    let end = (start + page_size).min(view.len());
    &view[start.min(end)..end]
}

/// "Showing X to Y of Z" plus navigation state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSummary {
    pub current_page: usize,
    pub total_pages: usize,
    pub page_size: usize,
    /// 1-based index of the first row on this page; 0 when the view is empty.
    pub first_index: usize,
    pub last_index: usize,
    pub filtered_count: usize,
    pub total_count: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
    current_page: usize,
    page_size: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}

impl Paginator {
    pub fn new(page_size: usize) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    /// Keep the current page within `[1, total_pages(len)]`.
    pub fn clamp(&mut self, len: usize) {
        self.current_page = self
            .current_page
            .clamp(1, total_pages(len, self.page_size));
    }

    pub fn next(&mut self, len: usize) {
        self.go_to(self.current_page + 1, len);
    }

    pub fn previous(&mut self) {
        self.current_page = self.current_page.saturating_sub(1).max(1);
    }

    pub fn go_to(&mut self, page_number: usize, len: usize) {
        self.current_page = page_number.clamp(1, total_pages(len, self.page_size));
    }

    pub fn last(&mut self, len: usize) {
        self.current_page = total_pages(len, self.page_size);
    }

    pub fn slice<'a>(&self, view: &'a [Reading]) -> &'a [Reading] {
        page(view, self.current_page, self.page_size)
    }

    pub fn summary(&self, filtered_count: usize, total_count: usize) -> PageSummary {
        let total_pages = total_pages(filtered_count, self.page_size);
        let current_page = self.current_page.clamp(1, total_pages);
        let start = (current_page - 1) * self.page_size;
        let last_index = (start + self.page_size).min(filtered_count);
        let first_index = if filtered_count == 0 { 0 } else { start + 1 };

        PageSummary {
            current_page,
            total_pages,
            page_size: self.page_size,
            first_index,
            last_index,
            filtered_count,
            total_count,
            has_previous: current_page > 1,
            has_next: current_page < total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(n: usize) -> Vec<Reading> {
        (0..n)
            .map(|i| Reading::new(20.0, 50.0, 0.0, "normal").with_id(i as i64))
            .collect()
    }

    fn first_id(slice: &[Reading]) -> Option<i64> {
        slice.first().and_then(|r| r.id)
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 25), 1);
        assert_eq!(total_pages(1, 25), 1);
        assert_eq!(total_pages(25, 25), 1);
        assert_eq!(total_pages(26, 25), 2);
        assert_eq!(total_pages(1000, 25), 40);
    }

    #[test]
    fn test_page_slices() {
        let v = view(60);
        assert_eq!(page(&v, 1, 25).len(), 25);
        assert_eq!(first_id(page(&v, 2, 25)), Some(25));
        assert_eq!(page(&v, 3, 25).len(), 10);
        assert_eq!(first_id(page(&v, 3, 25)), Some(50));
    }

    #[test]
    fn test_page_beyond_range_is_clamped() {
        let v = view(60);
        assert_eq!(page(&v, 99, 25), page(&v, 3, 25));
        assert_eq!(page(&v, 0, 25), page(&v, 1, 25));
    }

    #[test]
    fn test_empty_view() {
        let v = view(0);
        assert!(page(&v, 1, 25).is_empty());
        assert!(page(&v, 5, 25).is_empty());
    }

    #[test]
    fn test_navigation_stops_at_boundaries() {
        let mut paginator = Paginator::default();
        paginator.previous();
        assert_eq!(paginator.current_page(), 1);

        paginator.next(60);
        paginator.next(60);
        paginator.next(60);
        assert_eq!(paginator.current_page(), 3);

        paginator.go_to(10, 60);
        assert_eq!(paginator.current_page(), 3);

        paginator.reset();
        assert_eq!(paginator.current_page(), 1);

        paginator.last(60);
        assert_eq!(paginator.current_page(), 3);
        paginator.clamp(30);
        assert_eq!(paginator.current_page(), 2);
    }

    #[test]
    fn test_summary() {
        let mut paginator = Paginator::default();
        paginator.go_to(2, 60);
        let summary = paginator.summary(60, 200);
        assert_eq!(summary.first_index, 26);
        assert_eq!(summary.last_index, 50);
        assert_eq!(summary.total_pages, 3);
        assert!(summary.has_previous);
        assert!(summary.has_next);

        let empty = Paginator::default().summary(0, 0);
        assert_eq!(empty.first_index, 0);
        assert_eq!(empty.last_index, 0);
        assert_eq!(empty.total_pages, 1);
        assert!(!empty.has_previous);
        assert!(!empty.has_next);
    }
}
