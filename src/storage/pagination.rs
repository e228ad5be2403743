// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Offset pagination over an ordered result set.

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PER_PAGE: u64 = 5;

/// A validated page request. Both values are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    per_page: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageRequest {
    /// Returns `None` unless both values are positive.
    pub fn new(page: u64, per_page: u64) -> Option<Self> {
        (page >= 1 && per_page >= 1).then_some(Self { page, per_page })
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    /// Number of rows to skip before this page starts.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

/// One page of results plus the totals needed for navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub request: PageRequest,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn page(&self) -> u64 {
        self.request.page
    }

    pub fn per_page(&self) -> u64 {
        self.request.per_page
    }

    /// Total number of pages (0 when there are no rows).
    pub fn pages(&self) -> u64 {
        self.total.div_ceil(self.request.per_page)
    }

    pub fn has_next(&self) -> bool {
        self.page() < self.pages()
    }

    pub fn has_prev(&self) -> bool {
        self.page() > 1
    }

    pub fn next_page(&self) -> Option<u64> {
        self.has_next().then(|| self.page() + 1)
    }

    pub fn prev_page(&self) -> Option<u64> {
        self.has_prev().then(|| self.page() - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(page: u64, per_page: u64, total: u64) -> Page<()> {
        Page {
            items: Vec::new(),
            request: PageRequest::new(page, per_page).unwrap(),
            total,
        }
    }

    #[test]
    fn zero_values_are_rejected() {
        assert!(PageRequest::new(0, 5).is_none());
        assert!(PageRequest::new(1, 0).is_none());
        assert!(PageRequest::new(1, 1).is_some());
    }

    #[test]
    fn defaults_are_first_page_of_five() {
        let request = PageRequest::default();
        assert_eq!(request.page(), 1);
        assert_eq!(request.per_page(), 5);
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn offset_skips_previous_pages() {
        assert_eq!(PageRequest::new(3, 4).unwrap().offset(), 8);
    }

    #[test]
    fn first_of_two_pages() {
        let p = page(1, 2, 3);
        assert_eq!(p.pages(), 2);
        assert!(p.has_next());
        assert!(!p.has_prev());
        assert_eq!(p.next_page(), Some(2));
        assert_eq!(p.prev_page(), None);
    }

    #[test]
    fn last_page() {
        let p = page(2, 2, 3);
        assert!(!p.has_next());
        assert!(p.has_prev());
        assert_eq!(p.next_page(), None);
        assert_eq!(p.prev_page(), Some(1));
    }

    #[test]
    fn empty_result_has_no_pages() {
        let p = page(1, 5, 0);
        assert_eq!(p.pages(), 0);
        assert!(!p.has_next());
        assert!(!p.has_prev());
    }
}
