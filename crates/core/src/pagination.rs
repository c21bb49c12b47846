//! Pagination cursor and page slices.
//!
//! The cursor only knows its own `(page, per_page)` pair. It floors the page at 1 but does not
//! know how many records exist; a page past the end simply yields an empty [`PageSlice`].
//! Views that do know the total call [`PaginationCursor::clamp_to_total`] when it changes.

use crate::constants::{DEFAULT_PAGE, DEFAULT_PER_PAGE};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaginationCursor {
    page: usize,
    per_page: usize,
    initial_page: usize,
    initial_per_page: usize,
}

impl Default for PaginationCursor {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_PER_PAGE)
    }
}

impl PaginationCursor {
    /// Creates a cursor. Zero values are raised to 1.
    pub fn new(initial_page: usize, initial_per_page: usize) -> Self {
        let initial_page = initial_page.max(1);
        let initial_per_page = initial_per_page.max(1);
        Self {
            page: initial_page,
            per_page: initial_per_page,
            initial_page,
            initial_per_page,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn next_page(&mut self) {
        self.page = self.page.saturating_add(1);
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }

    /// Changes the page size and returns to the first page.
    pub fn change_per_page(&mut self, per_page: usize) {
        self.per_page = per_page.max(1);
        self.page = 1;
    }

    /// Restores the construction-time page and page size.
    pub fn reset(&mut self) {
        self.page = self.initial_page;
        self.per_page = self.initial_per_page;
    }

    pub fn total_pages(&self, total: usize) -> usize {
        total.div_ceil(self.per_page)
    }

    /// Pulls the page back inside `[1, total_pages]` for a collection of `total` items.
    pub fn clamp_to_total(&mut self, total: usize) {
        let last = self.total_pages(total).max(1);
        self.page = self.page.clamp(1, last);
    }

    /// Offset of the first item of the current page.
    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.per_page)
    }

    /// Cuts the current page out of `items`.
    pub fn slice<'a, T>(&self, items: &[&'a T]) -> PageSlice<'a, T> {
        let total = items.len();
        let start = self.offset().min(total);
        let end = start.saturating_add(self.per_page).min(total);

        PageSlice {
            items: items[start..end].to_vec(),
            page: self.page,
            per_page: self.per_page,
            total,
            total_pages: self.total_pages(total),
            first_index: start,
        }
    }
}

/// The visible window of a filtered collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PageSlice<'a, T> {
    pub items: Vec<&'a T>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
    #[serde(skip)]
    first_index: usize,
}

impl<'a, T> PageSlice<'a, T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// 1-based position of the first visible item, or `None` for an empty page.
    pub fn first_index(&self) -> Option<usize> {
        (!self.items.is_empty()).then_some(self.first_index + 1)
    }

    /// 1-based position of the last visible item, or `None` for an empty page.
    pub fn last_index(&self) -> Option<usize> {
        (!self.items.is_empty()).then_some(self.first_index + self.items.len())
    }
}
