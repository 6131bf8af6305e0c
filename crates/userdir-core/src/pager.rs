//! Pagination over a derived view
//!
//! `Pager` holds a snapshot of the sequence it pages and a 1-based current
//! page. It never reads the store; callers hand it a fresh sequence through
//! `update_data` after every change.

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::config::PaginationConfig;

/// Page size used until the user picks another
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Page sizes a user may pick
pub const PAGE_SIZES: [usize; 4] = [10, 25, 50, 100];

/// Page numbers shown around the current page
pub const MAX_VISIBLE_PAGES: usize = 5;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PagerError {
    #[error("Unsupported page size {size}; choose one of {allowed:?}")]
    UnsupportedPageSize { size: usize, allowed: Vec<usize> },
}

/// Snapshot of the pagination position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageState {
    pub current_page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl PageState {
    fn new(current_page: usize, page_size: usize, total_items: usize) -> Self {
        let total_pages = total_pages(total_items, page_size);
        Self {
            current_page,
            page_size,
            total_items,
            total_pages,
            has_next_page: current_page < total_pages,
            has_previous_page: current_page > 1,
        }
    }
}

/// Which items the current page shows, 1-based and inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
    pub current_page: usize,
    pub total_pages: usize,
    pub start_item: usize,
    pub end_item: usize,
    pub total_items: usize,
    pub page_size: usize,
}

/// One entry of the navigation strip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "type", content = "page")]
pub enum PageLink {
    Page(usize),
    Ellipsis,
}

/// `ceil(total_items / page_size)`; zero for a zero page size
pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    if page_size == 0 {
        0
    } else {
        total_items.div_ceil(page_size)
    }
}

/// Page `state.current_page` of `sequence`, with the state recomputed for it
///
/// A current page past the end falls back to page 1.
pub fn slice<'a, T>(sequence: &'a [T], state: &PageState) -> (&'a [T], PageState) {
    let pages = total_pages(sequence.len(), state.page_size);
    let current = if state.current_page > pages && pages > 0 {
        1
    } else {
        state.current_page
    };
    let next = PageState::new(current, state.page_size, sequence.len());
    (page_items(sequence, current, state.page_size), next)
}

fn page_items<T>(sequence: &[T], page: usize, page_size: usize) -> &[T] {
    let start = page.saturating_sub(1).saturating_mul(page_size);
    if start >= sequence.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(sequence.len());
    &sequence[start..end]
}

/// Navigation strip centered on `current_page`
///
/// Shows at most `max_visible` consecutive pages, plus the first/last page
/// and an ellipsis when the window does not reach them. Empty when there is
/// at most one page.
pub fn page_window(current_page: usize, total_pages: usize, max_visible: usize) -> Vec<PageLink> {
    if total_pages <= 1 || max_visible == 0 {
        return Vec::new();
    }

    let start = current_page.saturating_sub(max_visible / 2).max(1);
    let end = total_pages.min(start + max_visible - 1);
    let start = (end + 1).saturating_sub(max_visible).max(1);

    let mut links = Vec::with_capacity(max_visible + 4);
    if start > 1 {
        links.push(PageLink::Page(1));
        if start > 2 {
            links.push(PageLink::Ellipsis);
        }
    }
    links.extend((start..=end).map(PageLink::Page));
    if end < total_pages {
        if end < total_pages - 1 {
            links.push(PageLink::Ellipsis);
        }
        links.push(PageLink::Page(total_pages));
    }
    links
}

/// Paginates a sequence of `T`
#[derive(Debug, Clone)]
pub struct Pager<T> {
    data: Vec<T>,
    current_page: usize,
    page_size: usize,
    default_page_size: usize,
    page_sizes: Vec<usize>,
    max_visible: usize,
}

impl<T> Default for Pager<T> {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, PAGE_SIZES.to_vec(), MAX_VISIBLE_PAGES)
    }
}

impl<T> Pager<T> {
    /// Zero sizes are dropped; a default outside the allowed sizes falls
    /// back to `DEFAULT_PAGE_SIZE`, or the smallest allowed size.
    pub fn new(default_page_size: usize, page_sizes: Vec<usize>, max_visible: usize) -> Self {
        let mut page_sizes: Vec<usize> = page_sizes.into_iter().filter(|&size| size > 0).collect();
        if page_sizes.is_empty() {
            warn!("No usable page sizes configured, using {:?}", PAGE_SIZES);
            page_sizes = PAGE_SIZES.to_vec();
        }

        let default_page_size = if page_sizes.contains(&default_page_size) {
            default_page_size
        } else {
            let fallback = if page_sizes.contains(&DEFAULT_PAGE_SIZE) {
                DEFAULT_PAGE_SIZE
            } else {
                page_sizes.iter().copied().min().unwrap_or(DEFAULT_PAGE_SIZE)
            };
            warn!(
                requested = default_page_size,
                fallback, "Default page size is not an allowed size"
            );
            fallback
        };

        Self {
            data: Vec::new(),
            current_page: 1,
            page_size: default_page_size,
            default_page_size,
            page_sizes,
            max_visible,
        }
    }

    pub fn from_config(config: &PaginationConfig) -> Self {
        Self::new(
            config.default_page_size,
            config.page_sizes.clone(),
            config.max_visible_pages,
        )
    }

    /// Replace the paged sequence
    ///
    /// The current page is kept unless it is now past the last page, in
    /// which case it resets to page 1.
    pub fn update_data(&mut self, data: Vec<T>) {
        self.data = data;
        let total = self.total_pages();
        if self.current_page > total && total > 0 {
            self.current_page = 1;
        }
    }

    pub fn total_items(&self) -> usize {
        self.data.len()
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.data.len(), self.page_size)
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_sizes(&self) -> &[usize] {
        &self.page_sizes
    }

    /// Items on the current page
    pub fn current_page_items(&self) -> &[T] {
        page_items(&self.data, self.current_page, self.page_size)
    }

    /// Jump to `page`, clamped to `[1, total_pages]`
    pub fn go_to_page(&mut self, page: usize) {
        self.current_page = page.min(self.total_pages()).max(1);
    }

    pub fn next_page(&mut self) {
        self.go_to_page(self.current_page.saturating_add(1));
    }

    pub fn previous_page(&mut self) {
        self.go_to_page(self.current_page.saturating_sub(1));
    }

    pub fn first_page(&mut self) {
        self.go_to_page(1);
    }

    pub fn last_page(&mut self) {
        self.go_to_page(self.total_pages());
    }

    /// Switch page size, keeping the first visible item on screen
    pub fn change_page_size(&mut self, page_size: usize) -> Result<(), PagerError> {
        if !self.page_sizes.contains(&page_size) {
            return Err(PagerError::UnsupportedPageSize {
                size: page_size,
                allowed: self.page_sizes.clone(),
            });
        }

        let first_index = (self.current_page - 1) * self.page_size;
        self.page_size = page_size;
        self.current_page = first_index / page_size + 1;
        Ok(())
    }

    pub fn current_state(&self) -> PageState {
        PageState::new(self.current_page, self.page_size, self.data.len())
    }

    pub fn summary(&self) -> PageSummary {
        let total_items = self.data.len();
        let (start_item, end_item) = if total_items == 0 {
            (0, 0)
        } else {
            (
                (self.current_page - 1) * self.page_size + 1,
                (self.current_page * self.page_size).min(total_items),
            )
        };

        PageSummary {
            current_page: self.current_page,
            total_pages: self.total_pages(),
            start_item,
            end_item,
            total_items,
            page_size: self.page_size,
        }
    }

    pub fn page_window(&self) -> Vec<PageLink> {
        page_window(self.current_page, self.total_pages(), self.max_visible)
    }

    /// Back to page 1, default size, no data
    pub fn reset(&mut self) {
        self.data.clear();
        self.current_page = 1;
        self.page_size = self.default_page_size;
    }
}
