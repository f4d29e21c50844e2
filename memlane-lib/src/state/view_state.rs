//! Table view state.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::config::{DEFAULT_PAGE_SIZE, TableViewConfig};

use super::Filters;

/// Current page position and length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Zero-based page index.
    pub page_index: usize,
    /// Rows per page. Always greater than zero.
    pub page_size: usize,
}

impl Pagination {
    /// Largest page index; its 1-based page number still fits in a `usize`.
    pub const MAX_PAGE_INDEX: usize = usize::MAX - 1;

    pub fn new(page_index: usize, page_size: usize) -> Self {
        Self {
            page_index: page_index.min(Self::MAX_PAGE_INDEX),
            page_size: page_size.max(1),
        }
    }

    /// First page with the given page size.
    pub fn first(page_size: usize) -> Self {
        Self::new(0, page_size)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_SIZE)
    }
}

/// Partial pagination change, merged by the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationUpdate {
    pub page_index: Option<usize>,
    pub page_size: Option<usize>,
}

impl PaginationUpdate {
    pub fn page(page_index: usize) -> Self {
        Self {
            page_index: Some(page_index),
            page_size: None,
        }
    }

    pub fn page_size(page_size: usize) -> Self {
        Self {
            page_index: None,
            page_size: Some(page_size),
        }
    }

    /// Merges this update into `pagination`.
    ///
    /// A page size change without an explicit page index moves back to the
    /// first page. A zero page size is ignored. Page indexes are capped at
    /// [`Pagination::MAX_PAGE_INDEX`].
    pub fn apply(self, pagination: &mut Pagination) {
        if let Some(page_size) = self.page_size.filter(|size| *size > 0) {
            if page_size != pagination.page_size {
                pagination.page_size = page_size;
                if self.page_index.is_none() {
                    pagination.page_index = 0;
                }
            }
        }
        if let Some(page_index) = self.page_index {
            pagination.page_index = page_index.min(Pagination::MAX_PAGE_INDEX);
        }
    }
}

impl From<Pagination> for PaginationUpdate {
    fn from(pagination: Pagination) -> Self {
        Self {
            page_index: Some(pagination.page_index),
            page_size: Some(pagination.page_size),
        }
    }
}

/// The single active sort column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortEntry {
    pub column: String,
    pub descending: bool,
}

impl SortEntry {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: false,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
        }
    }

    /// `"asc"` or `"desc"`.
    pub fn direction(&self) -> &'static str {
        if self.descending { "desc" } else { "asc" }
    }
}

impl fmt::Display for SortEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.column, self.direction())
    }
}

/// Canonical state of one table view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableViewState {
    pub pagination: Pagination,
    pub filters: Filters,
    /// `None` means natural order.
    pub sort: Option<SortEntry>,
    /// Column key to visibility. Absent columns are visible.
    pub column_visibility: BTreeMap<String, bool>,
    /// Selected row ids. May include rows hidden by the current filters.
    pub row_selection: BTreeSet<String>,
}

impl TableViewState {
    /// Default state with the given page size.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            pagination: Pagination::first(page_size),
            ..Self::default()
        }
    }

    /// Initial state of a view mounted with `config`.
    pub fn from_config(config: &TableViewConfig) -> Self {
        Self {
            column_visibility: config.column_visibility.clone(),
            ..Self::with_page_size(config.default_page_size)
        }
    }

    pub fn is_column_visible(&self, column: &str) -> bool {
        self.column_visibility.get(column).copied().unwrap_or(true)
    }

    /// The part of the state carried by the URL.
    pub fn url_state(&self) -> UrlState {
        UrlState {
            pagination: self.pagination,
            filters: self.filters.clone(),
            sort: self.sort.clone(),
        }
    }
}

/// URL-carried projection of [`TableViewState`].
///
/// Column visibility and row selection are local to the mounted view and are
/// not part of the URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlState {
    pub pagination: Pagination,
    pub filters: Filters,
    pub sort: Option<SortEntry>,
}
