//! State shapes of the controlled table display.

use std::collections::BTreeMap;
use std::fmt;

use crate::state::{FilterValue, Pagination, TableViewState};

/// Column key to visibility.
pub type VisibilityState = BTreeMap<String, bool>;

/// Row id to selected flag. Ids mapped to `false` are not selected.
pub type RowSelectionState = BTreeMap<String, bool>;

/// One entry of the display's sorting list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSort {
    pub id: String,
    pub desc: bool,
}

impl ColumnSort {
    pub fn new(id: impl Into<String>, desc: bool) -> Self {
        Self {
            id: id.into(),
            desc,
        }
    }
}

/// Value of one column filter as the display holds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnFilterValue {
    Text(String),
    List(Vec<String>),
}

impl From<&FilterValue> for ColumnFilterValue {
    fn from(value: &FilterValue) -> Self {
        match value {
            FilterValue::Text(text) => Self::Text(text.clone()),
            FilterValue::Options(options) => Self::List(options.iter().cloned().collect()),
        }
    }
}

impl From<ColumnFilterValue> for FilterValue {
    fn from(value: ColumnFilterValue) -> Self {
        match value {
            ColumnFilterValue::Text(text) => FilterValue::Text(text),
            ColumnFilterValue::List(list) => FilterValue::options(list),
        }
    }
}

/// One active column filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnFilter {
    pub id: String,
    pub value: ColumnFilterValue,
}

impl ColumnFilter {
    pub fn text(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: ColumnFilterValue::Text(value.into()),
        }
    }

    pub fn list<I, S>(id: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            value: ColumnFilterValue::List(values.into_iter().map(Into::into).collect()),
        }
    }
}

/// The state bundle handed to the display each render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlledState {
    pub pagination: Pagination,
    /// Zero or one entry.
    pub sorting: Vec<ColumnSort>,
    /// Active filters only, in canonical key order.
    pub column_filters: Vec<ColumnFilter>,
    pub column_visibility: VisibilityState,
    pub row_selection: RowSelectionState,
}

impl ControlledState {
    /// Projects store state into the display's shape.
    pub fn project(state: &TableViewState) -> Self {
        Self {
            pagination: state.pagination,
            sorting: state
                .sort
                .iter()
                .map(|sort| ColumnSort::new(sort.column.clone(), sort.descending))
                .collect(),
            column_filters: state
                .filters
                .iter()
                .map(|(key, value)| ColumnFilter {
                    id: key.as_str().to_string(),
                    value: value.into(),
                })
                .collect(),
            column_visibility: state.column_visibility.clone(),
            row_selection: state
                .row_selection
                .iter()
                .map(|id| (id.clone(), true))
                .collect(),
        }
    }
}

/// A change reported by the display: a new value, or a function of the old
/// one.
pub enum Updater<T> {
    Replace(T),
    Apply(Box<dyn FnOnce(&T) -> T + Send>),
}

impl<T> Updater<T> {
    pub fn apply<F>(f: F) -> Self
    where
        F: FnOnce(&T) -> T + Send + 'static,
    {
        Self::Apply(Box::new(f))
    }

    /// Resolves the updater against the current value.
    pub fn resolve(self, current: &T) -> T {
        match self {
            Self::Replace(value) => value,
            Self::Apply(f) => f(current),
        }
    }
}

impl<T> From<T> for Updater<T> {
    fn from(value: T) -> Self {
        Self::Replace(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for Updater<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace(value) => f.debug_tuple("Replace").field(value).finish(),
            Self::Apply(_) => f.write_str("Apply(..)"),
        }
    }
}
