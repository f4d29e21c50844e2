//! Column filters.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Kind of value a filter column accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Single free-text value.
    Text,
    /// Set of selected option values.
    MultiSelect,
}

/// A filterable column of the memories table.
///
/// Variant order is the canonical order used when encoding the URL and when
/// projecting filters for the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterKey {
    Title,
    Status,
    Priority,
    Type,
    Reviewer,
}

impl FilterKey {
    /// All filter keys in canonical order.
    pub const ALL: [FilterKey; 5] = [
        FilterKey::Title,
        FilterKey::Status,
        FilterKey::Priority,
        FilterKey::Type,
        FilterKey::Reviewer,
    ];

    /// The column id, also used as the query parameter name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Status => "status",
            Self::Priority => "priority",
            Self::Type => "type",
            Self::Reviewer => "reviewer",
        }
    }

    /// Looks up a key by column id. Unknown ids yield `None`.
    pub fn parse(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == id)
    }

    pub fn kind(self) -> FilterKind {
        match self {
            Self::Title => FilterKind::Text,
            _ => FilterKind::MultiSelect,
        }
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The value of one column filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    /// Free-text search value.
    Text(String),
    /// Selected options. Empty strings are never members.
    Options(BTreeSet<String>),
}

impl FilterValue {
    /// Creates a text filter value.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Creates an options filter value, dropping empty strings.
    pub fn options<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Options(
            values
                .into_iter()
                .map(Into::into)
                .filter(|value: &String| !value.is_empty())
                .collect(),
        )
    }

    /// The empty value for a key: `""` for text, `{}` for multi-select.
    pub fn empty(key: FilterKey) -> Self {
        match key.kind() {
            FilterKind::Text => Self::Text(String::new()),
            FilterKind::MultiSelect => Self::Options(BTreeSet::new()),
        }
    }

    /// Returns `true` if setting this value clears the filter.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Options(options) => options.is_empty(),
        }
    }

    pub fn kind(&self) -> FilterKind {
        match self {
            Self::Text(_) => FilterKind::Text,
            Self::Options(_) => FilterKind::MultiSelect,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Options(_) => None,
        }
    }

    pub fn as_options(&self) -> Option<&BTreeSet<String>> {
        match self {
            Self::Text(_) => None,
            Self::Options(options) => Some(options),
        }
    }
}

/// Active column filters.
///
/// Never holds an empty value: setting an empty value removes the key, so
/// "no filter" and "empty filter" are the same state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    entries: BTreeMap<FilterKey, FilterValue>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets or clears a filter. Returns `true` if the filters changed.
    ///
    /// A value of the wrong kind for the key is ignored.
    pub fn set(&mut self, key: FilterKey, value: FilterValue) -> bool {
        if value.kind() != key.kind() {
            log::debug!("ignoring {:?} value for filter `{}`", value.kind(), key);
            return false;
        }

        if value.is_empty() {
            return self.entries.remove(&key).is_some();
        }

        match self.entries.get(&key) {
            Some(existing) if *existing == value => false,
            _ => {
                self.entries.insert(key, value);
                true
            }
        }
    }

    /// Builder form of [`Filters::set`].
    pub fn with(mut self, key: FilterKey, value: FilterValue) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: FilterKey) -> Option<&FilterValue> {
        self.entries.get(&key)
    }

    /// The title search, or `""` when unset.
    pub fn title(&self) -> &str {
        self.get(FilterKey::Title)
            .and_then(FilterValue::as_text)
            .unwrap_or_default()
    }

    /// Selected options for a multi-select key, if any.
    pub fn options(&self, key: FilterKey) -> Option<&BTreeSet<String>> {
        self.get(key).and_then(FilterValue::as_options)
    }

    /// Active filters in canonical key order.
    pub fn iter(&self) -> impl Iterator<Item = (FilterKey, &FilterValue)> {
        self.entries.iter().map(|(key, value)| (*key, value))
    }

    pub fn contains(&self, key: FilterKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
