//! Client-side row model: filtering, sorting, pagination and facets.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::NaiveDate;

use crate::state::{FilterKey, FilterValue, Filters, SortEntry, TableViewState};

/// A value a column sorts by.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortValue<'a> {
    Text(&'a str),
    Number(f64),
    Date(NaiveDate),
}

impl SortValue<'_> {
    fn rank(&self) -> u8 {
        match self {
            Self::Number(_) => 0,
            Self::Date(_) => 1,
            Self::Text(_) => 2,
        }
    }

    /// Total order. Text compares case-insensitively, then exactly.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a
                .to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b)),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Rows the table can filter and sort.
///
/// # Example
///
/// ```
/// use memlane_lib::rows::{SortValue, TableRow};
/// use memlane_lib::state::FilterKey;
///
/// struct Note {
///     id: String,
///     title: String,
/// }
///
/// impl TableRow for Note {
///     fn id(&self) -> String {
///         self.id.clone()
///     }
///
///     fn filter_value(&self, key: FilterKey) -> Option<&str> {
///         (key == FilterKey::Title).then_some(self.title.as_str())
///     }
///
///     fn sort_value(&self, column: &str) -> Option<SortValue<'_>> {
///         (column == "title").then_some(SortValue::Text(&self.title))
///     }
/// }
/// ```
pub trait TableRow {
    /// Stable row id, independent of the row's position.
    fn id(&self) -> String;

    /// The value a filter column matches against. `None` never matches an
    /// active filter.
    fn filter_value(&self, key: FilterKey) -> Option<&str>;

    /// The value a column sorts by. Rows without one sort last.
    fn sort_value(&self, column: &str) -> Option<SortValue<'_>>;
}

/// One page of rows after filtering and sorting.
#[derive(Debug)]
pub struct RowModel<'a, R> {
    /// Rows on the current page.
    pub rows: Vec<&'a R>,
    /// Rows before filtering.
    pub total_count: usize,
    /// Rows matching the filters, across all pages.
    pub filtered_count: usize,
    /// Zero when nothing matches.
    pub page_count: usize,
    /// The requested page clamped to the last page.
    pub page_index: usize,
    /// Selected rows across all pages, including rows hidden by filters.
    pub selected_count: usize,
}

impl<R> RowModel<'_, R> {
    pub fn can_previous(&self) -> bool {
        self.page_index > 0
    }

    pub fn can_next(&self) -> bool {
        self.page_index + 1 < self.page_count
    }
}

/// Returns `true` if `row` passes every active filter.
pub fn matches<R: TableRow>(row: &R, filters: &Filters) -> bool {
    filters.iter().all(|(key, value)| {
        let Some(cell) = row.filter_value(key) else {
            return false;
        };
        match value {
            FilterValue::Text(needle) => cell.to_lowercase().contains(&needle.to_lowercase()),
            FilterValue::Options(options) => options.contains(cell),
        }
    })
}

fn compare_rows<R: TableRow>(a: &R, b: &R, sort: &SortEntry) -> Ordering {
    match (a.sort_value(&sort.column), b.sort_value(&sort.column)) {
        (Some(a), Some(b)) => {
            let ordering = a.compare(&b);
            if sort.descending { ordering.reverse() } else { ordering }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl<'a, R: TableRow> RowModel<'a, R> {
    /// Applies the view state to `rows`: filter, stable sort, then paginate.
    ///
    /// Out-of-range pages are clamped here; the store keeps whatever index it
    /// was given.
    pub fn apply(rows: &'a [R], state: &TableViewState) -> Self {
        let mut filtered: Vec<&R> = rows
            .iter()
            .filter(|row| matches(*row, &state.filters))
            .collect();

        if let Some(sort) = &state.sort {
            filtered.sort_by(|a, b| compare_rows(*a, *b, sort));
        }

        let page_size = state.pagination.page_size.max(1);
        let filtered_count = filtered.len();
        let page_count = filtered_count.div_ceil(page_size);
        let page_index = state
            .pagination
            .page_index
            .min(page_count.saturating_sub(1));

        let selected_count = rows
            .iter()
            .filter(|row| state.row_selection.contains(&row.id()))
            .count();

        RowModel {
            rows: filtered
                .into_iter()
                .skip(page_index * page_size)
                .take(page_size)
                .collect(),
            total_count: rows.len(),
            filtered_count,
            page_count,
            page_index,
            selected_count,
        }
    }
}

/// A filter option with its row count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Facet {
    pub value: String,
    pub label: String,
    pub count: usize,
}

/// Unique values of a filter column, in first-seen order, with counts.
///
/// Counts are taken over `rows` as given, so pass the unfiltered rows to get
/// stable option lists.
pub fn facets<R: TableRow>(rows: &[R], key: FilterKey) -> Vec<Facet> {
    let mut facets: Vec<Facet> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for value in rows.iter().filter_map(|row| row.filter_value(key)) {
        match positions.get(value) {
            Some(&position) => facets[position].count += 1,
            None => {
                positions.insert(value, facets.len());
                facets.push(Facet {
                    value: value.to_string(),
                    label: option_label(key, value),
                    count: 1,
                });
            }
        }
    }

    facets
}

/// Display label for a filter option.
///
/// Status and priority values are slugs (`in-progress`) and are shown as
/// capitalized words (`In Progress`); other values are shown as-is.
pub fn option_label(key: FilterKey, value: &str) -> String {
    match key {
        FilterKey::Status | FilterKey::Priority => value
            .split('-')
            .filter(|word| !word.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            })
            .collect::<Vec<String>>()
            .join(" "),
        _ => value.to_string(),
    }
}
