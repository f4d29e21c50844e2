//! Change handlers for the controlled table display.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::debounce::Debouncer;
use crate::state::{FilterKey, Filters, Pagination, SortEntry, TableStore};

use super::{
    ColumnFilter, ColumnSort, ControlledState, RowSelectionState, Updater, VisibilityState,
};

/// Free-text search box: immediate local echo, debounced commit.
#[derive(Debug)]
struct SearchInput {
    echo: Mutex<String>,
    debouncer: Debouncer<String>,
}

impl SearchInput {
    fn new(store: TableStore, delay: Duration) -> Self {
        let debouncer = Debouncer::new(delay, move |value: String| {
            // Committing an unchanged title would still reset the page.
            if store.read(|state| state.filters.title() != value) {
                log::debug!("search committed: {value:?}");
                store.set_title_filter(value);
            }
        });
        Self {
            echo: Mutex::new(String::new()),
            debouncer,
        }
    }

    fn echo(&self) -> MutexGuard<'_, String> {
        self.echo.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Bridges a [`TableStore`] to a controlled table display.
///
/// The display renders from [`controlled_state`](Self::controlled_state) and
/// reports user changes through the `on_*_change` handlers. Each handler
/// resolves its [`Updater`] against the current projected value and writes
/// the result into the store. Handlers never fail: unknown filter ids and
/// malformed values are ignored.
#[derive(Debug)]
pub struct TableAdapter {
    store: TableStore,
    search: SearchInput,
}

impl TableAdapter {
    pub fn new(store: TableStore, search_debounce: Duration) -> Self {
        Self {
            search: SearchInput::new(store.clone(), search_debounce),
            store,
        }
    }

    pub fn store(&self) -> &TableStore {
        &self.store
    }

    /// The state bundle for the display.
    pub fn controlled_state(&self) -> ControlledState {
        self.store.read(ControlledState::project)
    }

    pub fn on_pagination_change(&self, updater: impl Into<Updater<Pagination>>) {
        let current = self.store.read(|state| state.pagination);
        let next = updater.into().resolve(&current);
        self.store.set_pagination(next);
    }

    /// Only the first sort entry is kept; an entry without a column id
    /// discards the whole change.
    pub fn on_sorting_change(&self, updater: impl Into<Updater<Vec<ColumnSort>>>) {
        let current = self.controlled_state().sorting;
        let next = updater.into().resolve(&current);

        if next.len() > 1 {
            log::debug!("multi-column sort not supported, keeping `{}`", next[0].id);
        }
        let sort = match next.into_iter().next() {
            Some(entry) if entry.id.is_empty() => {
                log::debug!("ignoring sort entry without a column id");
                return;
            }
            Some(entry) => Some(SortEntry {
                column: entry.id,
                descending: entry.desc,
            }),
            None => None,
        };
        self.store.set_sorting(sort);
    }

    /// Rebuilds all five filters from the new list in one store mutation.
    ///
    /// Keys missing from the list are cleared. Unknown ids are ignored, and
    /// a value of the wrong shape for its key counts as missing. When an id
    /// repeats, the first entry wins.
    pub fn on_column_filters_change(&self, updater: impl Into<Updater<Vec<ColumnFilter>>>) {
        let current = self.controlled_state().column_filters;
        let next = updater.into().resolve(&current);

        let mut filters = Filters::new();
        for filter in next {
            let Some(key) = FilterKey::parse(&filter.id) else {
                log::debug!("ignoring filter for unknown column `{}`", filter.id);
                continue;
            };
            if !filters.contains(key) {
                filters.set(key, filter.value.into());
            }
        }
        self.store.replace_filters(filters);
    }

    pub fn on_column_visibility_change(&self, updater: impl Into<Updater<VisibilityState>>) {
        let current = self.store.read(|state| state.column_visibility.clone());
        let next = updater.into().resolve(&current);
        self.store.set_column_visibility(next);
    }

    /// Only ids mapped to `true` end up selected.
    pub fn on_row_selection_change(&self, updater: impl Into<Updater<RowSelectionState>>) {
        let current = self.controlled_state().row_selection;
        let next = updater.into().resolve(&current);
        self.store.set_row_selection(
            next.into_iter()
                .filter_map(|(id, selected)| selected.then_some(id))
                .collect(),
        );
    }

    /// Handles a keystroke in the search box.
    ///
    /// The echo updates immediately; the title filter is committed once the
    /// input has been quiet for the debounce delay.
    pub fn on_search_input(&self, value: impl Into<String>) {
        let value = value.into();
        *self.search.echo() = value.clone();
        self.search.debouncer.schedule(value);
    }

    /// What the search box shows: the local echo while a commit is pending,
    /// otherwise the committed title filter.
    pub fn search_value(&self) -> String {
        if self.search.debouncer.is_pending() {
            self.search.echo().clone()
        } else {
            self.store.read(|state| state.filters.title().to_string())
        }
    }

    pub fn is_search_pending(&self) -> bool {
        self.search.debouncer.is_pending()
    }

    /// Drops a pending search commit. Returns `true` if one was pending.
    pub fn cancel_pending(&self) -> bool {
        self.search.debouncer.cancel()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use super::*;
    use crate::adapter::ColumnFilterValue;
    use crate::state::FilterValue;

    fn adapter() -> TableAdapter {
        TableAdapter::new(TableStore::default(), Duration::from_millis(300))
    }

    #[test]
    fn test_pagination_updater_function() {
        let adapter = adapter();
        adapter.on_pagination_change(Updater::apply(|p: &Pagination| {
            Pagination::new(p.page_index + 2, p.page_size)
        }));
        assert_eq!(adapter.store().snapshot().pagination, Pagination::new(2, 10));
    }

    #[test]
    fn test_pagination_page_size_from_display() {
        let adapter = adapter();
        adapter.store().set_page(3);
        adapter.on_pagination_change(Pagination::new(1, 20));
        assert_eq!(adapter.store().snapshot().pagination, Pagination::new(1, 20));
    }

    #[test]
    fn test_sorting_takes_first_entry() {
        let adapter = adapter();
        adapter.store().set_page(3);
        adapter.on_sorting_change(vec![
            ColumnSort::new("title", true),
            ColumnSort::new("status", false),
        ]);

        let state = adapter.store().snapshot();
        assert_eq!(state.sort, Some(SortEntry::desc("title")));
        assert_eq!(state.pagination.page_index, 3);

        adapter.on_sorting_change(Vec::<ColumnSort>::new());
        assert_eq!(adapter.store().snapshot().sort, None);
    }

    #[test]
    fn test_sorting_toggle_via_updater() {
        let adapter = adapter();
        adapter.on_sorting_change(vec![ColumnSort::new("title", false)]);
        adapter.on_sorting_change(Updater::apply(|sorting: &Vec<ColumnSort>| {
            sorting
                .iter()
                .map(|s| ColumnSort::new(s.id.clone(), !s.desc))
                .collect()
        }));
        assert_eq!(adapter.store().snapshot().sort, Some(SortEntry::desc("title")));
    }

    #[test]
    fn test_sorting_without_id_is_noop() {
        let adapter = adapter();
        adapter.store().set_sorting(Some(SortEntry::asc("title")));
        adapter.on_sorting_change(vec![ColumnSort::new("", true)]);
        assert_eq!(adapter.store().snapshot().sort, Some(SortEntry::asc("title")));
    }

    #[test]
    fn test_column_filters_set_and_clear() {
        let adapter = adapter();
        adapter.store().set_reviewer_filter(["Eddie Lake"]);
        adapter.store().set_page(2);

        adapter.on_column_filters_change(vec![
            ColumnFilter::text("title", "cover"),
            ColumnFilter::list("status", ["done"]),
        ]);

        let state = adapter.store().snapshot();
        assert_eq!(state.filters.title(), "cover");
        assert!(state.filters.contains(FilterKey::Status));
        assert!(!state.filters.contains(FilterKey::Reviewer));
        assert_eq!(state.pagination.page_index, 0);
    }

    #[test]
    fn test_column_filters_single_notification() {
        let adapter = adapter();
        adapter.store().set_type_filter(["Narrative"]);
        let revision = adapter.store().revision();

        adapter.on_column_filters_change(vec![
            ColumnFilter::text("title", "cover"),
            ColumnFilter::list("priority", ["high"]),
        ]);
        assert_eq!(adapter.store().revision(), revision + 1);
    }

    #[test]
    fn test_column_filters_ignore_unknown_and_malformed() {
        let adapter = adapter();
        adapter.on_column_filters_change(vec![
            ColumnFilter::list("estHours", ["8"]),
            ColumnFilter::list("title", ["not", "text"]),
            ColumnFilter::text("status", "done"),
            ColumnFilter::list("type", ["Narrative"]),
        ]);

        let state = adapter.store().snapshot();
        assert_eq!(state.filters.len(), 1);
        assert_eq!(
            state.filters.get(FilterKey::Type),
            Some(&FilterValue::options(["Narrative"]))
        );
    }

    #[test]
    fn test_column_filters_reset_control() {
        let adapter = adapter();
        adapter.store().set_title_filter("abc");
        adapter.store().set_status_filter(["done"]);

        adapter.on_column_filters_change(Updater::apply(|_: &Vec<ColumnFilter>| Vec::new()));
        assert!(adapter.store().snapshot().filters.is_empty());
    }

    #[test]
    fn test_column_filters_updater_sees_current() {
        let adapter = adapter();
        adapter.store().set_status_filter(["done"]);

        adapter.on_column_filters_change(Updater::apply(|filters: &Vec<ColumnFilter>| {
            let mut next = filters.clone();
            next.push(ColumnFilter {
                id: "priority".into(),
                value: ColumnFilterValue::List(vec!["high".into()]),
            });
            next
        }));

        let state = adapter.store().snapshot();
        assert!(state.filters.contains(FilterKey::Status));
        assert!(state.filters.contains(FilterKey::Priority));
    }

    #[test]
    fn test_visibility_and_selection_pass_through() {
        let adapter = adapter();
        adapter.store().set_page(1);

        adapter.on_column_visibility_change(BTreeMap::from([("reviewer".to_string(), false)]));
        adapter.on_row_selection_change(BTreeMap::from([
            ("MEM-1001".to_string(), true),
            ("MEM-1002".to_string(), false),
        ]));

        let state = adapter.store().snapshot();
        assert!(!state.is_column_visible("reviewer"));
        assert_eq!(state.row_selection, BTreeSet::from(["MEM-1001".to_string()]));
        assert_eq!(state.pagination.page_index, 1);
        assert_eq!(
            adapter.controlled_state().row_selection,
            BTreeMap::from([("MEM-1001".to_string(), true)])
        );
    }

    #[test]
    fn test_search_outside_runtime_commits_immediately() {
        let adapter = adapter();
        adapter.store().set_page(2);
        adapter.on_search_input("cover");

        let state = adapter.store().snapshot();
        assert_eq!(state.filters.title(), "cover");
        assert_eq!(state.pagination.page_index, 0);
        assert_eq!(adapter.search_value(), "cover");
    }

    #[test]
    fn test_search_same_title_keeps_page() {
        let adapter = adapter();
        adapter.store().set_title_filter("cover");
        adapter.store().set_page(2);

        adapter.on_search_input("cover");
        assert_eq!(adapter.store().snapshot().pagination.page_index, 2);
    }
}
