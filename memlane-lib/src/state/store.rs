//! Observable table view store.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use crate::config::TableViewConfig;

use super::{
    FilterKey, FilterValue, Filters, PaginationUpdate, SortEntry, TableViewState, UrlState,
};

/// A state change delivered to store listeners.
#[derive(Debug, Clone)]
pub struct StoreChange {
    /// Monotonic revision, bumped once per effective mutation.
    pub revision: u64,
    /// The state after the mutation.
    pub state: TableViewState,
}

/// Identifies a listener registered with [`TableStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(&StoreChange) + Send + Sync>;

struct Versioned {
    revision: u64,
    state: TableViewState,
}

struct StoreInner {
    current: RwLock<Versioned>,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
    next_listener: AtomicU64,
    /// State restored by `reset_all`.
    initial: TableViewState,
}

/// Single source of truth for one mounted table view.
///
/// `TableStore` is a cheap-to-clone handle; clones share the same state and
/// listeners. Every operation applies atomically under a write lock, then
/// notifies listeners with the resulting state once the lock is released.
/// Operations that leave the state unchanged notify nobody.
///
/// Listeners run synchronously on the mutating thread and must not mutate
/// the store they are registered with.
///
/// # Example
///
/// ```
/// use memlane_lib::state::{SortEntry, TableStore};
///
/// let store = TableStore::default();
/// store.set_page(3);
/// store.set_sorting(Some(SortEntry::desc("title")));
/// assert_eq!(store.snapshot().pagination.page_index, 3);
///
/// store.set_status_filter(["done"]);
/// assert_eq!(store.snapshot().pagination.page_index, 0);
/// ```
#[derive(Clone)]
pub struct TableStore {
    inner: Arc<StoreInner>,
}

impl TableStore {
    /// Creates a store starting at `initial`, which is also what
    /// [`reset_all`](Self::reset_all) restores.
    pub fn new(initial: TableViewState) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                current: RwLock::new(Versioned {
                    revision: 0,
                    state: initial.clone(),
                }),
                listeners: Mutex::new(Vec::new()),
                next_listener: AtomicU64::new(0),
                initial,
            }),
        }
    }

    pub fn from_config(config: &TableViewConfig) -> Self {
        Self::new(TableViewState::from_config(config))
    }

    /// Get a clone of the current state.
    pub fn snapshot(&self) -> TableViewState {
        self.read(|state| state.clone())
    }

    /// Read the current state without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&TableViewState) -> R) -> R {
        let guard = self
            .inner
            .current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&guard.state)
    }

    /// Revision of the current state. Starts at zero.
    pub fn revision(&self) -> u64 {
        self.inner
            .current
            .read()
            .map(|guard| guard.revision)
            .unwrap_or_else(|poisoned| poisoned.into_inner().revision)
    }

    // -------------------------------------------------------------------------
    // Subscriptions
    // -------------------------------------------------------------------------

    /// Registers a listener called after every effective mutation.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&StoreChange) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.inner.next_listener.fetch_add(1, Ordering::SeqCst));
        self.listeners().push((id, Arc::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners();
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners().len()
    }

    fn listeners(&self) -> std::sync::MutexGuard<'_, Vec<(SubscriptionId, Listener)>> {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Applies `f` atomically and notifies listeners if the state changed.
    fn mutate(&self, action: &'static str, f: impl FnOnce(&mut TableViewState)) {
        let change = {
            let mut guard = self
                .inner
                .current
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());

            let mut next = guard.state.clone();
            f(&mut next);
            if next == guard.state {
                log::trace!("{action}: no change");
                return;
            }

            guard.revision += 1;
            guard.state = next;
            log::trace!("{action}: revision {}", guard.revision);
            StoreChange {
                revision: guard.revision,
                state: guard.state.clone(),
            }
        };

        let listeners: Vec<Listener> = self
            .listeners()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(&change);
        }
    }

    // -------------------------------------------------------------------------
    // Filters
    // -------------------------------------------------------------------------

    /// Replaces one filter and moves back to the first page.
    ///
    /// An empty value clears the filter. A value of the wrong kind for `key`
    /// leaves the filter untouched.
    pub fn set_filter(&self, key: FilterKey, value: FilterValue) {
        self.mutate("set_filter", |state| {
            state.filters.set(key, value);
            state.pagination.page_index = 0;
        });
    }

    pub fn set_title_filter(&self, value: impl Into<String>) {
        self.set_filter(FilterKey::Title, FilterValue::text(value));
    }

    pub fn set_status_filter<I, S>(&self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_filter(FilterKey::Status, FilterValue::options(values));
    }

    pub fn set_priority_filter<I, S>(&self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_filter(FilterKey::Priority, FilterValue::options(values));
    }

    pub fn set_type_filter<I, S>(&self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_filter(FilterKey::Type, FilterValue::options(values));
    }

    pub fn set_reviewer_filter<I, S>(&self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_filter(FilterKey::Reviewer, FilterValue::options(values));
    }

    /// Replaces every filter at once and moves back to the first page.
    pub fn replace_filters(&self, filters: Filters) {
        self.mutate("replace_filters", |state| {
            state.filters = filters;
            state.pagination.page_index = 0;
        });
    }

    /// Clears all filters and moves back to the first page.
    pub fn reset_filters(&self) {
        self.mutate("reset_filters", |state| {
            state.filters.clear();
            state.pagination.page_index = 0;
        });
    }

    // -------------------------------------------------------------------------
    // Sorting & pagination
    // -------------------------------------------------------------------------

    /// Replaces the sort. The page position is kept.
    ///
    /// A sort without a column id is ignored.
    pub fn set_sorting(&self, sort: Option<SortEntry>) {
        if sort.as_ref().is_some_and(|sort| sort.column.is_empty()) {
            log::debug!("set_sorting: ignoring sort without a column id");
            return;
        }
        self.mutate("set_sorting", |state| state.sort = sort);
    }

    /// Merges a pagination change. See [`PaginationUpdate::apply`].
    pub fn set_pagination(&self, update: impl Into<PaginationUpdate>) {
        let update = update.into();
        self.mutate("set_pagination", |state| update.apply(&mut state.pagination));
    }

    pub fn set_page(&self, page_index: usize) {
        self.set_pagination(PaginationUpdate::page(page_index));
    }

    /// Sets the page size and moves back to the first page.
    pub fn set_page_size(&self, page_size: usize) {
        self.set_pagination(PaginationUpdate::page_size(page_size));
    }

    // -------------------------------------------------------------------------
    // View-local state
    // -------------------------------------------------------------------------

    pub fn set_column_visibility(&self, visibility: BTreeMap<String, bool>) {
        self.mutate("set_column_visibility", |state| {
            state.column_visibility = visibility
        });
    }

    pub fn set_row_selection(&self, selection: BTreeSet<String>) {
        self.mutate("set_row_selection", |state| state.row_selection = selection);
    }

    // -------------------------------------------------------------------------
    // Whole-state operations
    // -------------------------------------------------------------------------

    /// Restores the state the store was created with.
    pub fn reset_all(&self) {
        let initial = self.inner.initial.clone();
        self.mutate("reset_all", |state| *state = initial);
    }

    /// Hydrates the URL-carried fields. Column visibility and row selection
    /// are kept.
    pub fn apply_url_state(&self, url_state: UrlState) {
        self.mutate("apply_url_state", |state| {
            state.pagination = url_state.pagination;
            state.filters = url_state.filters;
            state.sort = url_state.sort;
        });
    }
}

impl Default for TableStore {
    fn default() -> Self {
        Self::new(TableViewState::default())
    }
}

impl fmt::Debug for TableStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableStore")
            .field("revision", &self.revision())
            .field("state", &self.snapshot())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Pagination;

    fn store_at_page(page_index: usize) -> TableStore {
        let store = TableStore::default();
        store.set_page(page_index);
        store
    }

    fn recording(store: &TableStore) -> Arc<Mutex<Vec<StoreChange>>> {
        let changes = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&changes);
        store.subscribe(move |change| sink.lock().unwrap().push(change.clone()));
        changes
    }

    #[test]
    fn test_filter_resets_page() {
        let store = store_at_page(3);
        store.set_status_filter(["done"]);

        let state = store.snapshot();
        assert_eq!(state.pagination.page_index, 0);
        assert_eq!(
            state.filters.options(FilterKey::Status).map(|o| o.len()),
            Some(1)
        );
    }

    #[test]
    fn test_every_filter_setter_resets_page() {
        let setters: [fn(&TableStore); 5] = [
            |s| s.set_title_filter("cover"),
            |s| s.set_status_filter(["done"]),
            |s| s.set_priority_filter(["high"]),
            |s| s.set_type_filter(["Narrative"]),
            |s| s.set_reviewer_filter(["Eddie Lake"]),
        ];
        for setter in setters {
            let store = store_at_page(2);
            setter(&store);
            assert_eq!(store.snapshot().pagination.page_index, 0);
        }
    }

    #[test]
    fn test_sort_preserves_page() {
        let store = store_at_page(3);
        store.set_sorting(Some(SortEntry::desc("title")));

        let state = store.snapshot();
        assert_eq!(state.pagination.page_index, 3);
        assert_eq!(state.sort, Some(SortEntry::desc("title")));
    }

    #[test]
    fn test_sort_without_column_ignored() {
        let store = TableStore::default();
        store.set_sorting(Some(SortEntry::asc("title")));
        let revision = store.revision();

        store.set_sorting(Some(SortEntry::asc("")));
        assert_eq!(store.snapshot().sort, Some(SortEntry::asc("title")));
        assert_eq!(store.revision(), revision);

        store.set_sorting(None);
        assert_eq!(store.snapshot().sort, None);
    }

    #[test]
    fn test_huge_page_index_capped() {
        let store = store_at_page(usize::MAX);
        assert_eq!(
            store.snapshot().pagination.page_index,
            Pagination::MAX_PAGE_INDEX
        );
    }

    #[test]
    fn test_filter_replaces_not_merges() {
        let store = TableStore::default();
        store.set_status_filter(["done", "todo"]);
        store.set_status_filter(["canceled"]);

        let state = store.snapshot();
        let status: Vec<_> = state
            .filters
            .options(FilterKey::Status)
            .unwrap()
            .iter()
            .cloned()
            .collect();
        assert_eq!(status, vec!["canceled".to_string()]);
    }

    #[test]
    fn test_empty_filter_clears_key() {
        let store = TableStore::default();
        store.set_priority_filter(["high"]);
        store.set_priority_filter(Vec::<String>::new());
        assert!(!store.snapshot().filters.contains(FilterKey::Priority));

        store.set_title_filter("abc");
        store.set_title_filter("");
        assert!(store.snapshot().filters.is_empty());
    }

    #[test]
    fn test_visibility_and_selection_keep_page() {
        let store = store_at_page(2);
        store.set_column_visibility(BTreeMap::from([("reviewer".to_string(), false)]));
        store.set_row_selection(BTreeSet::from(["MEM-1001".to_string()]));

        let state = store.snapshot();
        assert_eq!(state.pagination.page_index, 2);
        assert!(!state.is_column_visible("reviewer"));
        assert!(state.row_selection.contains("MEM-1001"));
    }

    #[test]
    fn test_reset_filters() {
        let store = TableStore::default();
        store.set_title_filter("abc");
        store.set_status_filter(["done"]);
        store.set_sorting(Some(SortEntry::asc("title")));
        store.set_page(2);

        store.reset_filters();

        let state = store.snapshot();
        assert!(state.filters.is_empty());
        assert_eq!(state.pagination.page_index, 0);
        assert_eq!(state.sort, Some(SortEntry::asc("title")));
    }

    #[test]
    fn test_reset_all_restores_initial() {
        let initial = TableViewState::with_page_size(25);
        let store = TableStore::new(initial.clone());
        store.set_page_size(50);
        store.set_page(4);
        store.set_type_filter(["Narrative"]);
        store.set_row_selection(BTreeSet::from(["MEM-1002".to_string()]));

        store.reset_all();
        assert_eq!(store.snapshot(), initial);
    }

    #[test]
    fn test_apply_url_state_keeps_local_fields() {
        let store = TableStore::default();
        store.set_row_selection(BTreeSet::from(["MEM-1003".to_string()]));
        store.set_title_filter("old");

        store.apply_url_state(UrlState {
            pagination: Pagination::new(1, 20),
            filters: Filters::new(),
            sort: Some(SortEntry::asc("estHours")),
        });

        let state = store.snapshot();
        assert_eq!(state.pagination, Pagination::new(1, 20));
        assert!(state.filters.is_empty());
        assert!(state.row_selection.contains("MEM-1003"));
    }

    #[test]
    fn test_listeners_notified_in_order() {
        let store = TableStore::default();
        let changes = recording(&store);

        store.set_page(1);
        store.set_sorting(Some(SortEntry::asc("title")));
        store.set_type_filter(["Narrative"]);

        let changes = changes.lock().unwrap();
        let revisions: Vec<u64> = changes.iter().map(|c| c.revision).collect();
        assert_eq!(revisions, vec![1, 2, 3]);
        assert_eq!(changes[0].state.pagination.page_index, 1);
        assert_eq!(changes[2].state.pagination.page_index, 0);
    }

    #[test]
    fn test_no_op_does_not_notify() {
        let store = TableStore::default();
        let changes = recording(&store);

        store.set_sorting(None);
        store.set_page(0);
        store.reset_filters();
        store.set_page_size(10);

        assert!(changes.lock().unwrap().is_empty());
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn test_unsubscribe() {
        let store = TableStore::default();
        let changes = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&changes);
        let id = store.subscribe(move |_| *sink.lock().unwrap() += 1);

        store.set_page(1);
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.set_page(2);

        assert_eq!(*changes.lock().unwrap(), 1);
        assert_eq!(store.listener_count(), 0);
    }

    #[test]
    fn test_stores_are_independent() {
        let a = TableStore::default();
        let b = TableStore::default();
        a.set_title_filter("only in a");

        assert_eq!(a.snapshot().filters.title(), "only in a");
        assert!(b.snapshot().filters.is_empty());

        let a2 = a.clone();
        a2.set_page(5);
        assert_eq!(a.snapshot().pagination.page_index, 5);
    }
}
