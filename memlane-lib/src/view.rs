//! The mounted table view: URL hydration, sync lifecycle and the handlers a
//! table display is wired to.

use std::fmt;
use std::sync::Arc;

use crate::adapter::{ControlledState, TableAdapter};
use crate::config::TableViewConfig;
use crate::location::Location;
use crate::query::QueryCodec;
use crate::state::{Filters, Pagination, SortEntry, TableStore};
use crate::sync::UrlSync;

/// Everything a render of the table and its toolbar needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayState {
    /// State bundle for the controlled table display.
    pub table: ControlledState,
    /// Text shown in the search box. Runs ahead of the committed title filter
    /// while a search commit is pending.
    pub search: String,
    /// A typed search has not been committed to the title filter yet.
    pub search_pending: bool,
    pub filters: Filters,
    pub sort: Option<SortEntry>,
    pub pagination: Pagination,
    /// Drives the "reset filters" control.
    pub has_active_filters: bool,
}

/// A mounted, URL-synced table view.
///
/// Mounting hydrates a fresh store from the location before any handler is
/// reachable, then installs the URL sync. The URL is not rewritten on mount;
/// the first effective change normalizes it.
pub struct TableView {
    codec: QueryCodec,
    store: TableStore,
    location: Arc<dyn Location>,
    sync: UrlSync,
    adapter: TableAdapter,
}

impl TableView {
    pub fn mount(config: &TableViewConfig, location: Arc<dyn Location>) -> Self {
        let codec = QueryCodec::from_config(config);
        let store = TableStore::from_config(config);

        let search = location.search();
        store.apply_url_state(codec.decode_str(&search));
        log::debug!("table view mounted from ?{search}");

        let sync = UrlSync::attach(&store, codec, Arc::clone(&location));
        let adapter = TableAdapter::new(store.clone(), config.search_debounce);

        Self {
            codec,
            store,
            location,
            sync,
            adapter,
        }
    }

    pub fn store(&self) -> &TableStore {
        &self.store
    }

    pub fn change_handlers(&self) -> &TableAdapter {
        &self.adapter
    }

    pub fn display_state(&self) -> DisplayState {
        let search = self.adapter.search_value();
        let search_pending = self.adapter.is_search_pending();
        self.store.read(|state| DisplayState {
            table: ControlledState::project(state),
            search,
            search_pending,
            filters: state.filters.clone(),
            sort: state.sort.clone(),
            pagination: state.pagination,
            has_active_filters: !state.filters.is_empty(),
        })
    }

    /// Re-reads the location after back/forward navigation.
    ///
    /// A pending search commit is dropped so it cannot overwrite the restored
    /// title. Column visibility and row selection are kept.
    pub fn on_location_change(&self) {
        if !self.is_mounted() {
            return;
        }
        if self.adapter.cancel_pending() {
            log::debug!("location changed, dropping pending search");
        }
        let search = self.location.search();
        log::debug!("re-hydrating from ?{search}");
        self.store.apply_url_state(self.codec.decode_str(&search));
    }

    /// Cancels any pending search commit and stops URL writes. Idempotent.
    pub fn unmount(&self) {
        self.adapter.cancel_pending();
        if self.sync.detach() {
            log::debug!("table view unmounted");
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.sync.is_attached()
    }
}

impl Drop for TableView {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl fmt::Debug for TableView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableView")
            .field("store", &self.store)
            .field("sync", &self.sync)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::MemoryLocation;
    use crate::state::FilterKey;

    fn mount(query: &str) -> (TableView, MemoryLocation) {
        let location = MemoryLocation::new(query);
        let view = TableView::mount(&TableViewConfig::default(), Arc::new(location.clone()));
        (view, location)
    }

    #[test]
    fn test_mount_hydrates_without_writing() {
        let (view, location) = mount("?status=done&status=todo&sort=title:desc&page=2");

        let display = view.display_state();
        assert_eq!(display.pagination, Pagination::new(1, 10));
        assert_eq!(display.sort, Some(SortEntry::desc("title")));
        assert_eq!(display.filters.options(FilterKey::Status).map(|s| s.len()), Some(2));
        assert!(display.has_active_filters);
        assert_eq!(location.writes(), 0);
    }

    #[test]
    fn test_first_change_normalizes_url() {
        let (view, location) = mount("page=abc&sort=bogus");
        assert_eq!(view.display_state().pagination, Pagination::new(0, 10));

        view.store().set_page(1);
        assert_eq!(location.search(), "page=2");
    }

    #[test]
    fn test_unmount_stops_writes() {
        let (view, location) = mount("");
        view.unmount();
        assert!(!view.is_mounted());

        view.change_handlers().on_search_input("late");
        view.store().set_page(5);
        assert_eq!(location.writes(), 0);
    }

    #[test]
    fn test_display_search_defaults_to_committed_title() {
        let (view, _location) = mount("title=cover");
        let display = view.display_state();
        assert_eq!(display.search, "cover");
        assert!(!display.search_pending);
    }

    #[test]
    fn test_location_change_keeps_local_state() {
        let (view, location) = mount("");
        view.store().set_row_selection(["MEM-1001".to_string()].into());
        view.store().set_page(2);
        view.store().set_page(4);

        location.push("page=2");
        view.on_location_change();

        let state = view.store().snapshot();
        assert_eq!(state.pagination.page_index, 1);
        assert!(state.row_selection.contains("MEM-1001"));
    }
}
