//! Table view state and its observable store.
//!
//! - [`TableViewState`] - the canonical state of one table view
//! - [`Filters`] - active column filters, never holding empty values
//! - [`TableStore`] - the single source of truth with change notification

mod filter;
mod store;
mod view_state;

pub use filter::{FilterKey, FilterKind, FilterValue, Filters};
pub use store::{StoreChange, SubscriptionId, TableStore};
pub use view_state::{Pagination, PaginationUpdate, SortEntry, TableViewState, UrlState};
