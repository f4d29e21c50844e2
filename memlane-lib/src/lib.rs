//! Table view state synchronization for the memories dashboard.
//!
//! Keeps a table's sort, filter, pagination and selection state consistent
//! between an injectable [`TableStore`](state::TableStore), the URL query
//! string of the current location, and a controlled table display.

pub mod adapter;
pub mod config;
pub mod debounce;
pub mod error;
pub mod location;
pub mod model;
pub mod query;
pub mod rows;
pub mod state;
pub mod sync;

mod view;

pub use config::TableViewConfig;
pub use view::*;
