//! Glue between the store and a controlled table display.
//!
//! The display receives a [`ControlledState`] as input and reports changes
//! through [`TableAdapter`]'s `on_*_change` handlers, each taking an
//! [`Updater`]: either a replacement value or a function of the old value.

mod controlled;
mod table;

pub use controlled::{
    ColumnFilter, ColumnFilterValue, ColumnSort, ControlledState, RowSelectionState, Updater,
    VisibilityState,
};
pub use table::TableAdapter;
