//! Paginated table viewer core.
//!
//! [`controller::TableViewController`] owns the view state and drives fetches;
//! [`common::TableViewModel`] turns that state into framework-agnostic rows of
//! formatted text. The TUI (and the plain-text dump) render the view model.

pub mod common;
pub mod controller;
pub mod pagination;

pub use common::{TableStatus, TableViewModel, ViewRow};
pub use controller::{
    FetchOutcome, PageData, TableViewController, ViewError, ViewState, fetch_page,
};
pub use pagination::{PAGE_SIZE, PageWindow};
