//! survey-portal - Survey response store, forms, table viewer and dashboard.
//!
//! This library provides the core functionality shared between:
//! - `survey-view` - interactive TUI viewer for the response tables
//! - `survey-submit` - validates and stores one survey response

pub mod analytics;
pub mod fmt;
pub mod model;
pub mod store;
pub mod survey;
pub mod tui;
pub mod view;
