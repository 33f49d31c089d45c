//! Terminal User Interface for the survey viewer.
//!
//! Tabs 1-3 page through the survey response tables, tab 4 shows the
//! analytics dashboard.

mod app;
mod event;
mod input;
mod render;
mod state;
mod style;
mod widgets;

pub use app::App;
pub use state::{AppState, Tab};
