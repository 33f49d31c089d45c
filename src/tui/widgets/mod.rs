//! TUI widgets for the survey viewer.

mod dashboard;
mod header;
mod help;
mod quit_confirm;
mod table;

pub use dashboard::render_dashboard;
pub use header::render_header;
pub use help::render_help;
pub use quit_confirm::render_quit_confirm;
pub use table::render_table;
