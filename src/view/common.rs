//! UI-agnostic view model types.
//!
//! These types represent presentation data without any dependency on a specific
//! rendering framework. The TUI maps them to ratatui widgets, `--dump` prints
//! them as plain text.

use super::controller::ViewState;
use crate::fmt::format_cell;

/// Column width bounds, in characters.
const MIN_WIDTH: usize = 4;
const MAX_WIDTH: usize = 32;

/// Status of the table body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableStatus {
    /// Rows (possibly none) are shown.
    Ready,
    /// A fetch is outstanding; the previous contents stay visible.
    Loading,
    /// The last fetch failed; the table is empty.
    Failed(String),
}

/// One table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRow {
    pub id: String,
    pub cells: Vec<String>,
}

/// Complete table ready to be rendered by any frontend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableViewModel {
    pub title: String,
    pub headers: Vec<String>,
    pub widths: Vec<u16>,
    pub rows: Vec<ViewRow>,
    pub pager: String,
    pub has_prev: bool,
    pub has_next: bool,
    pub status: TableStatus,
}

impl TableViewModel {
    /// Builds headers from the column list and one cell per column per row.
    pub fn from_state(state: &ViewState) -> Self {
        let headers: Vec<String> = state.columns.iter().map(|c| c.header_label()).collect();
        let rows: Vec<ViewRow> = state
            .rows
            .iter()
            .map(|row| ViewRow {
                id: row.id(),
                cells: state
                    .columns
                    .iter()
                    .map(|col| format_cell(row.value(&col.raw_name), col))
                    .collect(),
            })
            .collect();

        let widths = headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let widest = rows
                    .iter()
                    .filter_map(|r| r.cells.get(i))
                    .map(|c| c.chars().count())
                    .chain(std::iter::once(h.chars().count()))
                    .max()
                    .unwrap_or(0);
                widest.clamp(MIN_WIDTH, MAX_WIDTH) as u16
            })
            .collect();

        let status = match (&state.last_error, state.is_loading) {
            (_, true) => TableStatus::Loading,
            (Some(e), false) => TableStatus::Failed(e.clone()),
            (None, false) => TableStatus::Ready,
        };

        Self {
            title: format!("{} Data", state.kind.title()),
            headers,
            widths,
            rows,
            pager: state.window.label(),
            has_prev: state.window.has_prev(),
            has_next: state.window.has_next(),
            status,
        }
    }

    /// Plain-text rendering: title, header, rows, pager.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.title);
        out.push('\n');
        if let TableStatus::Failed(e) = &self.status {
            out.push_str(&format!("Error: {}\n", e));
        }
        if !self.headers.is_empty() {
            out.push_str(&self.text_line(&self.headers));
            let rule: Vec<String> = self
                .widths
                .iter()
                .map(|w| "-".repeat(*w as usize))
                .collect();
            out.push_str(&rule.join("-+-"));
            out.push('\n');
        }
        for row in &self.rows {
            out.push_str(&self.text_line(&row.cells));
        }
        out.push_str(&self.pager);
        out.push('\n');
        out
    }

    fn text_line(&self, cells: &[String]) -> String {
        let parts: Vec<String> = cells
            .iter()
            .zip(&self.widths)
            .map(|(cell, w)| pad(cell, *w as usize))
            .collect();
        let mut line = parts.join(" | ");
        line.truncate(line.trim_end().len());
        line.push('\n');
        line
    }
}

/// Pads or truncates `s` to exactly `width` characters.
fn pad(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len > width {
        let mut t: String = s.chars().take(width.saturating_sub(1)).collect();
        t.push('~');
        t
    } else {
        format!("{}{}", s, " ".repeat(width - len))
    }
}
