//! Survey table widget for the Students, Parents and Teachers tabs.
//!
//! Layout: one status line (loading indicator or error banner), the table,
//! and the pager. The table keeps showing the previous page while a fetch is
//! outstanding.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Row, Table, TableState};

use crate::tui::state::AppState;
use crate::tui::style::Styles;
use crate::view::{TableStatus, TableViewModel};

pub fn render_table(frame: &mut Frame, area: Rect, vm: &TableViewModel, state: &mut AppState) {
    let chunks = Layout::vertical([
        Constraint::Length(1), // Status
        Constraint::Min(3),    // Table
        Constraint::Length(1), // Pager
    ])
    .split(area);

    render_status(frame, chunks[0], &vm.status);

    // Clamp selection and horizontal scroll to what the page has.
    if state.selected >= vm.rows.len() {
        state.selected = vm.rows.len().saturating_sub(1);
    }
    if state.column_offset >= vm.headers.len() {
        state.column_offset = vm.headers.len().saturating_sub(1);
    }
    let skip = state.column_offset;

    let block = Block::default()
        .title(format!(" {} ", vm.title))
        .borders(Borders::ALL)
        .style(Styles::default());

    if vm.headers.is_empty() {
        let text = match vm.status {
            TableStatus::Loading => "Loading...",
            _ => "No data available",
        };
        frame.render_widget(Clear, chunks[1]);
        frame.render_widget(Paragraph::new(text).block(block), chunks[1]);
    } else {
        let header = Row::new(
            vm.headers
                .iter()
                .skip(skip)
                .map(|h| Span::styled(h.clone(), Styles::table_header())),
        )
        .style(Styles::table_header())
        .height(1);

        let rows: Vec<Row> = vm
            .rows
            .iter()
            .map(|vr| Row::new(vr.cells.iter().skip(skip).cloned()).height(1))
            .collect();

        let constraints: Vec<Constraint> = vm
            .widths
            .iter()
            .skip(skip)
            .map(|&w| Constraint::Length(w))
            .collect();

        let table = Table::new(rows, constraints)
            .header(header)
            .block(block)
            .column_spacing(2)
            .row_highlight_style(Styles::selected());

        let mut table_state = TableState::default();
        if !vm.rows.is_empty() {
            table_state.select(Some(state.selected));
        }
        frame.render_widget(Clear, chunks[1]);
        frame.render_stateful_widget(table, chunks[1], &mut table_state);
    }

    render_pager(frame, chunks[2], vm);
}

fn render_status(frame: &mut Frame, area: Rect, status: &TableStatus) {
    let line = match status {
        TableStatus::Ready => Line::from(""),
        TableStatus::Loading => Line::from(Span::styled(" Loading...", Styles::loading())),
        TableStatus::Failed(e) => Line::from(Span::styled(
            format!(" Failed to load data: {}", e),
            Styles::error(),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_pager(frame: &mut Frame, area: Rect, vm: &TableViewModel) {
    let prev_style = if vm.has_prev {
        Styles::help_key()
    } else {
        Styles::dim()
    };
    let next_style = if vm.has_next {
        Styles::help_key()
    } else {
        Styles::dim()
    };
    let line = Line::from(vec![
        Span::styled("< Previous", prev_style),
        Span::styled(format!("   {}   ", vm.pager), Styles::default()),
        Span::styled("Next >", next_style),
    ]);
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}
