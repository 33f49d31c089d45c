//! Main rendering logic for TUI.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::view::{TableViewModel, ViewState};

use super::state::{AnalyticsState, AppState, PopupState, Tab};
use super::style::Styles;
use super::widgets::{
    render_dashboard, render_header, render_help, render_quit_confirm, render_table,
};

/// Main render function.
pub fn render(frame: &mut Frame, state: &mut AppState, view: &ViewState) {
    let area = frame.area();

    let chunks = Layout::vertical([
        Constraint::Length(1), // Header
        Constraint::Min(5),    // Content area
        Constraint::Length(1), // Footer
    ])
    .split(area);

    let loading = match state.current_tab {
        Tab::Analysis => matches!(state.analytics, AnalyticsState::Loading),
        _ => view.is_loading,
    };
    render_header(frame, chunks[0], state, loading);

    render_content(frame, chunks[1], state, view);

    render_footer(frame, chunks[2], state);

    // Popups are rendered last to overlay everything
    let tab = state.current_tab;
    match &mut state.popup {
        PopupState::Help { scroll } => render_help(frame, area, tab, scroll),
        PopupState::QuitConfirm => render_quit_confirm(frame, area),
        PopupState::None => {}
    }
}

/// Renders content based on current tab.
fn render_content(frame: &mut Frame, area: Rect, state: &mut AppState, view: &ViewState) {
    match state.current_tab {
        Tab::Analysis => render_dashboard(frame, area, state),
        _ => {
            let vm = TableViewModel::from_state(view);
            render_table(frame, area, &vm, state);
        }
    }
}

fn render_footer(frame: &mut Frame, area: Rect, state: &AppState) {
    let line = match &state.status_message {
        Some(msg) => Line::from(Span::styled(format!(" {}", msg), Styles::error())),
        None => {
            let hint = match state.current_tab {
                Tab::Analysis => " 1-4 tabs  ↑↓ scroll  r reload  ? help  q quit",
                _ => " 1-4 tabs  ←→ pages  ↑↓ rows  h/l columns  r reload  ? help  q quit",
            };
            Line::from(Span::styled(hint, Styles::help()))
        }
    };
    frame.render_widget(Paragraph::new(line).style(Styles::default()), area);
}
