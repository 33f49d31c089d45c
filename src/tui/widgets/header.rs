//! Header widget showing tabs and the data source.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::state::{AppState, Tab};
use crate::tui::style::Styles;

/// Renders the header bar.
pub fn render_header(frame: &mut Frame, area: Rect, state: &AppState, loading: bool) {
    let chunks = Layout::horizontal([
        Constraint::Length(16), // Title
        Constraint::Min(40),    // Tabs
        Constraint::Length(36), // Source / loading
    ])
    .split(area);

    frame.render_widget(
        Paragraph::new(" Survey Portal ").style(Styles::header()),
        chunks[0],
    );

    let tabs: Vec<Span> = Tab::all()
        .iter()
        .enumerate()
        .flat_map(|(i, tab)| {
            let style = if *tab == state.current_tab {
                Styles::tab_active()
            } else {
                Styles::tab_inactive()
            };
            vec![
                Span::styled(format!(" {}:", i + 1), Styles::dim()),
                Span::styled(format!("{} ", tab.name()), style),
            ]
        })
        .collect();
    frame.render_widget(
        Paragraph::new(Line::from(tabs)).style(Styles::header()),
        chunks[1],
    );

    let right = if loading {
        Line::from(Span::styled("loading ", Styles::loading()))
    } else {
        Line::from(format!("{} ", state.store_label))
    };
    frame.render_widget(
        Paragraph::new(right)
            .alignment(Alignment::Right)
            .style(Styles::header()),
        chunks[2],
    );
}
