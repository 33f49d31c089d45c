//! Help popup widget with context-sensitive key descriptions.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::tui::state::Tab;

/// Renders the help popup centered on screen with scroll support.
pub fn render_help(frame: &mut Frame, area: Rect, tab: Tab, scroll: &mut usize) {
    // 60% width, 80% height, clamped to 40-80 x 10-30
    let popup_width = (area.width * 60 / 100).clamp(40, 80);
    let popup_height = (area.height * 80 / 100).clamp(10, 30);

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    frame.render_widget(Clear, popup_area);

    let (title, content) = help_content(tab);
    let content_lines = content.len();

    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let chunks = Layout::vertical([
        Constraint::Min(1),    // Content
        Constraint::Length(1), // Footer
    ])
    .split(inner);

    let visible_height = chunks[0].height as usize;
    let max_scroll = content_lines.saturating_sub(visible_height);
    if *scroll > max_scroll {
        *scroll = max_scroll;
    }

    let paragraph = Paragraph::new(content)
        .wrap(Wrap { trim: false })
        .scroll((*scroll as u16, 0))
        .style(Style::default().fg(Color::White));
    frame.render_widget(paragraph, chunks[0]);

    let scroll_info = if max_scroll > 0 {
        format!(" [{}/{}]", *scroll + 1, max_scroll + 1)
    } else {
        String::new()
    };
    let footer = Paragraph::new(Line::from(vec![
        Span::styled("Press ", Style::default().fg(Color::DarkGray)),
        Span::styled("?", Style::default().fg(Color::Yellow)),
        Span::styled(" or ", Style::default().fg(Color::DarkGray)),
        Span::styled("Esc", Style::default().fg(Color::Yellow)),
        Span::styled(" to close, ", Style::default().fg(Color::DarkGray)),
        Span::styled("↑↓", Style::default().fg(Color::Yellow)),
        Span::styled(" to scroll", Style::default().fg(Color::DarkGray)),
        Span::styled(scroll_info, Style::default().fg(Color::DarkGray)),
    ]));
    frame.render_widget(footer, chunks[1]);
}

fn section(title: &'static str) -> Line<'static> {
    Line::from(Span::styled(title, Style::default().fg(Color::Yellow)))
}

/// Returns help title and content lines for the given tab.
fn help_content(tab: Tab) -> (&'static str, Vec<Line<'static>>) {
    let mut lines = vec![
        section("Tabs:"),
        Line::from("1-3       Students, Parents, Teachers tables"),
        Line::from("4         Analysis dashboard"),
        Line::from("Tab       next tab, Shift-Tab previous tab"),
        Line::from(""),
    ];

    let title = match tab {
        Tab::Analysis => {
            lines.extend([
                section("Dashboard:"),
                Line::from("r         reload all series"),
                Line::from("↑↓ j/k    scroll, PgUp/PgDn by 10 lines"),
                Line::from(""),
                Line::from(Span::styled(
                    "Each bar shows the count and its share of the series total.",
                    Style::default().fg(Color::DarkGray),
                )),
                Line::from(Span::styled(
                    "A series that fails to load is marked unavailable.",
                    Style::default().fg(Color::DarkGray),
                )),
            ]);
            "Analysis Help"
        }
        _ => {
            lines.extend([
                section("Table:"),
                Line::from("→ n ] PgDn   next page (10 rows per page)"),
                Line::from("← p [ PgUp   previous page"),
                Line::from("↑↓ j/k       select row, Home first row"),
                Line::from("h / l        scroll columns left / right"),
                Line::from("r            reload the current page"),
                Line::from(""),
                section("Cells:"),
                Line::from("N/A          no answer"),
                Line::from("Yes / No     boolean answers"),
                Line::from("Dates        shown in local time"),
            ]);
            "Survey Table Help"
        }
    };

    lines.extend([
        Line::from(""),
        section("General:"),
        Line::from("?  F1     this help"),
        Line::from("q         quit (with confirmation), Ctrl-C quits at once"),
    ]);
    (title, lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_depends_on_tab() {
        assert_eq!(help_content(Tab::Students).0, "Survey Table Help");
        assert_eq!(help_content(Tab::Teachers).0, "Survey Table Help");
        assert_eq!(help_content(Tab::Analysis).0, "Analysis Help");
    }
}
