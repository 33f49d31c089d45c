//! Analytics dashboard widget (Analysis tab).
//!
//! Every series is drawn as a labelled bar list:
//! `label  ████████  value (pct%)`. Bars are scaled to the largest value of
//! their own series.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::analytics::{AnalyticsReport, SeriesReport};
use crate::tui::state::{AnalyticsState, AppState};
use crate::tui::style::Styles;

const TITLE: &str = " Survey Analytics Dashboard ";
const MAX_LABEL: usize = 28;

pub fn render_dashboard(frame: &mut Frame, area: Rect, state: &mut AppState) {
    let block = Block::default()
        .title(TITLE)
        .borders(Borders::ALL)
        .style(Styles::default());
    let inner = block.inner(area);

    let lines = match &state.analytics {
        AnalyticsState::Idle => vec![Line::from(Span::styled(
            "Press r to load the dashboard",
            Styles::dim(),
        ))],
        AnalyticsState::Loading => vec![Line::from(Span::styled("Loading...", Styles::loading()))],
        AnalyticsState::Ready(report) => {
            // Label, spacing and the "value (pct%)" suffix take about 45 columns.
            let bar_width = (inner.width as usize).saturating_sub(45).clamp(5, 60);
            report_lines(report, bar_width)
        }
    };

    let max_scroll = lines.len().saturating_sub(inner.height as usize);
    if state.analysis_scroll > max_scroll {
        state.analysis_scroll = max_scroll;
    }

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .scroll((state.analysis_scroll as u16, 0)),
        area,
    );
}

pub(crate) fn report_lines(report: &AnalyticsReport, bar_width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (i, series) in report.series.iter().enumerate() {
        if i > 0 {
            lines.push(Line::from(""));
        }
        lines.extend(series_lines(series, bar_width));
    }
    lines
}

fn series_lines(series: &SeriesReport, bar_width: usize) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(vec![
        Span::styled(series.title.to_string(), Styles::section_header()),
        Span::styled(format!("  ({})", series.chart), Styles::dim()),
    ])];

    let points = match &series.points {
        Ok(points) => points,
        Err(e) => {
            lines.push(Line::from(Span::styled(
                format!("  unavailable: {}", e),
                Styles::error(),
            )));
            return lines;
        }
    };
    if points.is_empty() {
        lines.push(Line::from(Span::styled("  no responses yet", Styles::dim())));
        return lines;
    }

    let label_width = points
        .iter()
        .map(|p| p.label.chars().count())
        .max()
        .unwrap_or(0)
        .min(MAX_LABEL);
    let max_value = points.iter().map(|p| p.value).max().unwrap_or(0);

    for p in points {
        let filled = if max_value == 0 {
            0
        } else {
            ((p.value as f64 / max_value as f64) * bar_width as f64).round() as usize
        };
        let label: String = p.label.chars().take(label_width).collect();
        lines.push(Line::from(vec![
            Span::raw(format!("  {:<width$}  ", label, width = label_width)),
            Span::styled("█".repeat(filled), Styles::bar()),
            Span::raw(" ".repeat(bar_width - filled)),
            Span::raw(format!("  {}: {} ({}%)", p.label, p.value, p.percentage)),
        ]));
    }
    lines
}
