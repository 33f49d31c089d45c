//! Main TUI application.

use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{info, warn};

use crate::analytics::{AnalyticsReport, fetch_report};
use crate::model::EntityKind;
use crate::store::RecordStore;
use crate::view::TableViewController;

use super::event::{Event, EventHandler};
use super::input::{KeyAction, handle_key};
use super::render::render;
use super::state::{AnalyticsState, AppState};

/// Main TUI application.
pub struct App {
    controller: TableViewController,
    state: AppState,
    analytics_rx: Option<Receiver<AnalyticsReport>>,
    initial_page: u64,
    should_quit: bool,
}

impl App {
    /// Creates a new App showing `kind` at `page` once started.
    pub fn new(store: Arc<dyn RecordStore>, kind: EntityKind, page: u64) -> Self {
        let label = store.describe();
        Self {
            controller: TableViewController::new(store),
            state: AppState::new(label, kind),
            analytics_rx: None,
            initial_page: page,
            should_quit: false,
        }
    }

    /// Runs the TUI application.
    pub fn run(mut self, tick_rate: Duration) -> io::Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let events = EventHandler::new(tick_rate);

        // Initial data fetch
        let kind = self.state.current_tab.kind().unwrap_or_default();
        self.controller.open(kind, self.initial_page);

        loop {
            terminal.draw(|frame| render(frame, &mut self.state, self.controller.state()))?;

            match events.next() {
                Ok(Event::Tick) => self.poll(),
                Ok(Event::Key(key)) => {
                    let action = handle_key(&mut self.state, key);
                    self.dispatch(action);
                    // Pick up fetches that finished while the key was handled.
                    self.poll();
                }
                Ok(Event::Resize) => {}
                Err(_) => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        Ok(())
    }

    fn dispatch(&mut self, action: KeyAction) {
        match action {
            KeyAction::None => {}
            KeyAction::Quit => self.should_quit = true,
            KeyAction::SelectKind(kind) => {
                self.state.reset_page_view();
                self.controller.select_kind(kind);
            }
            KeyAction::NextPage => {
                if self.controller.next_page() {
                    self.state.reset_page_view();
                }
            }
            KeyAction::PrevPage => {
                if self.controller.prev_page() {
                    self.state.reset_page_view();
                }
            }
            KeyAction::Refresh => self.controller.refresh(),
            KeyAction::ShowAnalytics => {
                if matches!(self.state.analytics, AnalyticsState::Idle) {
                    self.load_analytics();
                }
            }
            KeyAction::LoadAnalytics => self.load_analytics(),
        }
    }

    fn poll(&mut self) {
        self.controller.poll();

        let Some(rx) = &self.analytics_rx else {
            return;
        };
        match rx.try_recv() {
            Ok(report) => {
                info!(
                    series = report.series.len(),
                    unavailable = report.unavailable(),
                    "dashboard loaded"
                );
                self.state.analytics = AnalyticsState::Ready(report);
                self.analytics_rx = None;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                self.state.analytics = AnalyticsState::Idle;
                self.state.status_message = Some("Dashboard load failed".to_string());
                self.analytics_rx = None;
            }
        }
    }

    /// Loads every dashboard series on a background thread. A reload in
    /// flight is replaced; its receiver is dropped and its result ignored.
    fn load_analytics(&mut self) {
        let (tx, rx) = mpsc::channel();
        let store = Arc::clone(self.controller.store());
        let spawned = thread::Builder::new()
            .name("analytics".to_string())
            .spawn(move || {
                let report = fetch_report(store.as_ref());
                let _ = tx.send(report);
            });

        match spawned {
            Ok(_) => {
                self.state.analytics = AnalyticsState::Loading;
                self.state.analysis_scroll = 0;
                self.analytics_rx = Some(rx);
            }
            Err(e) => {
                warn!(error = %e, "cannot start dashboard load");
                self.state.status_message = Some(format!("Cannot load dashboard: {}", e));
            }
        }
    }

    #[cfg(test)]
    fn wait_analytics(&mut self, timeout: Duration) {
        let deadline = std::time::Instant::now() + timeout;
        while matches!(self.state.analytics, AnalyticsState::Loading)
            && std::time::Instant::now() < deadline
        {
            thread::sleep(Duration::from_millis(5));
            self.poll();
        }
    }
}
