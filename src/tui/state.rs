//! Application state management.

use crate::analytics::AnalyticsReport;
use crate::model::EntityKind;

/// Available tabs in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    Students,
    Parents,
    Teachers,
    Analysis,
}

impl Tab {
    pub fn all() -> &'static [Tab] {
        &[Tab::Students, Tab::Parents, Tab::Teachers, Tab::Analysis]
    }

    /// Returns the display name of the tab.
    pub fn name(&self) -> &'static str {
        match self {
            Tab::Students => "Students",
            Tab::Parents => "Parents",
            Tab::Teachers => "Teachers",
            Tab::Analysis => "Analysis",
        }
    }

    /// Returns the next tab.
    pub fn next(&self) -> Tab {
        match self {
            Tab::Students => Tab::Parents,
            Tab::Parents => Tab::Teachers,
            Tab::Teachers => Tab::Analysis,
            Tab::Analysis => Tab::Students,
        }
    }

    /// Returns the previous tab.
    pub fn prev(&self) -> Tab {
        match self {
            Tab::Students => Tab::Analysis,
            Tab::Parents => Tab::Students,
            Tab::Teachers => Tab::Parents,
            Tab::Analysis => Tab::Teachers,
        }
    }

    /// Entity kind shown by a table tab; `None` for the dashboard.
    pub fn kind(&self) -> Option<EntityKind> {
        match self {
            Tab::Students => Some(EntityKind::Student),
            Tab::Parents => Some(EntityKind::Parent),
            Tab::Teachers => Some(EntityKind::Teacher),
            Tab::Analysis => None,
        }
    }

    pub fn for_kind(kind: EntityKind) -> Tab {
        match kind {
            EntityKind::Student => Tab::Students,
            EntityKind::Parent => Tab::Parents,
            EntityKind::Teacher => Tab::Teachers,
        }
    }
}

/// Active popup state. Only one popup can be open at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PopupState {
    /// No popup is open.
    #[default]
    None,
    /// Help popup with scroll offset.
    Help { scroll: usize },
    /// Quit confirmation dialog.
    QuitConfirm,
}

impl PopupState {
    /// Returns true if any popup is open (excluding None).
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Dashboard data as last loaded.
#[derive(Debug, Clone, Default)]
pub enum AnalyticsState {
    /// Not requested yet.
    #[default]
    Idle,
    Loading,
    Ready(AnalyticsReport),
}

/// TUI state that is not owned by the table view controller.
#[derive(Debug, Default)]
pub struct AppState {
    pub current_tab: Tab,
    pub popup: PopupState,
    /// Selected row on the visible page. Clamped during render.
    pub selected: usize,
    /// First visible column of the table.
    pub column_offset: usize,
    /// Vertical scroll of the dashboard.
    pub analysis_scroll: usize,
    pub analytics: AnalyticsState,
    /// One-shot message shown in the footer.
    pub status_message: Option<String>,
    /// Backend description for the header.
    pub store_label: String,
}

impl AppState {
    pub fn new(store_label: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            current_tab: Tab::for_kind(kind),
            store_label: store_label.into(),
            ..Self::default()
        }
    }

    /// Switches tab and resets per-page view state.
    pub fn switch_tab(&mut self, tab: Tab) {
        if self.current_tab != tab {
            self.current_tab = tab;
            self.reset_page_view();
        }
    }

    /// Forgets row selection and horizontal scroll (new page or new table).
    pub fn reset_page_view(&mut self) {
        self.selected = 0;
        self.column_offset = 0;
    }

    pub fn any_popup_open(&self) -> bool {
        self.popup.is_open()
    }
}
