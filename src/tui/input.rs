//! Input handling and keybindings.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::state::{AppState, PopupState, Tab};
use crate::model::EntityKind;

/// Result of handling a key event.
#[derive(Debug, PartialEq, Eq)]
pub enum KeyAction {
    /// No action, continue.
    None,
    /// Quit the application.
    Quit,
    /// Show a table tab (always refetches, back to page 1).
    SelectKind(EntityKind),
    NextPage,
    PrevPage,
    /// Refetch the current table page.
    Refresh,
    /// Show the dashboard, loading it on first use.
    ShowAnalytics,
    /// Reload the dashboard series.
    LoadAnalytics,
}

/// Handles key input and updates state.
pub fn handle_key(state: &mut AppState, key: KeyEvent) -> KeyAction {
    match state.popup {
        PopupState::QuitConfirm => handle_quit_confirm(state, key),
        PopupState::Help { .. } => handle_help(state, key),
        PopupState::None => handle_normal_mode(state, key),
    }
}

fn handle_quit_confirm(state: &mut AppState, key: KeyEvent) -> KeyAction {
    match key.code {
        KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('Q') => {
            state.popup = PopupState::None;
            KeyAction::Quit
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            state.popup = PopupState::None;
            KeyAction::Quit
        }
        KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
            state.popup = PopupState::None;
            KeyAction::None
        }
        _ => KeyAction::None,
    }
}

fn handle_help(state: &mut AppState, key: KeyEvent) -> KeyAction {
    let PopupState::Help { scroll } = state.popup else {
        return KeyAction::None;
    };
    // Clamped during render.
    let scroll = match key.code {
        KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') | KeyCode::F(1) => {
            state.popup = PopupState::None;
            return KeyAction::None;
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return KeyAction::Quit;
        }
        KeyCode::Up | KeyCode::Char('k') => scroll.saturating_sub(1),
        KeyCode::Down | KeyCode::Char('j') => scroll.saturating_add(1),
        KeyCode::PageUp => scroll.saturating_sub(10),
        KeyCode::PageDown => scroll.saturating_add(10),
        KeyCode::Home => 0,
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Char('1'..='4') => {
            state.status_message = Some("Close popup (Esc) before switching tabs".to_string());
            scroll
        }
        _ => scroll,
    };
    state.popup = PopupState::Help { scroll };
    KeyAction::None
}

/// Handles keys in normal mode.
fn handle_normal_mode(state: &mut AppState, key: KeyEvent) -> KeyAction {
    state.status_message = None;
    match key.code {
        // Quit
        KeyCode::Char('q') | KeyCode::Char('Q') => {
            state.popup = PopupState::QuitConfirm;
            KeyAction::None
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Quit,

        KeyCode::Char('?') | KeyCode::F(1) => {
            state.popup = PopupState::Help { scroll: 0 };
            KeyAction::None
        }

        // Tabs
        KeyCode::Tab => {
            let tab = state.current_tab.next();
            open_tab(state, tab)
        }
        KeyCode::BackTab => {
            let tab = state.current_tab.prev();
            open_tab(state, tab)
        }
        KeyCode::Char('1') => open_tab(state, Tab::Students),
        KeyCode::Char('2') => open_tab(state, Tab::Parents),
        KeyCode::Char('3') => open_tab(state, Tab::Teachers),
        KeyCode::Char('4') => open_tab(state, Tab::Analysis),

        KeyCode::Char('r') | KeyCode::Char('R') => {
            if state.current_tab == Tab::Analysis {
                KeyAction::LoadAnalytics
            } else {
                KeyAction::Refresh
            }
        }

        // Dashboard scrolling
        KeyCode::Up | KeyCode::Char('k') if state.current_tab == Tab::Analysis => {
            state.analysis_scroll = state.analysis_scroll.saturating_sub(1);
            KeyAction::None
        }
        KeyCode::Down | KeyCode::Char('j') if state.current_tab == Tab::Analysis => {
            state.analysis_scroll = state.analysis_scroll.saturating_add(1);
            KeyAction::None
        }
        KeyCode::PageUp if state.current_tab == Tab::Analysis => {
            state.analysis_scroll = state.analysis_scroll.saturating_sub(10);
            KeyAction::None
        }
        KeyCode::PageDown if state.current_tab == Tab::Analysis => {
            state.analysis_scroll = state.analysis_scroll.saturating_add(10);
            KeyAction::None
        }
        _ if state.current_tab == Tab::Analysis => KeyAction::None,

        // Table rows (clamped during render)
        KeyCode::Up | KeyCode::Char('k') => {
            state.selected = state.selected.saturating_sub(1);
            KeyAction::None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            state.selected = state.selected.saturating_add(1);
            KeyAction::None
        }
        KeyCode::Home => {
            state.selected = 0;
            KeyAction::None
        }

        // Columns
        KeyCode::Char('h') => {
            state.column_offset = state.column_offset.saturating_sub(1);
            KeyAction::None
        }
        KeyCode::Char('l') => {
            state.column_offset = state.column_offset.saturating_add(1);
            KeyAction::None
        }

        // Pages
        KeyCode::Right | KeyCode::PageDown | KeyCode::Char('n') | KeyCode::Char(']') => {
            KeyAction::NextPage
        }
        KeyCode::Left | KeyCode::PageUp | KeyCode::Char('p') | KeyCode::Char('[') => {
            KeyAction::PrevPage
        }

        _ => KeyAction::None,
    }
}

fn open_tab(state: &mut AppState, tab: Tab) -> KeyAction {
    state.switch_tab(tab);
    match tab.kind() {
        Some(kind) => KeyAction::SelectKind(kind),
        None => KeyAction::ShowAnalytics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn state() -> AppState {
        AppState::new("memory", EntityKind::Student)
    }

    #[test]
    fn number_keys_select_kinds() {
        let mut state = state();
        assert_eq!(
            handle_key(&mut state, key(KeyCode::Char('2'))),
            KeyAction::SelectKind(EntityKind::Parent)
        );
        assert_eq!(state.current_tab, Tab::Parents);
        assert_eq!(
            handle_key(&mut state, key(KeyCode::Char('3'))),
            KeyAction::SelectKind(EntityKind::Teacher)
        );
        assert_eq!(
            handle_key(&mut state, key(KeyCode::Char('4'))),
            KeyAction::ShowAnalytics
        );
        assert_eq!(state.current_tab, Tab::Analysis);
    }

    #[test]
    fn reselecting_current_tab_still_refetches() {
        let mut state = state();
        assert_eq!(
            handle_key(&mut state, key(KeyCode::Char('1'))),
            KeyAction::SelectKind(EntityKind::Student)
        );
    }

    #[test]
    fn tab_and_backtab_cycle() {
        let mut state = state();
        assert_eq!(
            handle_key(&mut state, key(KeyCode::BackTab)),
            KeyAction::ShowAnalytics
        );
        assert_eq!(
            handle_key(&mut state, key(KeyCode::Tab)),
            KeyAction::SelectKind(EntityKind::Student)
        );
    }

    #[test]
    fn page_keys() {
        let mut state = state();
        assert_eq!(handle_key(&mut state, key(KeyCode::Right)), KeyAction::NextPage);
        assert_eq!(handle_key(&mut state, key(KeyCode::Char('n'))), KeyAction::NextPage);
        assert_eq!(handle_key(&mut state, key(KeyCode::Left)), KeyAction::PrevPage);
        assert_eq!(handle_key(&mut state, key(KeyCode::PageUp)), KeyAction::PrevPage);
        assert_eq!(handle_key(&mut state, key(KeyCode::Char('r'))), KeyAction::Refresh);
    }

    #[test]
    fn analysis_tab_ignores_paging_and_refreshes_report() {
        let mut state = state();
        state.switch_tab(Tab::Analysis);
        assert_eq!(handle_key(&mut state, key(KeyCode::Right)), KeyAction::None);
        assert_eq!(
            handle_key(&mut state, key(KeyCode::Char('r'))),
            KeyAction::LoadAnalytics
        );
        let _ = handle_key(&mut state, key(KeyCode::Down));
        assert_eq!(state.analysis_scroll, 1);
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn row_selection_moves() {
        let mut state = state();
        let _ = handle_key(&mut state, key(KeyCode::Down));
        let _ = handle_key(&mut state, key(KeyCode::Char('j')));
        assert_eq!(state.selected, 2);
        let _ = handle_key(&mut state, key(KeyCode::Up));
        assert_eq!(state.selected, 1);
        let _ = handle_key(&mut state, key(KeyCode::Home));
        assert_eq!(state.selected, 0);
        let _ = handle_key(&mut state, key(KeyCode::Up));
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn quit_confirmation_quits_on_enter() {
        let mut state = state();

        let _ = handle_key(&mut state, key(KeyCode::Char('q')));
        assert_eq!(state.popup, PopupState::QuitConfirm);

        let action = handle_key(&mut state, key(KeyCode::Enter));
        assert_eq!(action, KeyAction::Quit);
        assert_eq!(state.popup, PopupState::None);
    }

    #[test]
    fn quit_confirmation_cancels_on_esc() {
        let mut state = state();
        let _ = handle_key(&mut state, key(KeyCode::Char('q')));
        assert_eq!(handle_key(&mut state, key(KeyCode::Esc)), KeyAction::None);
        assert_eq!(state.popup, PopupState::None);
    }

    #[test]
    fn ctrl_c_quits_immediately() {
        let mut state = state();
        assert_eq!(handle_key(&mut state, ctrl('c')), KeyAction::Quit);
    }

    #[test]
    fn tab_switch_blocked_when_help_open() {
        let mut state = state();
        let _ = handle_key(&mut state, key(KeyCode::Char('?')));
        assert!(state.any_popup_open());

        assert_eq!(handle_key(&mut state, key(KeyCode::Char('2'))), KeyAction::None);
        assert_eq!(state.current_tab, Tab::Students);
        assert!(state.status_message.is_some());

        let _ = handle_key(&mut state, key(KeyCode::Down));
        assert_eq!(state.popup, PopupState::Help { scroll: 1 });

        let _ = handle_key(&mut state, key(KeyCode::Esc));
        assert!(!state.any_popup_open());

        assert_eq!(
            handle_key(&mut state, key(KeyCode::Char('2'))),
            KeyAction::SelectKind(EntityKind::Parent)
        );
        assert!(state.status_message.is_none());
    }
}
