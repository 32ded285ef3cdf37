//! Keyboard input dispatch: overlays → global keys → form keys.

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use tradeboard_core::pipeline::Action;

use crate::app::{AppState, Overlay};

/// Handle a key event.
pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.running = false;
        return;
    }

    // 1. Overlays consume input first.
    match app.overlay {
        Overlay::Prompt(_) | Overlay::Help => {
            app.overlay = Overlay::None;
            return;
        }
        Overlay::ErrorHistory => {
            handle_error_overlay(app, key);
            return;
        }
        Overlay::FileInput => {
            handle_file_input(app, key);
            return;
        }
        Overlay::None => {}
    }

    // 2. Global keys.
    match key.code {
        KeyCode::Char('q') => app.running = false,
        KeyCode::Char('r') | KeyCode::Enter => {
            app.dispatch(Action::Run);
        }
        KeyCode::Char('u') => {
            app.dispatch(Action::Upload);
        }
        KeyCode::Char('o') => {
            app.path_input = app
                .upload_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            app.overlay = Overlay::FileInput;
        }
        KeyCode::Char('m') => app.toggle_mode(),
        KeyCode::Char('e') => {
            app.error_scroll = 0;
            app.overlay = Overlay::ErrorHistory;
        }
        KeyCode::Char('x') => app.export_ledger(),
        KeyCode::Char('?') => app.overlay = Overlay::Help,

        // 3. Form and ledger navigation.
        KeyCode::Char('j') | KeyCode::Down | KeyCode::Tab => app.next_field(),
        KeyCode::Char('k') | KeyCode::Up | KeyCode::BackTab => app.prev_field(),
        KeyCode::Char('l') | KeyCode::Right | KeyCode::Char('+') => app.adjust_field(1),
        KeyCode::Char('h') | KeyCode::Left | KeyCode::Char('-') => app.adjust_field(-1),
        KeyCode::PageDown => app.scroll_ledger(10),
        KeyCode::PageUp => app.scroll_ledger(-10),
        _ => {}
    }
}

fn handle_error_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('e') => {
            app.overlay = Overlay::None;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if app.error_scroll + 1 < app.error_history.len() {
                app.error_scroll += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.error_scroll = app.error_scroll.saturating_sub(1);
        }
        _ => {}
    }
}

fn handle_file_input(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.overlay = Overlay::None;
            app.path_input.clear();
        }
        KeyCode::Enter => {
            let path = app.path_input.trim().to_string();
            app.overlay = Overlay::None;
            app.path_input.clear();
            if !path.is_empty() {
                app.choose_file(PathBuf::from(path));
            }
        }
        KeyCode::Backspace => {
            app.path_input.pop();
        }
        KeyCode::Char(c) => {
            app.path_input.push(c);
        }
        _ => {}
    }
}
