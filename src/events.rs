use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{App, AppMode, PickPurpose};
use crate::digest::{supported_algorithms, AlgorithmMode};
use crate::ui::BrowserAction;

/// Wait up to 100ms for terminal input and apply it
pub fn handle_events(app: &mut App) -> Result<()> {
    if !event::poll(Duration::from_millis(100))? {
        return Ok(());
    }
    match event::read()? {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(app, key),
        Event::Paste(text) => handle_paste(app, &text),
        _ => {}
    }
    Ok(())
}

pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ctrl+C quits from every mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.mode {
        AppMode::Normal => handle_normal_mode(app, key),
        AppMode::Browse(_) => handle_browse_mode(app, key),
        AppMode::EditDigest => handle_edit_digest(app, key),
        AppMode::SelectAlgorithm => handle_algorithm_select(app, key),
    }
}

/// Bracketed paste goes into the digest input from normal or edit mode
pub fn handle_paste(app: &mut App, text: &str) {
    if matches!(app.mode, AppMode::Normal | AppMode::EditDigest) {
        app.push_input(text);
        app.message = "Pasted into expected digest".to_string();
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('o') => app.open_browser(PickPurpose::DigestFile),
        KeyCode::Enter | KeyCode::Char('d') => app.start_digest(),
        KeyCode::Char('c') => app.open_browser(PickPurpose::CompareFirst),
        KeyCode::Char('v') => app.open_browser(PickPurpose::VerifyFile),
        KeyCode::Char('i') => {
            app.mode = AppMode::EditDigest;
            app.message = "Type or paste the expected digest (Enter/Esc: done, Ctrl+U: clear)".to_string();
        }
        KeyCode::Char('a') => match app.algorithm_mode {
            AlgorithmMode::Fixed(id) => {
                app.message = format!("Algorithm is fixed to {} (--md5-only)", id);
            }
            AlgorithmMode::Selectable(_) => {
                app.mode = AppMode::SelectAlgorithm;
                app.message = "Select algorithm (↑/↓, Enter, Esc)".to_string();
            }
        },
        KeyCode::Char('?') => {
            app.message =
                "o: choose file  Enter: digest  a: algorithm  i: expected digest  c: compare files  v: verify  q: quit"
                    .to_string();
        }
        _ => {}
    }
}

fn handle_browse_mode(app: &mut App, key: KeyEvent) {
    let AppMode::Browse(purpose) = &app.mode else {
        return;
    };
    let purpose = purpose.clone();
    match app.browser.handle_key(key.code) {
        BrowserAction::Stay => {}
        BrowserAction::Chosen(path) => app.finish_pick(purpose, Some(path)),
        BrowserAction::Cancelled => app.finish_pick(purpose, None),
    }
}

fn handle_edit_digest(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Esc => {
            app.mode = AppMode::Normal;
            app.message = if app.expected_input.is_empty() {
                "Expected digest cleared".to_string()
            } else {
                format!("Expected digest set ({} characters)", app.expected_input.chars().count())
            };
        }
        KeyCode::Backspace => {
            app.expected_input.pop();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.expected_input.clear();
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.expected_input.push(c);
        }
        _ => {}
    }
}

fn handle_algorithm_select(app: &mut App, key: KeyEvent) {
    let count = supported_algorithms().len();
    match key.code {
        KeyCode::Esc => {
            app.mode = AppMode::Normal;
            app.message = "Algorithm unchanged".to_string();
        }
        KeyCode::Up => {
            let i = match app.algorithm_list.selected() {
                Some(0) | None => count - 1,
                Some(i) => i - 1,
            };
            app.algorithm_list.select(Some(i));
        }
        KeyCode::Down => {
            let i = match app.algorithm_list.selected() {
                Some(i) if i + 1 < count => i + 1,
                _ => 0,
            };
            app.algorithm_list.select(Some(i));
        }
        KeyCode::Enter => app.select_algorithm(),
        _ => {}
    }
}
