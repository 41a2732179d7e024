use crate::app::{App, InputMode};
use crate::config::key_matches;
use anyhow::Result;
use crossterm::event::{self, Event as CEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

/// Terminal events
#[derive(Debug, Clone, Copy)]
pub enum Event {
    /// Key press event
    Key(KeyEvent),
    /// Terminal tick event
    Tick,
}

/// Event handler for the terminal
pub struct EventHandler {
    /// Tick rate in milliseconds
    tick_rate: Duration,
}

impl EventHandler {
    /// Create a new event handler
    pub fn new(tick_rate_ms: u64) -> Self {
        Self {
            tick_rate: Duration::from_millis(tick_rate_ms),
        }
    }

    /// Poll for the next event
    pub fn next(&self) -> Result<Event> {
        if event::poll(self.tick_rate)? {
            if let CEvent::Key(key) = event::read()? {
                return Ok(Event::Key(key));
            }
        }
        Ok(Event::Tick)
    }
}

/// Handle key events for the application
pub fn handle_key_event(key: KeyEvent, app: &mut App) {
    // On Windows, crossterm reports both key press and release events.
    // We only want to handle press events to avoid duplicates.
    if key.kind != KeyEventKind::Press {
        return;
    }

    match app.input_mode {
        InputMode::Searching => {
            handle_search_input(key, app);
            return;
        }
        InputMode::EditingNote => {
            handle_note_input(key, app);
            return;
        }
        InputMode::Normal => {}
    }

    // Help screen takes precedence
    if app.help_open {
        if key_matches(&app.config.keymap.close, &key) || key_matches(&app.config.keymap.help, &key) {
            app.close_help();
        }
        return;
    }

    if app.is_detail_open() {
        handle_detail_input(key, app);
        return;
    }

    let keymap = app.config.keymap.clone();
    if key_matches(&keymap.quit, &key) {
        app.quit();
    } else if key_matches(&keymap.help, &key) {
        app.open_help();
    } else if key_matches(&keymap.search, &key) {
        app.open_search();
    } else if key_matches(&keymap.switch_tab, &key) {
        app.switch_tab();
    } else if key_matches(&keymap.select_up, &key) {
        app.select_up();
    } else if key_matches(&keymap.select_down, &key) {
        app.select_down();
    } else if key_matches(&keymap.open_detail, &key) {
        app.open_detail();
    } else if key_matches(&keymap.toggle_favorite, &key) {
        app.toggle_favorite();
    } else if key_matches(&keymap.open_in_browser, &key) {
        app.open_in_browser();
    }
}

fn handle_search_input(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Esc => app.close_search(),
        KeyCode::Enter => app.submit_search(),
        KeyCode::Backspace => app.backspace_search_query(),
        KeyCode::Char(c) => {
            if !key.modifiers.contains(KeyModifiers::CONTROL) {
                app.update_search_query(c);
            }
        }
        _ => {}
    }
}

fn handle_note_input(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Esc => app.cancel_note_edit(),
        KeyCode::Enter if key.modifiers.contains(KeyModifiers::ALT) => app.update_note('\n'),
        KeyCode::Enter => app.save_note(),
        KeyCode::Backspace => app.backspace_note(),
        KeyCode::Char(c) => {
            // Allow AltGr combinations (CONTROL+ALT) for special characters
            if !key.modifiers.contains(KeyModifiers::CONTROL) || key.modifiers.contains(KeyModifiers::ALT) {
                app.update_note(c);
            }
        }
        _ => {}
    }
}

fn handle_detail_input(key: KeyEvent, app: &mut App) {
    let keymap = app.config.keymap.clone();

    if let KeyCode::Char(c @ '1'..='5') = key.code {
        if key.modifiers.is_empty() {
            app.rate_selected(c as u8 - b'0');
            return;
        }
    }

    if key_matches(&keymap.close, &key) || key_matches(&keymap.quit, &key) {
        app.close_detail();
    } else if key_matches(&keymap.toggle_favorite, &key) {
        app.toggle_favorite();
    } else if key_matches(&keymap.clear_rating, &key) {
        app.rate_selected(0);
    } else if key_matches(&keymap.edit_note, &key) {
        app.start_note_edit();
    } else if key_matches(&keymap.clear_note, &key) {
        app.clear_note();
    } else if key_matches(&keymap.open_in_browser, &key) {
        app.open_in_browser();
    } else if key_matches(&keymap.help, &key) {
        app.open_help();
    }
}
