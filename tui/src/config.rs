use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Keymap {
    pub quit: String,
    pub help: String,
    pub search: String,
    pub switch_tab: String,
    pub select_up: String,
    pub select_down: String,
    pub open_detail: String,
    pub close: String,
    pub toggle_favorite: String,
    pub edit_note: String,
    pub clear_note: String,
    pub clear_rating: String,
    pub open_in_browser: String,
}

impl Default for Keymap {
    fn default() -> Self {
        Self {
            quit: "q".to_string(),
            help: "h".to_string(),
            search: "/".to_string(),
            switch_tab: "tab".to_string(),
            select_up: "up".to_string(),
            select_down: "down".to_string(),
            open_detail: "enter".to_string(),
            close: "esc".to_string(),
            toggle_favorite: "f".to_string(),
            edit_note: "n".to_string(),
            clear_note: "ctrl-d".to_string(),
            clear_rating: "0".to_string(),
            open_in_browser: "o".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub keymap: Keymap,
}

/// Load `config.toml`, writing the defaults when it does not exist yet.
/// A file that cannot be read or parsed falls back to the defaults.
pub fn load_config(path: &Path) -> Config {
    if !path.exists() {
        let config = Config::default();
        match toml::to_string(&config) {
            Ok(text) => {
                if let Err(err) = fs::write(path, text) {
                    warn!(path = %path.display(), error = %err, "Failed to write default config");
                }
            }
            Err(err) => warn!(error = %err, "Failed to serialize default config"),
        }
        return config;
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Failed to read config file, using defaults");
            return Config::default();
        }
    };

    toml::from_str(&content).unwrap_or_else(|err| {
        warn!(path = %path.display(), error = %err, "Failed to parse config file, using defaults");
        Config::default()
    })
}

/// Whether `key` is the binding described by `binding`, e.g. `ctrl-d`,
/// `enter`, `/`, `alt-up`. Unknown bindings never match.
pub fn key_matches(binding: &str, key: &KeyEvent) -> bool {
    match parse_binding(binding) {
        Some((code, modifiers)) => {
            let pressed = key.modifiers - KeyModifiers::SHIFT;
            code == normalize(key.code) && pressed == modifiers
        }
        None => false,
    }
}

fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        KeyCode::BackTab => KeyCode::Tab,
        other => other,
    }
}

fn parse_binding(binding: &str) -> Option<(KeyCode, KeyModifiers)> {
    let binding = binding.trim().to_ascii_lowercase();
    let mut modifiers = KeyModifiers::NONE;
    let mut rest = binding.as_str();

    loop {
        if let Some(stripped) = rest.strip_prefix("ctrl-") {
            modifiers |= KeyModifiers::CONTROL;
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix("alt-") {
            modifiers |= KeyModifiers::ALT;
            rest = stripped;
        } else {
            break;
        }
    }

    let code = match rest {
        "enter" => KeyCode::Enter,
        "esc" => KeyCode::Esc,
        "tab" => KeyCode::Tab,
        "backspace" => KeyCode::Backspace,
        "delete" => KeyCode::Delete,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "space" => KeyCode::Char(' '),
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c),
                _ => return None,
            }
        }
    };

    Some((code, modifiers))
}
