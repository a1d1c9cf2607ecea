use std::{collections::HashMap, fs, io, path::Path};

use shared::domain::{MainContent, UiState};
use tracing::{debug, warn};

use crate::console::DEFAULT_CONSOLE_CAPACITY;

const ENV_OVERRIDES: [(&str, &str); 4] = [
    ("dark_theme", "APP__DARK_THEME"),
    ("console_open", "APP__CONSOLE_OPEN"),
    ("main_content", "APP__MAIN_CONTENT"),
    ("console_capacity", "APP__CONSOLE_CAPACITY"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiSettings {
    pub dark_theme: bool,
    pub console_open: bool,
    pub main_content: MainContent,
    pub console_capacity: usize,
}

impl Default for UiSettings {
    fn default() -> Self {
        let state = UiState::default();
        Self {
            dark_theme: state.dark_theme,
            console_open: state.console_open,
            main_content: state.main_content,
            console_capacity: DEFAULT_CONSOLE_CAPACITY,
        }
    }
}

impl UiSettings {
    pub fn initial_state(&self) -> UiState {
        UiState {
            dark_theme: self.dark_theme,
            console_open: self.console_open,
            main_content: self.main_content,
        }
    }

    fn apply(&mut self, key: &str, raw: &str) {
        let applied = match key {
            "dark_theme" => parse_bool(raw).map(|v| self.dark_theme = v),
            "console_open" => parse_bool(raw).map(|v| self.console_open = v),
            "main_content" => raw.parse::<MainContent>().ok().map(|v| self.main_content = v),
            "console_capacity" => match raw.trim().parse::<usize>() {
                Ok(v) if v > 0 => {
                    self.console_capacity = v;
                    Some(())
                }
                _ => None,
            },
            _ => {
                debug!(key = key, "ignoring unknown ui setting");
                return;
            }
        };
        if applied.is_none() {
            warn!(key = key, value = raw, "ignoring invalid ui setting");
        }
    }
}

/// Loads settings from `path` (optional) and the process environment.
pub fn load_settings(path: impl AsRef<Path>) -> UiSettings {
    load_settings_with(path, |var| std::env::var(var).ok())
}

/// Loads settings from `path` (optional), then applies `APP__*` overrides
/// looked up through `env`.
pub fn load_settings_with<F>(path: impl AsRef<Path>, env: F) -> UiSettings
where
    F: Fn(&str) -> Option<String>,
{
    let path = path.as_ref();
    let mut settings = UiSettings::default();

    match fs::read_to_string(path) {
        Ok(raw) => match toml::from_str::<HashMap<String, toml::Value>>(&raw) {
            Ok(file_cfg) => {
                for (key, value) in &file_cfg {
                    let value = match value {
                        toml::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    settings.apply(key, &value);
                }
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring malformed ui settings file")
            }
        },
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => warn!(path = %path.display(), error = %err, "failed to read ui settings file"),
    }

    for (key, var) in ENV_OVERRIDES {
        if let Some(value) = env(var) {
            settings.apply(key, &value);
        }
    }

    settings
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
