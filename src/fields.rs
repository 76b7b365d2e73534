//! Enumerations and small value types shared by the chat and CLI surfaces.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Language used for every reply the bot sends.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Locale {
    #[default]
    #[serde(alias = "EN", alias = "En")]
    En,
    #[serde(alias = "RU", alias = "Ru")]
    Ru,
}

impl Locale {
    /// Parse a locale code such as `ru` or `en-US`.
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim().to_lowercase();
        let lang = code.split(|c: char| matches!(c, '-' | '_' | '.')).next().unwrap_or("");
        match lang {
            "en" => Some(Locale::En),
            "ru" => Some(Locale::Ru),
            _ => None,
        }
    }
}

/// Which rows a bulk delete removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearScope {
    All,
    Completed,
}

impl ClearScope {
    /// Payload carried by the inline button that triggers this scope.
    pub fn callback_data(self) -> &'static str {
        match self {
            ClearScope::All => "clear:all",
            ClearScope::Completed => "clear:completed",
        }
    }

    /// Inverse of [`ClearScope::callback_data`].
    pub fn from_callback_data(data: &str) -> Option<Self> {
        match data {
            "clear:all" => Some(ClearScope::All),
            "clear:completed" => Some(ClearScope::Completed),
            _ => None,
        }
    }

    /// Value of the `is_done` column to match, `None` meaning every row.
    pub fn done_filter(self) -> Option<bool> {
        match self {
            ClearScope::All => None,
            ClearScope::Completed => Some(true),
        }
    }
}

/// Interpret the free-text argument of `/list` as a done-state filter.
///
/// Returns `None` for words that are not recognised so the caller can answer
/// with usage help instead of guessing.
pub fn parse_done_filter(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "done" | "completed" | "closed" | "yes" | "1" | "да" | "завершенные"
        | "выполненные" => Some(true),
        "false" | "open" | "pending" | "todo" | "no" | "0" | "нет" | "открытые"
        | "незавершенные" => Some(false),
        _ => None,
    }
}
