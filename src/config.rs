//! Configuration loading.
//!
//! Values are layered: built-in defaults, then the JSON settings file, then
//! environment variables and command-line flags (both resolved by clap).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::fields::Locale;

pub const CONFIG_FILE: &str = "config.json";
pub const DB_FILE: &str = "tasks.db";
pub const LOG_FILE: &str = "todo.log";

/// Contents of the settings file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub db_path: Option<PathBuf>,
    pub locale: Option<Locale>,
    pub log_file: Option<PathBuf>,
    pub bot_name: Option<String>,
}

/// Fully resolved configuration used by the rest of the program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub locale: Locale,
    pub log_file: Option<PathBuf>,
    pub bot_name: Option<String>,
}

impl Config {
    /// Where log lines go, `None` meaning stderr.
    ///
    /// The full-screen window draws on the terminal, so it always logs to a
    /// file: the configured one, or `todo.log` next to the default database.
    pub fn log_path(&self, home: &Path, full_screen: bool) -> Option<PathBuf> {
        match &self.log_file {
            Some(path) => Some(path.clone()),
            None if full_screen => Some(home.join(LOG_FILE)),
            None => None,
        }
    }
}

/// Language named by the `LANG` environment variable, if supported.
pub fn system_locale() -> Option<Locale> {
    std::env::var("LANG").ok().and_then(|lang| Locale::from_code(&lang))
}

/// Directory holding the settings file and the default database: `~/.todo`.
pub fn todo_home() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".todo")
}

impl Settings {
    /// Read settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no settings file, using defaults");
                return Ok(Settings::default());
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&raw).map_err(|e| Error::InvalidConfig {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Apply command-line overrides and fill in defaults relative to `home`.
    ///
    /// `system_locale` (usually derived from `LANG`) is used only when neither
    /// the flags nor the settings file choose a language.
    pub fn resolve(
        self,
        home: &Path,
        db: Option<PathBuf>,
        locale: Option<Locale>,
        system_locale: Option<Locale>,
    ) -> Config {
        Config {
            db_path: db
                .or(self.db_path)
                .unwrap_or_else(|| home.join(DB_FILE)),
            locale: locale
                .or(self.locale)
                .or(system_locale)
                .unwrap_or_default(),
            log_file: self.log_file,
            bot_name: self.bot_name.filter(|n| !n.trim().is_empty()),
        }
    }
}
