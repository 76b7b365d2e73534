//! Error types for todo.
//!
//! User-input mistakes never become an [`Error`]: they are answered with a
//! localized chat reply. Everything here is a failure of the environment
//! (storage, filesystem, configuration) and aborts the current command.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for todo operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Storage error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration in {path}: {message}")]
    InvalidConfig { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
