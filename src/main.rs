//! # todo - chat-style to-do list
//!
//! A small task manager driven by chat commands (`/todo`, `/list`, `/find`,
//! `/done`, `/reopen`, `/clear`, `/help`) and backed by a single SQLite table.
//!
//! Tasks are stored flat with a `parent_id` reference; listings rebuild the
//! hierarchy as an indented outline, and completing a task completes all of
//! its subtasks too.
//!
//! ## Quick Start
//!
//! ```bash
//! # Full-screen chat window
//! todo ui
//!
//! # Line-based chat session (scriptable)
//! printf '/todo find socks\n/list\n' | todo chat
//!
//! # One-shot commands
//! todo add buy milk
//! todo done 1 3
//! todo list --json
//! ```
//!
//! Data lives in `~/.todo/tasks.db`; settings are read from
//! `~/.todo/config.json` when present. Set `RUST_LOG=debug` (optionally with
//! `log_file` in the settings while using `todo ui`) to see what the bot does.

use std::fs::{create_dir_all, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub mod bot;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod db;
pub mod error;
pub mod fields;
pub mod i18n;
pub mod render;
pub mod task;
pub mod tree;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod run;
    pub mod utils;
}

use bot::Bot;
use cli::Cli;
use cmd::*;
use config::{system_locale, todo_home, Settings, CONFIG_FILE};
use db::Database;

/// Tracing is opt-in via RUST_LOG; output goes to `log_file` when given,
/// stderr otherwise. Nothing is opened or installed while RUST_LOG is unset.
fn init_tracing(log_file: Option<&Path>) {
    let Some(filter) = std::env::var("RUST_LOG").ok().and_then(|raw| {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        EnvFilter::try_new(raw).ok()
    }) else {
        return;
    };

    let file = log_file.and_then(|path| {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if let Err(e) = create_dir_all(dir) {
                eprintln!("Cannot create log directory {}: {e}", dir.display());
                return None;
            }
        }
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => Some(f),
            Err(e) => {
                eprintln!("Cannot open log file {}: {e}", path.display());
                None
            }
        }
    });
    let (file_layer, stderr_layer) = match (file, log_file) {
        (Some(f), _) => (Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(f))), None),
        // Unwritable log file: drop the output, stderr may belong to the UI.
        (None, Some(_)) => (None, None),
        (None, None) => (None, Some(fmt::layer().with_writer(std::io::stderr))),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();
}

fn main() {
    let cli = Cli::parse();

    // Completions need neither settings nor storage.
    if let Commands::Completions { shell } = cli.command {
        cmd_completions(shell);
        return;
    }

    let home = todo_home();
    let config_path = cli.config.clone().unwrap_or_else(|| home.join(CONFIG_FILE));
    let settings = match Settings::load(&config_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    let config = settings.resolve(&home, cli.db, cli.locale, system_locale());
    let log_path = config.log_path(&home, matches!(cli.command, Commands::Ui));
    init_tracing(log_path.as_deref());
    info!(db = %config.db_path.display(), locale = ?config.locale, "starting");

    let db = match Database::open(&config.db_path) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Failed to open {}: {e}", config.db_path.display());
            std::process::exit(1);
        }
    };
    let bot = Bot::new(db, config.locale).with_name(config.bot_name);

    let result = match cli.command {
        Commands::Completions { .. } => unreachable!("completions handled above"),
        Commands::Ui => cmd_ui(&bot),
        Commands::Chat => cmd_chat(&bot),
        Commands::Add { text } => cmd_add(&bot, text),
        Commands::List { filter, json } => cmd_list(&bot, filter, json),
        Commands::Find { query, json } => cmd_find(&bot, query, json),
        Commands::Done { ids } => cmd_done(&bot, ids),
        Commands::Reopen { id } => cmd_reopen(&bot, id),
        Commands::Clear { all, completed } => cmd_clear(&bot, all, completed),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "command failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
