//! Command implementations for the CLI interface.
//!
//! Every one-shot subcommand goes through the same [`Bot`] handlers as the chat
//! surfaces, so replies and input validation are identical everywhere.

use std::io::{self, BufRead, Write};

use clap::Subcommand;
use clap_complete::{generate, Shell};
use serde::Serialize;
use tracing::error;

use crate::bot::{Bot, Button, Reply};
use crate::error::Result;
use crate::fields::ClearScope;
use crate::task::Task;
use crate::tree::depth_first;
use crate::tui::run::run_tui;

#[derive(Subcommand)]
pub enum Commands {
    /// Open the full-screen chat window.
    Ui,

    /// Chat with the bot line by line on stdin/stdout.
    Chat,

    /// Add a new task.
    Add {
        /// Task text.
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// List tasks as a nested outline.
    List {
        /// Done-state filter: true | false (also done | open).
        filter: Option<String>,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Search tasks by text, ignoring case.
    Find {
        /// Word or phrase to look for.
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Mark tasks and all their subtasks done.
    Done {
        /// Task IDs.
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        ids: Vec<String>,
    },

    /// Reopen a single task (subtasks are left alone).
    Reopen {
        /// Task ID.
        #[arg(allow_hyphen_values = true)]
        id: String,
    },

    /// Delete tasks. Asks which ones unless a scope flag is given.
    Clear {
        /// Delete every task without asking.
        #[arg(long, conflicts_with = "completed")]
        all: bool,
        /// Delete completed tasks without asking.
        #[arg(long)]
        completed: bool,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Launch the terminal chat window.
pub fn cmd_ui(bot: &Bot) -> Result<()> {
    run_tui(bot)
}

/// Run a line-based chat session on stdin/stdout.
pub fn cmd_chat(bot: &Bot) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    run_chat(bot, stdin.lock(), &mut stdout)
}

/// Add a new root task.
pub fn cmd_add(bot: &Bot, text: Vec<String>) -> Result<()> {
    print_reply(&bot.create_task(&text.join(" "))?);
    Ok(())
}

/// Task with its outline depth, as printed by `list --json`.
#[derive(Serialize)]
struct OutlineEntry<'a> {
    #[serde(flatten)]
    task: &'a Task,
    level: usize,
}

/// List tasks, nested by parent.
pub fn cmd_list(bot: &Bot, filter: Option<String>, json: bool) -> Result<()> {
    if !json {
        print_reply(&bot.list_tasks(filter.as_deref().unwrap_or(""))?);
        return Ok(());
    }

    let done = match bot.list_filter(filter.as_deref().unwrap_or("")) {
        Ok(done) => done,
        Err(usage) => exit_with_usage(&usage),
    };
    let tasks = bot.database().get_list(done)?;
    let entries: Vec<OutlineEntry<'_>> = depth_first(&tasks)
        .into_iter()
        .map(|row| OutlineEntry {
            task: row.task,
            level: row.level,
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}

/// Search tasks by substring.
pub fn cmd_find(bot: &Bot, query: Vec<String>, json: bool) -> Result<()> {
    let query = query.join(" ");
    if !json {
        print_reply(&bot.find_tasks(&query)?);
        return Ok(());
    }
    let query = match bot.find_query(&query) {
        Ok(query) => query,
        Err(usage) => exit_with_usage(&usage),
    };
    let tasks = bot.database().find_tasks(query)?;
    println!("{}", serde_json::to_string_pretty(&tasks)?);
    Ok(())
}

/// Mark tasks done, cascading to subtasks.
pub fn cmd_done(bot: &Bot, ids: Vec<String>) -> Result<()> {
    print_reply(&bot.finish_tasks(&ids.join(" "))?);
    Ok(())
}

/// Reopen one task.
pub fn cmd_reopen(bot: &Bot, id: String) -> Result<()> {
    print_reply(&bot.reopen_task(&id)?);
    Ok(())
}

/// Delete tasks, asking for the scope on stdin when no flag is given.
pub fn cmd_clear(bot: &Bot, all: bool, completed: bool) -> Result<()> {
    let scope = if all {
        Some(ClearScope::All)
    } else if completed {
        Some(ClearScope::Completed)
    } else {
        None
    };
    if let Some(scope) = scope {
        print_reply(&bot.clear(scope)?);
        return Ok(());
    }

    let prompt = bot.clear_prompt();
    let mut stdout = io::stdout();
    write_reply(&mut stdout, &prompt)?;
    stdout.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    match pick_button(&prompt.keyboard, &line) {
        Some(button) => print_reply(&bot.handle_callback(&button.data)?),
        None => println!("-"),
    }
    Ok(())
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut io::stdout());
}

/// Feed every input line to the bot and write the replies to `out`.
///
/// When the last reply carried buttons, the next line may pick one by its
/// number or caption; anything else dismisses them and is handled as a new
/// message. `/quit` and `/exit` end the session. A failing command is reported
/// on stderr and the session goes on.
pub fn run_chat<R: BufRead, W: Write>(bot: &Bot, input: R, out: &mut W) -> Result<()> {
    let mut pending: Vec<Button> = Vec::new();
    for line in input.lines() {
        let line = line?;
        let message = line.trim();
        if matches!(message, "/quit" | "/exit") {
            break;
        }

        let keyboard = std::mem::take(&mut pending);
        let result = match pick_button(&keyboard, message) {
            Some(button) => bot.handle_callback(&button.data).map(Some),
            None => bot.handle_message(message),
        };
        match result {
            Ok(Some(reply)) => {
                write_reply(out, &reply)?;
                pending = reply.keyboard;
            }
            Ok(None) => {}
            Err(e) => {
                error!(error = %e, message, "chat command failed");
                eprintln!("Error: {e}");
            }
        }
        out.flush()?;
    }
    Ok(())
}

/// Find the button chosen by a 1-based number or by its caption.
fn pick_button<'a>(keyboard: &'a [Button], choice: &str) -> Option<&'a Button> {
    let choice = choice.trim();
    if let Ok(n) = choice.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| keyboard.get(i));
    }
    let choice = choice.to_lowercase();
    keyboard.iter().find(|b| b.label.to_lowercase() == choice)
}

fn write_reply<W: Write>(out: &mut W, reply: &Reply) -> io::Result<()> {
    writeln!(out, "{}", reply.text)?;
    if !reply.keyboard.is_empty() {
        let buttons: Vec<String> = reply
            .keyboard
            .iter()
            .enumerate()
            .map(|(i, b)| format!("[{}] {}", i + 1, b.label))
            .collect();
        writeln!(out, "{}", buttons.join("   "))?;
    }
    Ok(())
}

/// Report a rejected argument the way clap does and stop.
fn exit_with_usage(usage: &Reply) -> ! {
    eprintln!("{}", usage.text);
    std::process::exit(2);
}

fn print_reply(reply: &Reply) {
    println!("{}", reply.text);
}
