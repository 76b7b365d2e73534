//! SQLite-backed task repository.
//!
//! This module provides the `Database` struct, a thin layer of insert / select /
//! update / delete statements over a single flat `tasks` table. No task state is
//! cached between calls: every read goes back to the database.

use std::path::Path;
use std::time::Duration;

use rusqlite::functions::FunctionFlags;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use crate::error::Result;
use crate::task::{Task, ROOT_PARENT};

const SCHEMA_TASKS: &str = "CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER NOT NULL PRIMARY KEY,
    text TEXT NOT NULL,
    is_done BOOLEAN NOT NULL DEFAULT 0,
    parent_id INTEGER NOT NULL
);";
const INSERT_TASK: &str = "INSERT INTO tasks (text, parent_id) VALUES (?1, ?2)";
const SELECT_TASKS: &str = "SELECT id, text, is_done, parent_id FROM tasks";
const WHERE_DONE: &str = "WHERE is_done = ?1";
const WHERE_TEXT_CONTAINS: &str = "WHERE instr(casefold(text), casefold(?1)) > 0";
const ORDER_BY_ID: &str = "ORDER BY id ASC";
const SELECT_DONE_BY_ID: &str = "SELECT is_done FROM tasks WHERE id = ?1";
const UPDATE_DONE_BY_IDS: &str = "UPDATE tasks SET is_done = ? WHERE id IN";
const DELETE_TASKS: &str = "DELETE FROM tasks";

/// Ids bound per UPDATE, well under SQLite's bound-variable limit.
const IDS_PER_STATEMENT: usize = 500;

/// Result of reopening a single task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReopenOutcome {
    Reopened,
    AlreadyOpen,
    NotFound,
}

/// Handle on the task store.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (creating if needed) the database file at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        debug!(path = %path.display(), "opened task database");
        Self::init(conn)
    }

    /// Open a private database that lives only as long as the handle.
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    /// Drop the table so every later query fails.
    #[cfg(test)]
    pub fn break_storage(&self) {
        self.conn.execute_batch("DROP TABLE tasks").unwrap();
    }

    fn init(conn: Connection) -> Result<Self> {
        // Unicode-aware lowering; SQLite's own lower() only folds ASCII.
        conn.create_scalar_function(
            "casefold",
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                let text: String = ctx.get(0)?;
                Ok(text.to_lowercase())
            },
        )?;
        conn.execute_batch(SCHEMA_TASKS)?;
        Ok(Database { conn })
    }

    /// Insert a root task and return its id.
    pub fn add_task(&self, text: &str) -> Result<i64> {
        self.insert(text, ROOT_PARENT)
    }

    /// Insert a task under `parent_id` and return its id.
    ///
    /// The parent is not checked for existence.
    pub fn insert(&self, text: &str, parent_id: i64) -> Result<i64> {
        self.conn.execute(INSERT_TASK, params![text, parent_id])?;
        let id = self.conn.last_insert_rowid();
        info!(id, parent_id, "task added");
        Ok(id)
    }

    /// All tasks ordered by id, optionally only those with the given done state.
    pub fn get_list(&self, is_done: Option<bool>) -> Result<Vec<Task>> {
        match is_done {
            Some(done) => self.fetch(&format!("{SELECT_TASKS} {WHERE_DONE} {ORDER_BY_ID}"), params![done]),
            None => self.fetch(&format!("{SELECT_TASKS} {ORDER_BY_ID}"), params![]),
        }
    }

    /// Tasks whose text contains `needle`, ignoring case, ordered by id.
    pub fn find_tasks(&self, needle: &str) -> Result<Vec<Task>> {
        self.fetch(
            &format!("{SELECT_TASKS} {WHERE_TEXT_CONTAINS} {ORDER_BY_ID}"),
            params![needle],
        )
    }

    fn fetch(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<Task>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, task_from_row)?;
        let mut tasks = Vec::new();
        for task in rows {
            tasks.push(task?);
        }
        Ok(tasks)
    }

    /// Mark tasks done. Unknown ids and already-done tasks are left as they are.
    pub fn finish_tasks(&self, ids: &[i64]) -> Result<()> {
        let changed = self.set_done(ids, true)?;
        info!(?ids, changed, "tasks marked done");
        Ok(())
    }

    /// Mark tasks open again. Unknown ids and open tasks are left as they are.
    pub fn reopen_tasks(&self, ids: &[i64]) -> Result<()> {
        let changed = self.set_done(ids, false)?;
        info!(?ids, changed, "tasks reopened");
        Ok(())
    }

    /// Reopen one task, reporting whether anything changed.
    pub fn reopen(&self, id: i64) -> Result<ReopenOutcome> {
        let current: Option<bool> = self
            .conn
            .query_row(SELECT_DONE_BY_ID, params![id], |row| row.get(0))
            .optional()?;
        match current {
            None => Ok(ReopenOutcome::NotFound),
            Some(false) => Ok(ReopenOutcome::AlreadyOpen),
            Some(true) => {
                self.reopen_tasks(&[id])?;
                Ok(ReopenOutcome::Reopened)
            }
        }
    }

    fn set_done(&self, ids: &[i64], done: bool) -> Result<usize> {
        let mut unique = ids.to_vec();
        unique.sort_unstable();
        unique.dedup();
        if unique.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.unchecked_transaction()?;
        let mut changed = 0;
        for chunk in unique.chunks(IDS_PER_STATEMENT) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let sql = format!("{UPDATE_DONE_BY_IDS} ({placeholders})");
            let values = std::iter::once(i64::from(done)).chain(chunk.iter().copied());
            changed += tx.execute(&sql, params_from_iter(values))?;
        }
        tx.commit()?;
        Ok(changed)
    }

    /// Delete tasks: every row, or only rows with the given done state.
    pub fn clear(&self, is_done: Option<bool>) -> Result<usize> {
        let removed = match is_done {
            Some(done) => self
                .conn
                .execute(&format!("{DELETE_TASKS} {WHERE_DONE}"), params![done])?,
            None => self.conn.execute(DELETE_TASKS, params![])?,
        };
        info!(?is_done, removed, "tasks cleared");
        Ok(removed)
    }
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        text: row.get(1)?,
        is_done: row.get(2)?,
        parent_id: row.get(3)?,
    })
}
