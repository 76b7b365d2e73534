//! Task data structure.
//!
//! A task is a flat record: hierarchy is expressed only through `parent_id`,
//! and the nested view is rebuilt on demand by [`crate::tree`].

use serde::{Deserialize, Serialize};

/// Parent id carried by every top-level task.
pub const ROOT_PARENT: i64 = -1;

/// A single to-do item as stored in the `tasks` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub text: String,
    #[serde(default)]
    pub is_done: bool,
    #[serde(default = "root_parent")]
    pub parent_id: i64,
}

fn root_parent() -> i64 {
    ROOT_PARENT
}

impl Task {
    /// Create an open task.
    pub fn new(id: i64, text: impl Into<String>, parent_id: i64) -> Self {
        Task {
            id,
            text: text.into(),
            is_done: false,
            parent_id,
        }
    }

    /// Whether this task sits at the top of the hierarchy.
    pub fn is_root(&self) -> bool {
        self.parent_id == ROOT_PARENT
    }
}
