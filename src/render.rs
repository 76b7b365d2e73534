//! Plain-text rendering of tasks for chat replies.

use crate::task::Task;
use crate::tree::{depth_first, OutlineRow};

pub const DONE_GLYPH: &str = "\u{2705}";
pub const OPEN_GLYPH: &str = "\u{274c}";

/// Glyph shown at the end of a task line.
pub fn status_glyph(is_done: bool) -> &'static str {
    if is_done {
        DONE_GLYPH
    } else {
        OPEN_GLYPH
    }
}

/// Format one task as `{indent}{id}: {text} | {glyph}`.
pub fn format_task(task: &Task, level: usize) -> String {
    format!(
        "{}{}: {} | {}",
        "  ".repeat(level),
        task.id,
        task.text,
        status_glyph(task.is_done)
    )
}

/// Render rows in the order given, one per line.
pub fn format_rows(rows: &[OutlineRow<'_>]) -> String {
    rows.iter()
        .map(|row| format_task(row.task, row.level))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render tasks as a nested outline.
pub fn format_outline(tasks: &[Task]) -> String {
    format_rows(&depth_first(tasks))
}

/// Render tasks without nesting, in the order given.
pub fn format_flat(tasks: &[Task]) -> String {
    tasks
        .iter()
        .map(|t| format_task(t, 0))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_task() {
        let mut task = Task::new(3, "find socks", -1);
        assert_eq!(format_task(&task, 0), "3: find socks | ❌");
        task.is_done = true;
        assert_eq!(format_task(&task, 2), "    3: find socks | ✅");
    }

    #[test]
    fn test_outline_indents_by_level() {
        let tasks = vec![
            Task::new(1, "A", -1),
            Task::new(2, "B", 1),
            Task::new(3, "C", 2),
            Task::new(4, "D", -1),
        ];
        assert_eq!(
            format_outline(&tasks),
            "1: A | ❌\n  2: B | ❌\n    3: C | ❌\n4: D | ❌"
        );
    }

    #[test]
    fn test_flat_ignores_nesting() {
        let tasks = vec![Task::new(2, "B", 1), Task::new(3, "C", 2)];
        assert_eq!(format_flat(&tasks), "2: B | ❌\n3: C | ❌");
    }
}
