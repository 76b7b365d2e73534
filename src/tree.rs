//! Hierarchy reconstruction over flat, parent-referencing task lists.
//!
//! Storage keeps tasks flat; this module rebuilds the outline shown to users
//! and finds the subtrees affected by cascading completion. Both walks are
//! iterative and keep a visited set, so corrupt data (dangling or cyclic
//! `parent_id` values) degrades to a flatter outline instead of overflowing
//! the stack.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::warn;

use crate::task::Task;

/// A task positioned in the rendered outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutlineRow<'a> {
    pub task: &'a Task,
    /// Zero-based nesting depth.
    pub level: usize,
}

/// Build a map of parent ids to the positions of their children in `tasks`.
///
/// Children keep the input order, which is ascending id for repository reads.
pub fn build_children_map(tasks: &[Task]) -> BTreeMap<i64, Vec<usize>> {
    let mut map: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (idx, t) in tasks.iter().enumerate() {
        map.entry(t.parent_id).or_default().push(idx);
    }
    map
}

/// Order tasks depth-first, each task followed by its whole subtree.
///
/// Roots are tasks with `parent_id == -1`, tasks whose parent is not in the
/// input and tasks naming themselves as parent. Whatever is left afterwards
/// can only be reached through a cycle; each such cycle is cut at its first
/// task in input order, which is then rendered as a root. Every input task
/// appears exactly once in the result.
pub fn depth_first(tasks: &[Task]) -> Vec<OutlineRow<'_>> {
    let ids: HashSet<i64> = tasks.iter().map(|t| t.id).collect();
    let children = build_children_map(tasks);
    let mut visited = vec![false; tasks.len()];
    let mut out = Vec::with_capacity(tasks.len());

    let is_root = |t: &Task| {
        t.is_root() || t.parent_id == t.id || !ids.contains(&t.parent_id)
    };

    for idx in 0..tasks.len() {
        if !visited[idx] && is_root(&tasks[idx]) {
            walk_subtree(tasks, &children, idx, &mut visited, &mut out);
        }
    }

    for idx in 0..tasks.len() {
        if !visited[idx] {
            warn!(
                task_id = tasks[idx].id,
                parent_id = tasks[idx].parent_id,
                "parent chain loops back on itself, rendering task as a root"
            );
            walk_subtree(tasks, &children, idx, &mut visited, &mut out);
        }
    }

    out
}

fn walk_subtree<'a>(
    tasks: &'a [Task],
    children: &BTreeMap<i64, Vec<usize>>,
    start: usize,
    visited: &mut [bool],
    out: &mut Vec<OutlineRow<'a>>,
) {
    let mut stack = vec![(start, 0usize)];
    while let Some((idx, level)) = stack.pop() {
        if visited[idx] {
            continue;
        }
        visited[idx] = true;
        let task = &tasks[idx];
        out.push(OutlineRow { task, level });

        if let Some(kids) = children.get(&task.id) {
            // Reverse so the lowest id is popped first.
            for &child in kids.iter().rev() {
                if !visited[child] {
                    stack.push((child, level + 1));
                }
            }
        }
    }
}

/// Collect every direct or transitive descendant of `targets`.
///
/// Ids come out in pre-order: each child, then its own descendants, then the
/// next child. A task reachable from several targets is listed once.
pub fn collect_descendants(tasks: &[Task], targets: &[i64]) -> Vec<i64> {
    let mut child_ids: HashMap<i64, Vec<i64>> = HashMap::new();
    for t in tasks {
        child_ids.entry(t.parent_id).or_default().push(t.id);
    }

    let mut seen: HashSet<i64> = HashSet::new();
    let mut out = Vec::new();
    for &target in targets {
        seen.insert(target);
        let mut stack: Vec<i64> = child_ids
            .get(&target)
            .map(|kids| kids.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            out.push(id);
            if let Some(kids) = child_ids.get(&id) {
                stack.extend(kids.iter().rev().copied().filter(|k| !seen.contains(k)));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::ROOT_PARENT;

    fn task(id: i64, parent_id: i64) -> Task {
        Task::new(id, format!("task {id}"), parent_id)
    }

    fn order(rows: &[OutlineRow<'_>]) -> Vec<(i64, usize)> {
        rows.iter().map(|r| (r.task.id, r.level)).collect()
    }

    #[test]
    fn test_three_level_chain() {
        let tasks = vec![task(1, -1), task(2, 1), task(3, 2)];
        let rows = depth_first(&tasks);
        assert_eq!(order(&rows), vec![(1, 0), (2, 1), (3, 2)]);
    }

    #[test]
    fn test_subtree_rendered_before_next_sibling() {
        let tasks = vec![
            task(1, -1),
            task(2, -1),
            task(3, 1),
            task(4, 2),
            task(5, 3),
            task(6, 1),
        ];
        let rows = depth_first(&tasks);
        assert_eq!(
            order(&rows),
            vec![(1, 0), (3, 1), (5, 2), (6, 1), (2, 0), (4, 1)]
        );
    }

    #[test]
    fn test_child_listed_before_parent_in_input() {
        // Parent with a higher id than its child: no ordering assumption.
        let tasks = vec![task(1, 5), task(2, -1), task(5, 2)];
        let rows = depth_first(&tasks);
        assert_eq!(order(&rows), vec![(2, 0), (5, 1), (1, 2)]);
    }

    #[test]
    fn test_dangling_parent_renders_at_root_level() {
        let tasks = vec![task(1, -1), task(2, 42), task(3, 2)];
        let rows = depth_first(&tasks);
        assert_eq!(order(&rows), vec![(1, 0), (2, 0), (3, 1)]);
    }

    #[test]
    fn test_cycle_terminates_and_keeps_every_task() {
        let tasks = vec![task(1, -1), task(2, 3), task(3, 4), task(4, 2), task(5, 5)];
        let rows = depth_first(&tasks);
        assert_eq!(order(&rows), vec![(1, 0), (5, 0), (2, 0), (4, 1), (3, 2)]);
    }

    #[test]
    fn test_output_is_a_permutation_of_input() {
        let tasks: Vec<Task> = (1..=40)
            .map(|id| task(id, if id % 4 == 1 { -1 } else { id - 1 - (id % 3) }))
            .collect();
        let rows = depth_first(&tasks);
        let mut ids: Vec<i64> = rows.iter().map(|r| r.task.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=40).collect::<Vec<_>>());

        // Each non-root row follows its parent somewhere above, one level up.
        for (pos, row) in rows.iter().enumerate() {
            if row.task.parent_id == ROOT_PARENT {
                assert_eq!(row.level, 0);
                continue;
            }
            let parent_pos = rows[..pos]
                .iter()
                .rposition(|r| r.task.id == row.task.parent_id)
                .expect("parent rendered before child");
            assert_eq!(rows[parent_pos].level + 1, row.level);
            assert!(rows[parent_pos + 1..pos].iter().all(|r| r.level > rows[parent_pos].level));
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(depth_first(&[]).is_empty());
        assert!(collect_descendants(&[], &[1]).is_empty());
    }

    #[test]
    fn test_descendants_of_single_target() {
        let tasks = vec![task(1, -1), task(2, 1), task(3, 2), task(4, -1)];
        assert_eq!(collect_descendants(&tasks, &[1]), vec![2, 3]);
        assert!(collect_descendants(&tasks, &[4]).is_empty());
    }

    #[test]
    fn test_descendants_pre_order_and_unique() {
        let tasks = vec![
            task(1, -1),
            task(2, 1),
            task(3, 1),
            task(4, 2),
            task(5, -1),
            task(6, 5),
        ];
        assert_eq!(collect_descendants(&tasks, &[1]), vec![2, 4, 3]);
        // Overlapping targets do not repeat ids.
        assert_eq!(collect_descendants(&tasks, &[1, 2, 5]), vec![2, 4, 3, 6]);
        // Unknown ids simply contribute nothing.
        assert_eq!(collect_descendants(&tasks, &[99]), Vec::<i64>::new());
    }

    #[test]
    fn test_descendants_survive_cycles() {
        let tasks = vec![task(1, 3), task(2, 1), task(3, 2)];
        assert_eq!(collect_descendants(&tasks, &[1]), vec![2, 3]);
    }
}
