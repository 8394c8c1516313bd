//! Entity store queries and invariant checks.
//!
//! Pure read helpers over a [`Board`]. Nothing here mutates state; the
//! reducer is the only writer.

use crate::types::{Board, ColumnId};
use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

/// Find the column whose `task_ids` contains `task_id`.
///
/// Returns `None` when the task is not placed anywhere. Given the board
/// invariants that should not happen, but callers treat it as a no-op.
pub fn find_owning_column<'a>(board: &'a Board, task_id: &str) -> Option<&'a ColumnId> {
    board
        .columns
        .iter()
        .find(|(_, column)| column.contains(task_id))
        .map(|(id, _)| id)
}

/// Whether `id` is a key of `map`.
pub fn assert_exists<K, V>(map: &BTreeMap<K, V>, id: &str) -> bool
where
    K: Borrow<str> + Ord,
{
    map.contains_key(id)
}

/// A broken board invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A column references a task id missing from the task map.
    DanglingTaskId { column_id: String, task_id: String },
    /// A task in the map is not placed in any column.
    OrphanTask { task_id: String },
    /// A task id is placed more than once (same or different columns).
    DuplicatePlacement { task_id: String, count: usize },
    /// `column_order` is not a permutation of the column keys.
    ColumnOrderMismatch,
    /// A column's own id differs from the key it is stored under.
    ColumnKeyMismatch { key: String, id: String },
    /// A task's own id differs from the key it is stored under.
    TaskKeyMismatch { key: String, id: String },
    /// Two children of the same parent share an id.
    DuplicateChildId { parent_id: String, child_id: String },
    /// A task was updated before it was created.
    UpdatedBeforeCreated { task_id: String },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DanglingTaskId { column_id, task_id } => {
                write!(f, "column {} references unknown task {}", column_id, task_id)
            }
            Self::OrphanTask { task_id } => write!(f, "task {} is not in any column", task_id),
            Self::DuplicatePlacement { task_id, count } => {
                write!(f, "task {} is placed {} times", task_id, count)
            }
            Self::ColumnOrderMismatch => {
                write!(f, "column order does not match the set of columns")
            }
            Self::ColumnKeyMismatch { key, id } => {
                write!(f, "column stored under {} has id {}", key, id)
            }
            Self::TaskKeyMismatch { key, id } => {
                write!(f, "task stored under {} has id {}", key, id)
            }
            Self::DuplicateChildId {
                parent_id,
                child_id,
            } => write!(f, "{} has more than one child with id {}", parent_id, child_id),
            Self::UpdatedBeforeCreated { task_id } => {
                write!(f, "task {} has updatedAt earlier than createdAt", task_id)
            }
        }
    }
}

/// Collect every invariant violation on the board. An empty result means the
/// board is consistent.
pub fn check_invariants(board: &Board) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    // Placement: every placed id exists, appears exactly once.
    let mut placements: HashMap<&str, usize> = HashMap::new();
    for (key, column) in &board.columns {
        if key != &column.id {
            violations.push(InvariantViolation::ColumnKeyMismatch {
                key: key.clone(),
                id: column.id.clone(),
            });
        }
        for task_id in &column.task_ids {
            *placements.entry(task_id.as_str()).or_insert(0) += 1;
            if !board.tasks.contains_key(task_id) {
                violations.push(InvariantViolation::DanglingTaskId {
                    column_id: key.clone(),
                    task_id: task_id.clone(),
                });
            }
        }
    }

    let mut duplicates: Vec<_> = placements
        .iter()
        .filter(|(_, count)| **count > 1)
        .map(|(id, count)| (*id, *count))
        .collect();
    duplicates.sort();
    for (task_id, count) in duplicates {
        violations.push(InvariantViolation::DuplicatePlacement {
            task_id: task_id.to_string(),
            count,
        });
    }

    for (key, task) in &board.tasks {
        if key != &task.id {
            violations.push(InvariantViolation::TaskKeyMismatch {
                key: key.clone(),
                id: task.id.clone(),
            });
        }
        if !placements.contains_key(key.as_str()) {
            violations.push(InvariantViolation::OrphanTask {
                task_id: key.clone(),
            });
        }
        if task.updated_at.is_some_and(|at| at < task.created_at) {
            violations.push(InvariantViolation::UpdatedBeforeCreated {
                task_id: key.clone(),
            });
        }

        check_unique(&task.id, task.reviews.iter().map(|r| &r.id), &mut violations);
        check_unique(&task.id, task.subtasks.iter().map(|s| &s.id), &mut violations);
        check_unique(&task.id, task.images.iter().map(|i| &i.id), &mut violations);
        for subtask in &task.subtasks {
            check_unique(
                &subtask.id,
                subtask.reports.iter().map(|r| &r.id),
                &mut violations,
            );
        }
    }

    let order: HashSet<&String> = board.column_order.iter().collect();
    if order.len() != board.column_order.len()
        || order.len() != board.columns.len()
        || !board.columns.keys().all(|k| order.contains(k))
    {
        violations.push(InvariantViolation::ColumnOrderMismatch);
    }

    violations
}

fn check_unique<'a>(
    parent_id: &str,
    ids: impl Iterator<Item = &'a String>,
    violations: &mut Vec<InvariantViolation>,
) {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            violations.push(InvariantViolation::DuplicateChildId {
                parent_id: parent_id.to_string(),
                child_id: id.clone(),
            });
        }
    }
}

impl Board {
    /// Column that currently owns `task_id`.
    pub fn owning_column(&self, task_id: &str) -> Option<&ColumnId> {
        find_owning_column(self, task_id)
    }

    pub fn has_task(&self, task_id: &str) -> bool {
        assert_exists(&self.tasks, task_id)
    }

    pub fn has_column(&self, column_id: &str) -> bool {
        assert_exists(&self.columns, column_id)
    }

    /// See [`check_invariants`].
    pub fn check_invariants(&self) -> Vec<InvariantViolation> {
        check_invariants(self)
    }

    pub fn is_consistent(&self) -> bool {
        check_invariants(self).is_empty()
    }
}
