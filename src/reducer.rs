//! The command processor.
//!
//! [`apply`] is the only writer of board state. It is total: a command that
//! targets something that no longer exists returns the input snapshot
//! unchanged (the same `Arc`). A command that takes effect produces a new
//! snapshot and leaves the old one untouched.

use crate::command::Command;
use crate::types::{Board, Image, Report, Review, Subtask, Task};
use std::sync::Arc;
use tracing::{debug, trace};

/// Apply a command to a snapshot.
///
/// Returns `Arc::clone(state)` when the command has no effect.
pub fn apply(state: &Arc<Board>, command: &Command) -> Arc<Board> {
    match reduce(state, command) {
        Some(next) => {
            trace!(command = command.name(), "command applied");
            Arc::new(next)
        }
        None => {
            debug!(
                command = command.name(),
                task_id = command.task_id().unwrap_or("-"),
                "command had no effect"
            );
            Arc::clone(state)
        }
    }
}

/// Compute the next board, or `None` if the command does not apply.
fn reduce(board: &Board, command: &Command) -> Option<Board> {
    match command {
        Command::AddTask {
            column_id,
            task_id,
            title,
            description,
            at,
        } => add_task(board, column_id, task_id, title, description, *at),

        Command::DeleteTask { task_id } => delete_task(board, task_id),

        Command::UpdateTask {
            task_id,
            title,
            description,
            at,
        } => with_task(board, task_id, |task| {
            task.title = title.clone();
            task.description = description.clone();
            task.updated_at = Some((*at).max(task.created_at));
            true
        }),

        Command::MoveTask {
            task_id,
            source_column_id,
            dest_column_id,
            source_index,
            dest_index,
        } => move_task(
            board,
            task_id,
            source_column_id,
            dest_column_id,
            *source_index,
            *dest_index,
        ),

        Command::AddReview {
            task_id,
            review_id,
            content,
            at,
        } => with_task(board, task_id, |task| {
            if task.review(review_id).is_some() {
                return false;
            }
            task.reviews.push(Review {
                id: review_id.clone(),
                content: content.clone(),
                created_at: *at,
            });
            true
        }),

        Command::DeleteReview { task_id, review_id } => with_task(board, task_id, |task| {
            remove_where(&mut task.reviews, |r| &r.id == review_id)
        }),

        Command::AddSubtask {
            task_id,
            subtask_id,
            title,
            at,
        } => with_task(board, task_id, |task| {
            if task.subtask(subtask_id).is_some() {
                return false;
            }
            task.subtasks.push(Subtask {
                id: subtask_id.clone(),
                title: title.clone(),
                completed: false,
                created_at: *at,
                reports: Vec::new(),
            });
            true
        }),

        Command::UpdateSubtask {
            task_id,
            subtask_id,
            title,
        } => with_subtask(board, task_id, subtask_id, |subtask| {
            subtask.title = title.clone();
            true
        }),

        Command::DeleteSubtask {
            task_id,
            subtask_id,
        } => with_task(board, task_id, |task| {
            remove_where(&mut task.subtasks, |s| &s.id == subtask_id)
        }),

        Command::ToggleSubtask {
            task_id,
            subtask_id,
        } => with_subtask(board, task_id, subtask_id, |subtask| {
            subtask.completed = !subtask.completed;
            true
        }),

        Command::ReorderSubtasks { task_id, subtasks } => with_task(board, task_id, |task| {
            if task.subtasks == *subtasks {
                return false;
            }
            task.subtasks = subtasks.clone();
            true
        }),

        Command::AddSubtaskReport {
            task_id,
            subtask_id,
            report_id,
            content,
            at,
        } => with_subtask(board, task_id, subtask_id, |subtask| {
            if subtask.report(report_id).is_some() {
                return false;
            }
            subtask.reports.push(Report {
                id: report_id.clone(),
                content: content.clone(),
                created_at: *at,
            });
            true
        }),

        Command::DeleteSubtaskReport {
            task_id,
            subtask_id,
            report_id,
        } => with_subtask(board, task_id, subtask_id, |subtask| {
            remove_where(&mut subtask.reports, |r| &r.id == report_id)
        }),

        Command::AddImage {
            task_id,
            image_id,
            name,
            data,
            at,
        } => with_task(board, task_id, |task| {
            if task.image(image_id).is_some() {
                return false;
            }
            task.images.push(Image {
                id: image_id.clone(),
                name: name.clone(),
                data: data.clone(),
                created_at: *at,
            });
            true
        }),

        Command::DeleteImage { task_id, image_id } => with_task(board, task_id, |task| {
            remove_where(&mut task.images, |i| &i.id == image_id)
        }),

        Command::SetBoard { board: replacement } => {
            if **replacement == *board || !replacement.is_consistent() {
                None
            } else {
                Some((**replacement).clone())
            }
        }
    }
}

/// Run `edit` against a copy of the task and store it in a new board.
/// `edit` returns `false` when it changed nothing.
fn with_task(board: &Board, task_id: &str, edit: impl FnOnce(&mut Task) -> bool) -> Option<Board> {
    let mut task = board.tasks.get(task_id)?.clone();
    if !edit(&mut task) {
        return None;
    }

    let mut next = board.clone();
    next.tasks.insert(task_id.to_string(), task);
    Some(next)
}

/// Like [`with_task`], scoped to one subtask of the task.
fn with_subtask(
    board: &Board,
    task_id: &str,
    subtask_id: &str,
    edit: impl FnOnce(&mut Subtask) -> bool,
) -> Option<Board> {
    with_task(board, task_id, |task| {
        match task.subtasks.iter_mut().find(|s| s.id == subtask_id) {
            Some(subtask) => edit(subtask),
            None => false,
        }
    })
}

/// Remove every element matching `pred`. Returns whether anything was removed.
fn remove_where<T>(items: &mut Vec<T>, pred: impl Fn(&T) -> bool) -> bool {
    let before = items.len();
    items.retain(|item| !pred(item));
    items.len() != before
}

fn add_task(
    board: &Board,
    column_id: &str,
    task_id: &str,
    title: &str,
    description: &str,
    at: i64,
) -> Option<Board> {
    if !board.has_column(column_id) || board.has_task(task_id) {
        return None;
    }

    let mut next = board.clone();
    next.tasks
        .insert(task_id.to_string(), Task::new(task_id, title, description, at));
    next.columns
        .get_mut(column_id)?
        .task_ids
        .push(task_id.to_string());
    Some(next)
}

fn delete_task(board: &Board, task_id: &str) -> Option<Board> {
    // Both removals happen on the same copy, so they land together or not at all.
    let column_id = board.owning_column(task_id)?.clone();

    let mut next = board.clone();
    next.tasks.remove(task_id);
    next.columns
        .get_mut(&column_id)?
        .task_ids
        .retain(|id| id != task_id);
    Some(next)
}

/// Relocate `task_id` from `source_id` to position `dest_index` of `dest_id`.
///
/// The task is located by identity in the source column; `source_index` is
/// only compared for diagnostics, since a drag-over dispatch may have already
/// moved the task by the time drag-end reports its original index.
/// `dest_index` is clamped to the destination length.
fn move_task(
    board: &Board,
    task_id: &str,
    source_id: &str,
    dest_id: &str,
    source_index: usize,
    dest_index: usize,
) -> Option<Board> {
    let source = board.columns.get(source_id)?;
    let dest = board.columns.get(dest_id)?;
    let current = source.position(task_id)?;

    if current != source_index {
        debug!(
            task_id,
            source_index, current, "stale source index, locating task by id"
        );
    }

    let mut next = board.clone();

    if source_id == dest_id {
        let mut task_ids = source.task_ids.clone();
        task_ids.remove(current);
        let at = dest_index.min(task_ids.len());
        task_ids.insert(at, task_id.to_string());

        if task_ids == source.task_ids {
            return None;
        }
        next.columns.get_mut(source_id)?.task_ids = task_ids;
    } else {
        if dest.contains(task_id) {
            return None;
        }

        let mut source_ids = source.task_ids.clone();
        source_ids.remove(current);

        let mut dest_ids = dest.task_ids.clone();
        let at = dest_index.min(dest_ids.len());
        dest_ids.insert(at, task_id.to_string());

        next.columns.get_mut(source_id)?.task_ids = source_ids;
        next.columns.get_mut(dest_id)?.task_ids = dest_ids;
    }

    Some(next)
}
