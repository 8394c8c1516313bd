//! Board commands.
//!
//! Every mutation of the board is one [`Command`]. Ids and timestamps are
//! assigned by the facade before dispatch and carried in the command, so
//! applying a command is a pure function of the board and the command.

use crate::types::{Board, ColumnId, Subtask, TaskId};
use serde::{Deserialize, Serialize};

/// A single intent to mutate the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    AddTask {
        column_id: ColumnId,
        task_id: TaskId,
        title: String,
        description: String,
        at: i64,
    },
    DeleteTask {
        task_id: TaskId,
    },
    UpdateTask {
        task_id: TaskId,
        title: String,
        description: String,
        at: i64,
    },
    /// Relocate a task within or across columns.
    ///
    /// `source_index` is a hint only; the task is located by id.
    MoveTask {
        task_id: TaskId,
        source_column_id: ColumnId,
        dest_column_id: ColumnId,
        source_index: usize,
        dest_index: usize,
    },
    AddReview {
        task_id: TaskId,
        review_id: String,
        content: String,
        at: i64,
    },
    DeleteReview {
        task_id: TaskId,
        review_id: String,
    },
    AddSubtask {
        task_id: TaskId,
        subtask_id: String,
        title: String,
        at: i64,
    },
    UpdateSubtask {
        task_id: TaskId,
        subtask_id: String,
        title: String,
    },
    DeleteSubtask {
        task_id: TaskId,
        subtask_id: String,
    },
    ToggleSubtask {
        task_id: TaskId,
        subtask_id: String,
    },
    /// Replace the subtask list wholesale. The caller keeps the id set intact.
    ReorderSubtasks {
        task_id: TaskId,
        subtasks: Vec<Subtask>,
    },
    AddSubtaskReport {
        task_id: TaskId,
        subtask_id: String,
        report_id: String,
        content: String,
        at: i64,
    },
    DeleteSubtaskReport {
        task_id: TaskId,
        subtask_id: String,
        report_id: String,
    },
    AddImage {
        task_id: TaskId,
        image_id: String,
        name: String,
        data: String,
        at: i64,
    },
    DeleteImage {
        task_id: TaskId,
        image_id: String,
    },
    /// Replace the whole board (import).
    SetBoard {
        board: Box<Board>,
    },
}

impl Command {
    /// Stable name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddTask { .. } => "add_task",
            Command::DeleteTask { .. } => "delete_task",
            Command::UpdateTask { .. } => "update_task",
            Command::MoveTask { .. } => "move_task",
            Command::AddReview { .. } => "add_review",
            Command::DeleteReview { .. } => "delete_review",
            Command::AddSubtask { .. } => "add_subtask",
            Command::UpdateSubtask { .. } => "update_subtask",
            Command::DeleteSubtask { .. } => "delete_subtask",
            Command::ToggleSubtask { .. } => "toggle_subtask",
            Command::ReorderSubtasks { .. } => "reorder_subtasks",
            Command::AddSubtaskReport { .. } => "add_subtask_report",
            Command::DeleteSubtaskReport { .. } => "delete_subtask_report",
            Command::AddImage { .. } => "add_image",
            Command::DeleteImage { .. } => "delete_image",
            Command::SetBoard { .. } => "set_board",
        }
    }

    /// The task this command targets, if any.
    pub fn task_id(&self) -> Option<&str> {
        match self {
            Command::AddTask { task_id, .. }
            | Command::DeleteTask { task_id }
            | Command::UpdateTask { task_id, .. }
            | Command::MoveTask { task_id, .. }
            | Command::AddReview { task_id, .. }
            | Command::DeleteReview { task_id, .. }
            | Command::AddSubtask { task_id, .. }
            | Command::UpdateSubtask { task_id, .. }
            | Command::DeleteSubtask { task_id, .. }
            | Command::ToggleSubtask { task_id, .. }
            | Command::ReorderSubtasks { task_id, .. }
            | Command::AddSubtaskReport { task_id, .. }
            | Command::DeleteSubtaskReport { task_id, .. }
            | Command::AddImage { task_id, .. }
            | Command::DeleteImage { task_id, .. } => Some(task_id),
            Command::SetBoard { .. } => None,
        }
    }
}
