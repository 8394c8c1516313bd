//! The board facade.
//!
//! [`BoardStore`] is the single owner of the current snapshot. It validates
//! input, assigns ids and timestamps, builds a [`Command`], runs it through
//! the reducer and publishes the result. Load and save stay explicit: the
//! caller loads a board from a [`SnapshotStore`] and attaches the store as a
//! subscriber.

use crate::command::Command;
use crate::error::BoardResult;
use crate::ids::{Clock, EntityKind, IdGenerator, SystemClock, UuidIds};
use crate::ingest::ImagePayload;
use crate::persistence::SnapshotStore;
use crate::reducer;
use crate::subscriptions::{BoardChange, MutationKind, SubscriptionId, SubscriptionManager};
use crate::types::{Board, ColumnId, Subtask, TaskId};
use crate::validate::{normalize_description, require_content, require_title};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Owner of the board state and its subscribers.
pub struct BoardStore {
    state: Arc<Board>,
    ids: Box<dyn IdGenerator + Send>,
    clock: Box<dyn Clock + Send>,
    subscriptions: SubscriptionManager,
}

impl BoardStore {
    /// Wrap a board, using UUIDv7 ids and the system clock.
    pub fn new(board: Board) -> Self {
        Self::with_generators(board, UuidIds, SystemClock::default())
    }

    /// Wrap a board with explicit id and time sources.
    pub fn with_generators(
        board: Board,
        ids: impl IdGenerator + Send + 'static,
        clock: impl Clock + Send + 'static,
    ) -> Self {
        Self {
            state: Arc::new(board),
            ids: Box::new(ids),
            clock: Box::new(clock),
            subscriptions: SubscriptionManager::new(),
        }
    }

    /// Load the initial board from a snapshot store.
    pub fn load(snapshots: &dyn SnapshotStore) -> Self {
        Self::new(snapshots.load())
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<Board> {
        Arc::clone(&self.state)
    }

    /// Borrow the current board.
    pub fn board(&self) -> &Board {
        &self.state
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&BoardChange) + Send + 'static,
    {
        self.subscriptions.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscriptions.unsubscribe(id)
    }

    /// Apply a command and publish the new snapshot if it changed anything.
    /// Returns whether the command took effect.
    pub fn dispatch(&mut self, command: Command) -> bool {
        let next = reducer::apply(&self.state, &command);
        if Arc::ptr_eq(&next, &self.state) {
            return false;
        }

        debug!(command = command.name(), "board changed");
        self.state = next;
        let change = BoardChange {
            kind: MutationKind::of(&command),
            task_id: command.task_id().map(str::to_string),
            snapshot: Arc::clone(&self.state),
        };
        self.subscriptions.publish(&change);
        true
    }

    // =========================================================================
    // Tasks
    // =========================================================================

    /// Create a task at the end of `column_id` and return its id.
    ///
    /// The id is returned before any subscriber sees the change, so callers
    /// can open the new task right away.
    pub fn add_task(
        &mut self,
        column_id: &str,
        title: &str,
        description: &str,
    ) -> BoardResult<TaskId> {
        let title = require_title("Task title", title)?;
        let task_id = self.ids.next_id(EntityKind::Task);
        let at = self.clock.now();

        self.dispatch(Command::AddTask {
            column_id: column_id.to_string(),
            task_id: task_id.clone(),
            title,
            description: normalize_description(description),
            at,
        });
        Ok(task_id)
    }

    pub fn delete_task(&mut self, task_id: &str) -> bool {
        let deleted = self.dispatch(Command::DeleteTask {
            task_id: task_id.to_string(),
        });
        if deleted {
            info!(task_id, "task deleted");
        }
        deleted
    }

    pub fn update_task(&mut self, task_id: &str, title: &str, description: &str) -> BoardResult<bool> {
        let title = require_title("Task title", title)?;
        let at = self.clock.now();
        Ok(self.dispatch(Command::UpdateTask {
            task_id: task_id.to_string(),
            title,
            description: normalize_description(description),
            at,
        }))
    }

    pub fn move_task(
        &mut self,
        task_id: &str,
        source_column_id: &str,
        dest_column_id: &str,
        source_index: usize,
        dest_index: usize,
    ) -> bool {
        self.dispatch(Command::MoveTask {
            task_id: task_id.to_string(),
            source_column_id: source_column_id.to_string(),
            dest_column_id: dest_column_id.to_string(),
            source_index,
            dest_index,
        })
    }

    /// Move a task to `dest_column_id` wherever it currently is.
    /// `dest_index` defaults to the end of the destination column.
    pub fn move_task_to(
        &mut self,
        task_id: &str,
        dest_column_id: &str,
        dest_index: Option<usize>,
    ) -> bool {
        let Some(source) = self.state.owning_column(task_id).cloned() else {
            return false;
        };
        let source_index = self
            .state
            .column(&source)
            .and_then(|c| c.position(task_id))
            .unwrap_or_default();
        let dest_len = self
            .state
            .column(dest_column_id)
            .map(|c| c.task_ids.len())
            .unwrap_or_default();

        self.move_task(
            task_id,
            &source,
            dest_column_id,
            source_index,
            dest_index.unwrap_or(dest_len),
        )
    }

    // =========================================================================
    // Reviews
    // =========================================================================

    pub fn add_review(&mut self, task_id: &str, content: &str) -> BoardResult<String> {
        let content = require_content("Review", content)?;
        let review_id = self.ids.next_id(EntityKind::Review);
        let at = self.clock.now();
        self.dispatch(Command::AddReview {
            task_id: task_id.to_string(),
            review_id: review_id.clone(),
            content,
            at,
        });
        Ok(review_id)
    }

    pub fn delete_review(&mut self, task_id: &str, review_id: &str) -> bool {
        self.dispatch(Command::DeleteReview {
            task_id: task_id.to_string(),
            review_id: review_id.to_string(),
        })
    }

    // =========================================================================
    // Subtasks
    // =========================================================================

    pub fn add_subtask(&mut self, task_id: &str, title: &str) -> BoardResult<String> {
        let title = require_title("Subtask title", title)?;
        let subtask_id = self.ids.next_id(EntityKind::Subtask);
        let at = self.clock.now();
        self.dispatch(Command::AddSubtask {
            task_id: task_id.to_string(),
            subtask_id: subtask_id.clone(),
            title,
            at,
        });
        Ok(subtask_id)
    }

    pub fn update_subtask(
        &mut self,
        task_id: &str,
        subtask_id: &str,
        title: &str,
    ) -> BoardResult<bool> {
        let title = require_title("Subtask title", title)?;
        Ok(self.dispatch(Command::UpdateSubtask {
            task_id: task_id.to_string(),
            subtask_id: subtask_id.to_string(),
            title,
        }))
    }

    pub fn delete_subtask(&mut self, task_id: &str, subtask_id: &str) -> bool {
        self.dispatch(Command::DeleteSubtask {
            task_id: task_id.to_string(),
            subtask_id: subtask_id.to_string(),
        })
    }

    pub fn toggle_subtask(&mut self, task_id: &str, subtask_id: &str) -> bool {
        self.dispatch(Command::ToggleSubtask {
            task_id: task_id.to_string(),
            subtask_id: subtask_id.to_string(),
        })
    }

    /// Replace a task's subtask list with a reordering of it.
    ///
    /// The new list must hold exactly the task's current subtask ids, each
    /// once. Anything else is rejected without dispatching.
    pub fn reorder_subtasks(&mut self, task_id: &str, subtasks: Vec<Subtask>) -> bool {
        let is_permutation = {
            let Some(task) = self.state.task(task_id) else {
                return false;
            };
            let current: HashSet<&str> = task.subtasks.iter().map(|s| s.id.as_str()).collect();
            let mut proposed = HashSet::new();
            subtasks.len() == task.subtasks.len()
                && subtasks
                    .iter()
                    .all(|s| current.contains(s.id.as_str()) && proposed.insert(s.id.as_str()))
        };
        if !is_permutation {
            warn!(task_id, "rejected subtask reorder that changes the id set");
            return false;
        }

        self.dispatch(Command::ReorderSubtasks {
            task_id: task_id.to_string(),
            subtasks,
        })
    }

    // =========================================================================
    // Subtask reports
    // =========================================================================

    pub fn add_subtask_report(
        &mut self,
        task_id: &str,
        subtask_id: &str,
        content: &str,
    ) -> BoardResult<String> {
        let content = require_content("Report", content)?;
        let report_id = self.ids.next_id(EntityKind::Report);
        let at = self.clock.now();
        self.dispatch(Command::AddSubtaskReport {
            task_id: task_id.to_string(),
            subtask_id: subtask_id.to_string(),
            report_id: report_id.clone(),
            content,
            at,
        });
        Ok(report_id)
    }

    pub fn delete_subtask_report(&mut self, task_id: &str, subtask_id: &str, report_id: &str) -> bool {
        self.dispatch(Command::DeleteSubtaskReport {
            task_id: task_id.to_string(),
            subtask_id: subtask_id.to_string(),
            report_id: report_id.to_string(),
        })
    }

    // =========================================================================
    // Images
    // =========================================================================

    /// Attach an already-ingested image.
    pub fn add_image(&mut self, task_id: &str, image: ImagePayload) -> String {
        let image_id = self.ids.next_id(EntityKind::Image);
        let at = self.clock.now();
        self.dispatch(Command::AddImage {
            task_id: task_id.to_string(),
            image_id: image_id.clone(),
            name: image.name,
            data: image.data,
            at,
        });
        image_id
    }

    pub fn delete_image(&mut self, task_id: &str, image_id: &str) -> bool {
        self.dispatch(Command::DeleteImage {
            task_id: task_id.to_string(),
            image_id: image_id.to_string(),
        })
    }

    // =========================================================================
    // Whole board
    // =========================================================================

    /// Replace the whole board, e.g. after an import.
    pub fn replace(&mut self, board: Board) -> bool {
        self.dispatch(Command::SetBoard {
            board: Box::new(board),
        })
    }

    /// Column ids in display order.
    pub fn column_order(&self) -> Vec<ColumnId> {
        self.state.column_order.clone()
    }
}

impl std::fmt::Debug for BoardStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoardStore")
            .field("tasks", &self.state.tasks.len())
            .field("subscriptions", &self.subscriptions)
            .finish()
    }
}
