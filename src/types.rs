//! Core types for the task board.
//!
//! The board is stored normalized: tasks live in one map keyed by id, and
//! column membership lives only in each column's ordered `task_ids`. Field
//! names serialize in camelCase so persisted snapshots keep the shape the
//! board has always been stored in.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifier of a task (`task-…`).
pub type TaskId = String;
/// Identifier of a column (`todo`, `in-progress`, `done`).
pub type ColumnId = String;

/// Column ids of the default board, in display order.
pub const DEFAULT_COLUMNS: &[&str] = &["todo", "in-progress", "done"];

/// Display title for one of the default columns.
pub fn column_title(column_id: &str) -> &'static str {
    match column_id {
        "todo" => "To Do",
        "in-progress" => "In Progress",
        "done" => "Done",
        _ => "Untitled",
    }
}

/// A free-text review left on a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub content: String,
    pub created_at: i64,
}

/// A timestamped progress report on a subtask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    pub content: String,
    pub created_at: i64,
}

/// A checklist item inside a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: i64,
    #[serde(default)]
    pub reports: Vec<Report>,
}

impl Subtask {
    /// Look up a report by id.
    pub fn report(&self, report_id: &str) -> Option<&Report> {
        self.reports.iter().find(|r| r.id == report_id)
    }
}

/// An image attached to a task.
///
/// `data` is the encoded payload (usually a `data:` URL) produced by image
/// ingestion; the board never decodes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: String,
    pub name: String,
    pub data: String,
    pub created_at: i64,
}

/// A task card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    #[serde(default)]
    pub images: Vec<Image>,
}

impl Task {
    /// Create a task with no reviews, subtasks or images.
    pub fn new(
        id: impl Into<TaskId>,
        title: impl Into<String>,
        description: impl Into<String>,
        created_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            created_at,
            updated_at: None,
            reviews: Vec::new(),
            subtasks: Vec::new(),
            images: Vec::new(),
        }
    }

    pub fn review(&self, review_id: &str) -> Option<&Review> {
        self.reviews.iter().find(|r| r.id == review_id)
    }

    pub fn subtask(&self, subtask_id: &str) -> Option<&Subtask> {
        self.subtasks.iter().find(|s| s.id == subtask_id)
    }

    pub fn image(&self, image_id: &str) -> Option<&Image> {
        self.images.iter().find(|i| i.id == image_id)
    }

    /// Number of completed subtasks and total subtasks.
    pub fn subtask_progress(&self) -> (usize, usize) {
        let done = self.subtasks.iter().filter(|s| s.completed).count();
        (done, self.subtasks.len())
    }
}

/// A named, ordered bucket of task ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
    #[serde(default)]
    pub task_ids: Vec<TaskId>,
}

impl Column {
    /// Create an empty column.
    pub fn new(id: impl Into<ColumnId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            task_ids: Vec::new(),
        }
    }

    /// Position of a task in this column.
    pub fn position(&self, task_id: &str) -> Option<usize> {
        self.task_ids.iter().position(|id| id == task_id)
    }

    pub fn contains(&self, task_id: &str) -> bool {
        self.position(task_id).is_some()
    }
}

/// The aggregate root: every task, every column, and the column display order.
///
/// This is the whole persisted snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    #[serde(default)]
    pub tasks: BTreeMap<TaskId, Task>,
    pub columns: BTreeMap<ColumnId, Column>,
    pub column_order: Vec<ColumnId>,
}

impl Default for Board {
    /// Three empty columns: "todo", "in-progress", "done".
    fn default() -> Self {
        let columns = DEFAULT_COLUMNS
            .iter()
            .map(|id| (id.to_string(), Column::new(*id, column_title(id))))
            .collect();

        Self {
            tasks: BTreeMap::new(),
            columns,
            column_order: DEFAULT_COLUMNS.iter().map(|id| id.to_string()).collect(),
        }
    }
}

impl Board {
    /// Parse a board from its JSON snapshot form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to JSON with pretty formatting.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.get(task_id)
    }

    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.get(column_id)
    }

    /// Columns in display order. Ids in `column_order` without a column are skipped.
    pub fn ordered_columns(&self) -> impl Iterator<Item = &Column> {
        self.column_order
            .iter()
            .filter_map(move |id| self.columns.get(id))
    }

    /// Tasks of a column in display order.
    pub fn tasks_in(&self, column_id: &str) -> Vec<&Task> {
        self.columns
            .get(column_id)
            .map(|c| c.task_ids.iter().filter_map(|id| self.tasks.get(id)).collect())
            .unwrap_or_default()
    }

    /// Sum of `task_ids` lengths across all columns.
    pub fn placed_task_count(&self) -> usize {
        self.columns.values().map(|c| c.task_ids.len()).sum()
    }
}

/// Aggregate counts for a board summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total_tasks: usize,
    /// Task counts per column, in display order.
    pub tasks_by_column: Vec<(ColumnId, usize)>,
    pub total_subtasks: usize,
    pub completed_subtasks: usize,
    pub total_reviews: usize,
    pub total_images: usize,
}

impl Stats {
    /// Compute statistics for a board.
    pub fn of(board: &Board) -> Self {
        let mut stats = Stats {
            total_tasks: board.tasks.len(),
            tasks_by_column: board
                .ordered_columns()
                .map(|c| (c.id.clone(), c.task_ids.len()))
                .collect(),
            ..Default::default()
        };

        for task in board.tasks.values() {
            let (done, total) = task.subtask_progress();
            stats.completed_subtasks += done;
            stats.total_subtasks += total;
            stats.total_reviews += task.reviews.len();
            stats.total_images += task.images.len();
        }

        stats
    }
}
