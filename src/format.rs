//! Output formatting for the board: markdown and JSON.

use crate::config::DisplayFormat;
use crate::types::{Board, Stats, Task};
use chrono::{TimeZone, Utc};

/// Output format for rendered views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Markdown,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "markdown" | "md" => Some(OutputFormat::Markdown),
            _ => None,
        }
    }
}

impl From<DisplayFormat> for OutputFormat {
    fn from(format: DisplayFormat) -> Self {
        match format {
            DisplayFormat::Json => OutputFormat::Json,
            DisplayFormat::Markdown => OutputFormat::Markdown,
        }
    }
}

/// Format a millisecond timestamp as `YYYY-MM-DD HH:MM`.
pub fn format_timestamp(ms: i64) -> String {
    match Utc.timestamp_millis_opt(ms).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => ms.to_string(),
    }
}

/// Format the whole board as markdown, one section per column.
pub fn format_board_markdown(board: &Board) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Board ({} tasks)\n\n", board.tasks.len()));

    for column in board.ordered_columns() {
        md.push_str(&format!(
            "## {} ({})\n\n",
            column.title,
            column.task_ids.len()
        ));
        for task in board.tasks_in(&column.id) {
            md.push_str(&format_task_short(task));
        }
        md.push('\n');
    }

    md
}

/// Format a task in short form for column lists.
fn format_task_short(task: &Task) -> String {
    let (done, total) = task.subtask_progress();
    let progress = if total > 0 {
        format!(" [{}/{}]", done, total)
    } else {
        String::new()
    };

    let extras = match (task.reviews.len(), task.images.len()) {
        (0, 0) => String::new(),
        (r, 0) => format!(" ({} reviews)", r),
        (0, i) => format!(" ({} images)", i),
        (r, i) => format!(" ({} reviews, {} images)", r, i),
    };

    format!("- {} `{}`{}{}\n", task.title, task.id, progress, extras)
}

/// Format a single task with all its children as markdown.
pub fn format_task_markdown(task: &Task, column_title: Option<&str>) -> String {
    let mut md = String::new();

    md.push_str(&format!("## Task: {}\n", task.title));
    md.push_str(&format!("- **id**: `{}`\n", task.id));
    if let Some(column) = column_title {
        md.push_str(&format!("- **column**: {}\n", column));
    }
    md.push_str(&format!("- **created**: {}\n", format_timestamp(task.created_at)));
    if let Some(updated) = task.updated_at {
        md.push_str(&format!("- **updated**: {}\n", format_timestamp(updated)));
    }

    if !task.description.is_empty() {
        md.push_str("\n### Description\n");
        md.push_str(&task.description);
        md.push('\n');
    }

    if !task.subtasks.is_empty() {
        let (done, total) = task.subtask_progress();
        md.push_str(&format!("\n### Subtasks ({}/{})\n", done, total));
        for subtask in &task.subtasks {
            let mark = if subtask.completed { "x" } else { " " };
            md.push_str(&format!("- [{}] {} `{}`\n", mark, subtask.title, subtask.id));
            for report in &subtask.reports {
                md.push_str(&format!(
                    "  - {} _{}_ `{}`\n",
                    report.content,
                    format_timestamp(report.created_at),
                    report.id
                ));
            }
        }
    }

    if !task.reviews.is_empty() {
        md.push_str(&format!("\n### Reviews ({})\n", task.reviews.len()));
        for review in &task.reviews {
            md.push_str(&format!(
                "- {} _{}_ `{}`\n",
                review.content,
                format_timestamp(review.created_at),
                review.id
            ));
        }
    }

    if !task.images.is_empty() {
        md.push_str(&format!("\n### Images ({})\n", task.images.len()));
        for image in &task.images {
            md.push_str(&format!("- {} `{}`\n", image.name, image.id));
        }
    }

    md
}

/// Format board statistics as markdown.
pub fn format_stats_markdown(stats: &Stats) -> String {
    let mut md = String::new();
    md.push_str("# Stats\n");
    md.push_str(&format!("- **tasks**: {}\n", stats.total_tasks));
    for (column, count) in &stats.tasks_by_column {
        md.push_str(&format!("  - {}: {}\n", column, count));
    }
    md.push_str(&format!(
        "- **subtasks**: {}/{} done\n",
        stats.completed_subtasks, stats.total_subtasks
    ));
    md.push_str(&format!("- **reviews**: {}\n", stats.total_reviews));
    md.push_str(&format!("- **images**: {}\n", stats.total_images));
    md
}
