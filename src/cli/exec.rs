//! Execution of CLI commands against a board store.

use super::{Command, ImageCommand, ReportCommand, ReviewCommand, SubtaskCommand};
use crate::config::Config;
use crate::export::Snapshot;
use crate::facade::BoardStore;
use crate::format::{
    OutputFormat, format_board_markdown, format_stats_markdown, format_task_markdown,
};
use crate::ingest::{decode_data, ingest_file};
use crate::types::{Board, Stats};
use anyhow::{Result, anyhow};
use std::fs::File;
use tracing::info;

/// Resolve a task reference: an exact id, or a unique id prefix.
///
/// Unknown references are returned unchanged so the command becomes a no-op.
pub fn resolve_task_id(board: &Board, reference: &str) -> Result<String> {
    if board.has_task(reference) {
        return Ok(reference.to_string());
    }

    let matches: Vec<&String> = board
        .tasks
        .keys()
        .filter(|id| id.starts_with(reference))
        .collect();

    match matches.as_slice() {
        [] => Ok(reference.to_string()),
        [only] => Ok((*only).clone()),
        _ => Err(anyhow!(
            "'{}' matches {} tasks; use a longer id",
            reference,
            matches.len()
        )),
    }
}

/// Resolve a task reference that must exist, for commands that create
/// something under it.
fn require_task(board: &Board, reference: &str) -> Result<String> {
    let id = resolve_task_id(board, reference)?;
    if !board.has_task(&id) {
        return Err(anyhow!("Task not found: {}", reference));
    }
    Ok(id)
}

fn changed(applied: bool, what: &str) -> String {
    if applied {
        format!("{}\n", what)
    } else {
        "No change\n".to_string()
    }
}

fn render_board(board: &Board, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => board.to_json_pretty()? + "\n",
        OutputFormat::Markdown => format_board_markdown(board),
    })
}

/// Run one command and return the text to print.
pub fn execute(
    store: &mut BoardStore,
    command: Command,
    config: &Config,
    format: OutputFormat,
) -> Result<String> {
    let board = store.snapshot();

    match command {
        Command::Show => render_board(&board, format),

        Command::Task { task } => {
            let id = resolve_task_id(&board, &task)?;
            let task = board
                .task(&id)
                .ok_or_else(|| anyhow!("Task not found: {}", task))?;
            let column_title = board
                .owning_column(&id)
                .and_then(|c| board.column(c))
                .map(|c| c.title.as_str());
            Ok(match format {
                OutputFormat::Json => serde_json::to_string_pretty(task)? + "\n",
                OutputFormat::Markdown => format_task_markdown(task, column_title),
            })
        }

        Command::Stats => {
            let stats = Stats::of(&board);
            Ok(match format {
                OutputFormat::Json => serde_json::to_string_pretty(&stats)? + "\n",
                OutputFormat::Markdown => format_stats_markdown(&stats),
            })
        }

        Command::Add {
            column,
            title,
            description,
        } => {
            if !board.has_column(&column) {
                return Err(anyhow!(
                    "Unknown column '{}'. Columns: {}",
                    column,
                    board.column_order.join(", ")
                ));
            }
            let id = store.add_task(&column, &title, &description)?;
            Ok(format!("{}\n", id))
        }

        Command::Edit {
            task,
            title,
            description,
        } => {
            let id = resolve_task_id(&board, &task)?;
            let applied = store.update_task(&id, &title, &description)?;
            Ok(changed(applied, "Updated"))
        }

        Command::Delete { task } => {
            let id = resolve_task_id(&board, &task)?;
            Ok(changed(store.delete_task(&id), "Deleted"))
        }

        Command::Move {
            task,
            column,
            index,
        } => {
            let id = resolve_task_id(&board, &task)?;
            Ok(changed(store.move_task_to(&id, &column, index), "Moved"))
        }

        Command::Review(cmd) => match cmd {
            ReviewCommand::Add { task, content } => {
                let id = require_task(&board, &task)?;
                Ok(format!("{}\n", store.add_review(&id, &content)?))
            }
            ReviewCommand::Delete { task, review } => {
                let id = resolve_task_id(&board, &task)?;
                Ok(changed(store.delete_review(&id, &review), "Deleted"))
            }
        },

        Command::Subtask(cmd) => match cmd {
            SubtaskCommand::Add { task, title } => {
                let id = require_task(&board, &task)?;
                Ok(format!("{}\n", store.add_subtask(&id, &title)?))
            }
            SubtaskCommand::Edit {
                task,
                subtask,
                title,
            } => {
                let id = resolve_task_id(&board, &task)?;
                Ok(changed(store.update_subtask(&id, &subtask, &title)?, "Updated"))
            }
            SubtaskCommand::Delete { task, subtask } => {
                let id = resolve_task_id(&board, &task)?;
                Ok(changed(store.delete_subtask(&id, &subtask), "Deleted"))
            }
            SubtaskCommand::Toggle { task, subtask } => {
                let id = resolve_task_id(&board, &task)?;
                Ok(changed(store.toggle_subtask(&id, &subtask), "Toggled"))
            }
            SubtaskCommand::Move(args) => {
                let id = resolve_task_id(&board, &args.task)?;
                let Some(current) = board.task(&id) else {
                    return Ok(changed(false, ""));
                };
                let mut subtasks = current.subtasks.clone();
                let Some(from) = subtasks.iter().position(|s| s.id == args.subtask) else {
                    return Ok(changed(false, ""));
                };
                let item = subtasks.remove(from);
                let to = args.index.min(subtasks.len());
                subtasks.insert(to, item);
                let applied = from != to && store.reorder_subtasks(&id, subtasks);
                Ok(changed(applied, "Moved"))
            }
        },

        Command::Report(cmd) => match cmd {
            ReportCommand::Add {
                task,
                subtask,
                content,
            } => {
                let id = require_task(&board, &task)?;
                if board.task(&id).and_then(|t| t.subtask(&subtask)).is_none() {
                    return Err(anyhow!("Subtask not found: {}", subtask));
                }
                Ok(format!(
                    "{}\n",
                    store.add_subtask_report(&id, &subtask, &content)?
                ))
            }
            ReportCommand::Delete {
                task,
                subtask,
                report,
            } => {
                let id = resolve_task_id(&board, &task)?;
                Ok(changed(
                    store.delete_subtask_report(&id, &subtask, &report),
                    "Deleted",
                ))
            }
        },

        Command::Image(cmd) => match cmd {
            ImageCommand::Add { task, file } => {
                let id = require_task(&board, &task)?;
                let payload = ingest_file(&file, &config.images)?;
                Ok(format!("{}\n", store.add_image(&id, payload)))
            }
            ImageCommand::Delete { task, image } => {
                let id = resolve_task_id(&board, &task)?;
                Ok(changed(store.delete_image(&id, &image), "Deleted"))
            }
            ImageCommand::Save {
                task,
                image,
                output,
            } => {
                let id = resolve_task_id(&board, &task)?;
                let image = board
                    .task(&id)
                    .and_then(|t| t.image(&image))
                    .ok_or_else(|| anyhow!("Image not found: {}", image))?;
                std::fs::write(&output, decode_data(&image.data)?)?;
                Ok(format!("Saved {}\n", output.display()))
            }
        },

        Command::Export(args) => {
            let snapshot = Snapshot::new((*board).clone());
            let gzip = args.should_compress();
            match args.output {
                Some(path) => {
                    snapshot.write_to(File::create(&path)?, gzip)?;
                    info!(path = %path.display(), gzip, "exported board");
                    Ok(format!("Exported {} tasks to {}\n", board.tasks.len(), path.display()))
                }
                None => {
                    let mut out = Vec::new();
                    snapshot.write_to(&mut out, gzip)?;
                    if gzip {
                        return Err(anyhow!("refusing to print gzip data; use --output"));
                    }
                    Ok(String::from_utf8(out)?)
                }
            }
        }

        Command::Import(args) => {
            let snapshot = Snapshot::from_file(&args.file)?;
            info!(file = %args.file.display(), mode = args.import_mode(), "importing board");
            let summary = format!(
                "{} tasks in {} columns (exported {} by {})",
                snapshot.board.tasks.len(),
                snapshot.board.columns.len(),
                snapshot.exported_at,
                snapshot.exported_by
            );
            if args.dry_run {
                return Ok(format!("Would import {}\n", summary));
            }
            let applied = store.replace(snapshot.board);
            Ok(changed(applied, &format!("Imported {}", summary)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::SubtaskMoveArgs;
    use crate::ids::{ManualClock, SequentialIds};
    use std::sync::Arc;

    fn setup_store() -> BoardStore {
        BoardStore::with_generators(
            Board::default(),
            SequentialIds::default(),
            ManualClock::new(0, 1),
        )
    }

    fn run(store: &mut BoardStore, command: Command) -> Result<String> {
        execute(store, command, &Config::default(), OutputFormat::Markdown)
    }

    #[test]
    fn test_add_prints_id() {
        let mut store = setup_store();
        let out = run(
            &mut store,
            Command::Add {
                column: "todo".into(),
                title: "Buy milk".into(),
                description: String::new(),
            },
        )
        .unwrap();
        assert_eq!(out, "task-1\n");
    }

    #[test]
    fn test_add_to_unknown_column_errors() {
        let mut store = setup_store();
        let err = run(
            &mut store,
            Command::Add {
                column: "later".into(),
                title: "x".into(),
                description: String::new(),
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("todo, in-progress, done"));
    }

    #[test]
    fn test_resolve_task_prefix() {
        let mut store = setup_store();
        for title in ["A", "B"] {
            store.add_task("todo", title, "").unwrap();
        }
        let board = store.snapshot();
        assert_eq!(resolve_task_id(&board, "task-2").unwrap(), "task-2");
        assert!(resolve_task_id(&board, "task-").is_err());
        assert_eq!(resolve_task_id(&board, "nope").unwrap(), "nope");
    }

    #[test]
    fn test_child_add_on_unknown_task_errors() {
        let mut store = setup_store();
        let commands = [
            Command::Review(ReviewCommand::Add {
                task: "ghost".into(),
                content: "hi".into(),
            }),
            Command::Subtask(SubtaskCommand::Add {
                task: "ghost".into(),
                title: "step".into(),
            }),
            Command::Report(ReportCommand::Add {
                task: "ghost".into(),
                subtask: "subtask-1".into(),
                content: "done".into(),
            }),
            Command::Image(ImageCommand::Add {
                task: "ghost".into(),
                file: "shot.png".into(),
            }),
        ];

        for command in commands {
            let err = run(&mut store, command).unwrap_err();
            assert_eq!(err.to_string(), "Task not found: ghost");
        }
        assert!(store.board().tasks.is_empty());
    }

    #[test]
    fn test_report_on_unknown_subtask_errors() {
        let mut store = setup_store();
        let task = store.add_task("todo", "A", "").unwrap();
        let before = store.snapshot();

        let err = run(
            &mut store,
            Command::Report(ReportCommand::Add {
                task,
                subtask: "subtask-9".into(),
                content: "progress".into(),
            }),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Subtask not found: subtask-9");
        assert!(Arc::ptr_eq(&before, &store.snapshot()));
    }

    #[test]
    fn test_review_add_prints_id_of_created_review() {
        let mut store = setup_store();
        let task = store.add_task("todo", "A", "").unwrap();
        let out = run(
            &mut store,
            Command::Review(ReviewCommand::Add {
                task: task.clone(),
                content: "Looks good".into(),
            }),
        )
        .unwrap();
        let review_id = out.trim();
        assert!(store.board().task(&task).unwrap().review(review_id).is_some());
    }

    #[test]
    fn test_missing_task_reports_no_change() {
        let mut store = setup_store();
        let out = run(&mut store, Command::Delete { task: "ghost".into() }).unwrap();
        assert_eq!(out, "No change\n");
    }

    #[test]
    fn test_subtask_move_reorders() {
        let mut store = setup_store();
        let task = store.add_task("todo", "A", "").unwrap();
        let s1 = store.add_subtask(&task, "one").unwrap();
        let s2 = store.add_subtask(&task, "two").unwrap();

        let out = run(
            &mut store,
            Command::Subtask(SubtaskCommand::Move(SubtaskMoveArgs {
                task: task.clone(),
                subtask: s2.clone(),
                index: 0,
            })),
        )
        .unwrap();
        assert_eq!(out, "Moved\n");

        let order: Vec<_> = store
            .board()
            .task(&task)
            .unwrap()
            .subtasks
            .iter()
            .map(|s| s.id.clone())
            .collect();
        assert_eq!(order, vec![s2, s1]);
    }

    #[test]
    fn test_export_import_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.json.gz");

        let mut store = setup_store();
        store.add_task("done", "Shipped", "").unwrap();
        run(
            &mut store,
            Command::Export(crate::cli::export::ExportArgs {
                output: Some(path.clone()),
                gzip: false,
            }),
        )
        .unwrap();

        let mut fresh = setup_store();
        let out = run(
            &mut fresh,
            Command::Import(crate::cli::import::ImportArgs {
                file: path,
                dry_run: false,
            }),
        )
        .unwrap();
        assert!(out.starts_with("Imported 1 tasks"));
        assert_eq!(*fresh.snapshot(), *store.snapshot());
    }
}
