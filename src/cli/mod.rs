//! CLI command definitions for task-board
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands;
//! [`exec::execute`] runs one against a board store.

pub mod exec;
pub mod export;
pub mod import;

use clap::{Args, Parser, Subcommand};
use export::ExportArgs;
use import::ImportArgs;
use std::path::PathBuf;

/// Single-user task board
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the board snapshot file (overrides config)
    #[arg(short, long, global = true)]
    pub board: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    /// Output format: markdown (default) or json
    #[arg(short, long, global = true)]
    pub format: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the board (default if no subcommand given)
    Show,

    /// Show one task with its subtasks, reviews and images
    Task {
        task: String,
    },

    /// Show board statistics
    Stats,

    /// Add a task at the end of a column
    Add {
        column: String,
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Change a task's title and description
    Edit {
        task: String,
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Delete a task
    Delete {
        task: String,
    },

    /// Move a task to a column, optionally at a position
    Move {
        task: String,
        column: String,
        /// Zero-based position in the destination column (default: end)
        #[arg(short, long)]
        index: Option<usize>,
    },

    /// Manage reviews on a task
    #[command(subcommand)]
    Review(ReviewCommand),

    /// Manage subtasks on a task
    #[command(subcommand)]
    Subtask(SubtaskCommand),

    /// Manage progress reports on a subtask
    #[command(subcommand)]
    Report(ReportCommand),

    /// Manage images on a task
    #[command(subcommand)]
    Image(ImageCommand),

    /// Export the board to a structured JSON file
    Export(ExportArgs),

    /// Replace the board with an exported file
    Import(ImportArgs),
}

#[derive(Subcommand, Debug)]
pub enum ReviewCommand {
    Add { task: String, content: String },
    Delete { task: String, review: String },
}

#[derive(Subcommand, Debug)]
pub enum SubtaskCommand {
    Add { task: String, title: String },
    Edit { task: String, subtask: String, title: String },
    Delete { task: String, subtask: String },
    Toggle { task: String, subtask: String },
    /// Move a subtask to a new position in its task's list
    Move(SubtaskMoveArgs),
}

#[derive(Args, Debug)]
pub struct SubtaskMoveArgs {
    pub task: String,
    pub subtask: String,
    /// Zero-based target position
    pub index: usize,
}

#[derive(Subcommand, Debug)]
pub enum ReportCommand {
    Add {
        task: String,
        subtask: String,
        content: String,
    },
    Delete {
        task: String,
        subtask: String,
        report: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ImageCommand {
    /// Attach an image file (jpeg, png, gif or webp)
    Add { task: String, file: PathBuf },
    Delete { task: String, image: String },
    /// Write an attached image back to a file
    Save {
        task: String,
        image: String,
        output: PathBuf,
    },
}
