//! Import subcommand for task-board CLI
//!
//! Replaces the board with the contents of an export file (or a bare
//! saved board).

use clap::Args;
use std::path::PathBuf;

/// Arguments for the import subcommand
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Path to the export file to import
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Validate import without modifying the board
    ///
    /// Parses the file, checks the board is consistent, and reports
    /// what would be imported without making any changes.
    #[arg(long)]
    pub dry_run: bool,
}

impl ImportArgs {
    /// Describe the import mode for logging
    pub fn import_mode(&self) -> &'static str {
        if self.dry_run { "dry-run" } else { "replace" }
    }
}
