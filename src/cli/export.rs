//! Export subcommand for task-board CLI
//!
//! Exports the board to a structured JSON format that can be
//! version-controlled, diffed, and re-imported.

use crate::export::is_gzip_path;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the export subcommand
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output file path (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Force gzip compression (auto-detected from .gz extension otherwise)
    #[arg(long)]
    pub gzip: bool,
}

impl ExportArgs {
    /// Determine if output should be compressed based on args and filename
    pub fn should_compress(&self) -> bool {
        // Explicit --gzip flag always wins
        if self.gzip {
            return true;
        }

        self.output.as_deref().is_some_and(is_gzip_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_compress() {
        let args = ExportArgs {
            output: Some(PathBuf::from("board.json.gz")),
            gzip: false,
        };
        assert!(args.should_compress());

        let args = ExportArgs {
            output: Some(PathBuf::from("board.json")),
            gzip: false,
        };
        assert!(!args.should_compress());

        let args = ExportArgs {
            output: None,
            gzip: true,
        };
        assert!(args.should_compress());
    }
}
