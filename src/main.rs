//! Task Board CLI
//!
//! Loads the board snapshot, runs one command against it and saves every
//! applied change back through the snapshot store.

use anyhow::{Result, anyhow};
use clap::Parser;
use std::sync::Arc;
use task_board::cli::exec::execute;
use task_board::cli::{Cli, Command};
use task_board::config::Config;
use task_board::facade::BoardStore;
use task_board::format::OutputFormat;
use task_board::logging::{self, LogTarget};
use task_board::persistence::{self, FileSnapshotStore, SnapshotStore};
use tracing::{debug, info};

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    let mut config = Config::load_or_default(cli.config.as_deref())?;

    // Override paths from CLI arguments
    if let Some(board_path) = &cli.board {
        config.storage.path = board_path.clone();
    }
    config.ensure_storage_dir()?;

    let format = match cli.format.as_deref() {
        Some(name) => OutputFormat::from_str(name)
            .ok_or_else(|| anyhow!("Unknown format '{}': use markdown or json", name))?,
        None => config.display.format.into(),
    };

    let snapshots = Arc::new(
        FileSnapshotStore::new(config.storage.path.clone())
            .with_backup(config.storage.backup_corrupt),
    );
    info!(path = %snapshots.path().display(), "opening board");

    let mut store = BoardStore::load(&*snapshots);
    let snapshots: Arc<dyn SnapshotStore> = snapshots;
    persistence::attach(&mut store, snapshots);

    let command = cli.command.unwrap_or(Command::Show);
    debug!(?command, "running command");

    let output = execute(&mut store, command, &config, format)?;
    print!("{}", output);

    Ok(())
}
