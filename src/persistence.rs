//! Snapshot persistence.
//!
//! The board is stored as one JSON blob. Loading never fails: an absent,
//! unparsable or inconsistent blob is replaced by the default board. Saving
//! is best-effort; the bridge installed by [`attach`] logs failures and
//! keeps going.

use crate::facade::BoardStore;
use crate::subscriptions::{BoardChange, SubscriptionId};
use crate::types::Board;
use anyhow::{Context, Result, anyhow};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Storage for the board snapshot.
pub trait SnapshotStore: Send + Sync {
    /// Read the raw blob. `Ok(None)` means nothing has been stored yet.
    fn read(&self) -> Result<Option<String>>;

    /// Overwrite the stored blob.
    fn write(&self, blob: &str) -> Result<()>;

    /// Keep a copy of a blob that could not be loaded. Default: discard.
    fn preserve_corrupt(&self, _blob: &str) -> Result<()> {
        Ok(())
    }

    /// Load the board, falling back to the default board on any problem.
    fn load(&self) -> Board {
        let blob = match self.read() {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                info!("no saved board, starting with the default board");
                return Board::default();
            }
            Err(e) => {
                warn!(error = %e, "failed to read saved board, using the default board");
                return Board::default();
            }
        };

        match decode_snapshot(&blob) {
            Ok(board) => {
                debug!(tasks = board.tasks.len(), "loaded board");
                board
            }
            Err(e) => {
                warn!(error = %e, "failed to parse saved board state, using the default board");
                if let Err(e) = self.preserve_corrupt(&blob) {
                    warn!(error = %e, "failed to keep a copy of the unreadable board");
                }
                Board::default()
            }
        }
    }

    /// Serialize and store the full board.
    fn save(&self, board: &Board) -> Result<()> {
        let blob = board.to_json().context("serializing board")?;
        self.write(&blob)
    }
}

/// Parse a blob and check that it is a consistent board.
pub fn decode_snapshot(blob: &str) -> Result<Board> {
    let board = Board::from_json(blob)?;
    let violations = board.check_invariants();
    if !violations.is_empty() {
        let details: Vec<String> = violations.iter().map(|v| v.to_string()).collect();
        return Err(anyhow!("inconsistent board: {}", details.join("; ")));
    }
    Ok(board)
}

/// Snapshot stored in a JSON file.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
    backup_corrupt: bool,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backup_corrupt: true,
        }
    }

    /// Whether to keep `<file>.bak` when the snapshot cannot be loaded.
    pub fn with_backup(mut self, backup_corrupt: bool) -> Self {
        self.backup_corrupt = backup_corrupt;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(suffix);
        PathBuf::from(name)
    }

    pub fn backup_path(&self) -> PathBuf {
        self.sibling(".bak")
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn read(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading {}", self.path.display())),
        }
    }

    fn write(&self, blob: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // Write then rename so a crash never leaves a half-written snapshot.
        let tmp = self.sibling(".tmp");
        std::fs::write(&tmp, blob).with_context(|| format!("writing {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }

    fn preserve_corrupt(&self, blob: &str) -> Result<()> {
        if !self.backup_corrupt {
            return Ok(());
        }
        let backup = self.backup_path();
        std::fs::write(&backup, blob)?;
        info!(path = %backup.display(), "kept unreadable board");
        Ok(())
    }
}

/// In-memory snapshot store, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    blob: Mutex<Option<String>>,
    writes: Mutex<usize>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing blob.
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Mutex::new(Some(blob.into())),
            writes: Mutex::new(0),
        }
    }

    pub fn blob(&self) -> Option<String> {
        self.blob.lock().unwrap().clone()
    }

    /// Number of writes since creation.
    pub fn writes(&self) -> usize {
        *self.writes.lock().unwrap()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.blob.lock().unwrap().clone())
    }

    fn write(&self, blob: &str) -> Result<()> {
        *self.blob.lock().unwrap() = Some(blob.to_string());
        *self.writes.lock().unwrap() += 1;
        Ok(())
    }
}

/// Subscribe `snapshots` to `board` so every applied command is saved.
///
/// The snapshot the store was loaded with is not written back; only later
/// changes are.
pub fn attach(board: &mut BoardStore, snapshots: Arc<dyn SnapshotStore>) -> SubscriptionId {
    board.subscribe(move |change: &BoardChange| {
        if let Err(e) = snapshots.save(&change.snapshot) {
            warn!(error = %e, kind = ?change.kind, "failed to save board");
        }
    })
}
