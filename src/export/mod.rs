//! Export and import of board snapshots.
//!
//! An export wraps the board in a small envelope with provenance metadata.
//! Files may be plain JSON or gzip-compressed; compression is detected from
//! the magic bytes on read. Import also accepts a bare board blob, the same
//! shape the snapshot store writes.

use crate::persistence::decode_snapshot;
use crate::types::Board;
use anyhow::{Context, Result};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

/// Export format version (semver).
pub const EXPORT_VERSION: &str = "1.0.0";

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// A board export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Export format version (semver)
    pub export_version: String,

    /// ISO 8601 timestamp of export
    pub exported_at: String,

    /// Tool name and version that created this export
    pub exported_by: String,

    pub board: Board,
}

/// Either an export envelope or a bare board.
#[derive(Deserialize)]
#[serde(untagged)]
enum AnySnapshot {
    Envelope(Snapshot),
    Bare(Board),
}

impl Snapshot {
    /// Wrap a board with current metadata.
    pub fn new(board: Board) -> Self {
        Self {
            export_version: EXPORT_VERSION.to_string(),
            exported_at: chrono::Utc::now().to_rfc3339(),
            exported_by: format!("task-board v{}", env!("CARGO_PKG_VERSION")),
            board,
        }
    }

    /// Parse an export or a bare board and check it is consistent.
    pub fn from_json(json: &str) -> Result<Self> {
        let parsed: AnySnapshot = serde_json::from_str(json).context("parsing snapshot")?;
        let snapshot = match parsed {
            AnySnapshot::Envelope(snapshot) => snapshot,
            AnySnapshot::Bare(board) => Snapshot::new(board),
        };

        // Re-run the invariant checks on the board itself.
        let board = decode_snapshot(&snapshot.board.to_json()?)?;
        Ok(Self { board, ..snapshot })
    }

    /// Load from a file (plain JSON or gzip).
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut bytes = Vec::new();
        File::open(path)
            .with_context(|| format!("opening {}", path.display()))?
            .read_to_end(&mut bytes)?;

        let json = if bytes.starts_with(&GZIP_MAGIC) {
            let mut json = String::new();
            GzDecoder::new(BufReader::new(bytes.as_slice())).read_to_string(&mut json)?;
            json
        } else {
            String::from_utf8(bytes).context("snapshot is not UTF-8")?
        };

        Self::from_json(&json)
    }

    /// Serialize to JSON with pretty formatting.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write to any writer, optionally gzip-compressed.
    pub fn write_to<W: Write>(&self, writer: W, gzip: bool) -> Result<()> {
        let json = self.to_json_pretty()?;
        if gzip {
            let mut encoder = GzEncoder::new(writer, Compression::default());
            encoder.write_all(json.as_bytes())?;
            encoder.finish()?;
        } else {
            let mut writer = writer;
            writer.write_all(json.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        Ok(())
    }
}

/// Whether a path asks for gzip output.
pub fn is_gzip_path(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Task;

    fn sample_board() -> Board {
        let mut board = Board::default();
        board.tasks.insert("t1".into(), Task::new("t1", "Ship", "", 5));
        board.columns.get_mut("in-progress").unwrap().task_ids.push("t1".into());
        board
    }

    #[test]
    fn test_snapshot_new() {
        let snapshot = Snapshot::new(Board::default());
        assert_eq!(snapshot.export_version, EXPORT_VERSION);
        assert!(snapshot.exported_by.starts_with("task-board v"));
    }

    #[test]
    fn test_bare_board_is_accepted() {
        let board = sample_board();
        let snapshot = Snapshot::from_json(&board.to_json().unwrap()).unwrap();
        assert_eq!(snapshot.board, board);
    }

    #[test]
    fn test_inconsistent_import_rejected() {
        let mut board = sample_board();
        board.columns.get_mut("done").unwrap().task_ids.push("t1".into());
        let json = Snapshot::new(board).to_json_pretty().unwrap();
        assert!(Snapshot::from_json(&json).is_err());
    }

    #[test]
    fn test_gzip_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.json.gz");
        assert!(is_gzip_path(&path));

        let snapshot = Snapshot::new(sample_board());
        snapshot
            .write_to(File::create(&path).unwrap(), true)
            .unwrap();

        let loaded = Snapshot::from_file(&path).unwrap();
        assert_eq!(loaded.board, snapshot.board);
        assert_eq!(loaded.exported_at, snapshot.exported_at);
    }
}
