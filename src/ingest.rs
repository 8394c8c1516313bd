//! Image ingestion.
//!
//! Turns a file (or raw bytes) into the `{name, data}` payload that
//! `add_image` accepts. Runs to completion before any command is dispatched;
//! a rejected file never reaches the board.

use crate::config::ImagesConfig;
use crate::error::{BoardError, BoardResult};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::Path;

/// An encoded image ready to attach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub name: String,
    /// `data:<mime>;base64,<payload>`
    pub data: String,
}

/// Guess a MIME type from a file extension.
pub fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

/// Human-readable size limit, e.g. "2MB".
fn format_limit(bytes: u64) -> String {
    const MB: u64 = 1024 * 1024;
    const KB: u64 = 1024;
    if bytes >= MB && bytes % MB == 0 {
        format!("{}MB", bytes / MB)
    } else if bytes >= KB && bytes % KB == 0 {
        format!("{}KB", bytes / KB)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Check type and size before reading any content.
pub fn check(mime: Option<&str>, size: u64, policy: &ImagesConfig) -> BoardResult<()> {
    let allowed = mime.is_some_and(|m| policy.allowed_types.iter().any(|t| t == m));
    if !allowed {
        return Err(BoardError::UnsupportedImageType {
            allowed: policy.allowed_types.join(", "),
        });
    }
    if size > policy.max_bytes {
        return Err(BoardError::ImageTooLarge {
            size,
            limit: format_limit(policy.max_bytes),
        });
    }
    Ok(())
}

/// Encode bytes that were already read.
pub fn ingest_bytes(
    name: &str,
    mime: &str,
    bytes: &[u8],
    policy: &ImagesConfig,
) -> BoardResult<ImagePayload> {
    check(Some(mime), bytes.len() as u64, policy)?;
    Ok(ImagePayload {
        name: name.to_string(),
        data: format!("data:{};base64,{}", mime, STANDARD.encode(bytes)),
    })
}

/// Read and encode an image file.
pub fn ingest_file(path: &Path, policy: &ImagesConfig) -> BoardResult<ImagePayload> {
    let mime = mime_from_extension(path);
    let meta = std::fs::metadata(path).map_err(BoardError::unreadable)?;
    check(mime, meta.len(), policy)?;

    let bytes = std::fs::read(path).map_err(BoardError::unreadable)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    // check() already rejected a missing mime
    ingest_bytes(&name, mime.unwrap_or_default(), &bytes, policy)
}

/// Decode the payload bytes of a `data:` URL (or bare base64).
pub fn decode_data(data: &str) -> BoardResult<Vec<u8>> {
    let encoded = match data.split_once(";base64,") {
        Some((_, rest)) => rest,
        None => data,
    };
    STANDARD.decode(encoded).map_err(BoardError::unreadable)
}
