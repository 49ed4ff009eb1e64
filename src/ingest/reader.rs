//! Log file reading: path validation, encoding fallback, line extraction.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::{SeqError, SeqResult};

/// Input files above this size are rejected.
pub const MAX_FILE_SIZE: u64 = 2 * 1024 * 1024 * 1024;

const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "log", "logcat"];

/// Read a log file into trimmed, non-empty lines.
///
/// The file must exist, carry a supported extension (`.txt`, `.log`,
/// `.logcat`) and stay under [`MAX_FILE_SIZE`]. Content is decoded as UTF-8
/// with a Latin-1 fallback for non-UTF-8 input. An empty file is a warning,
/// not an error, and yields an empty line list.
pub fn read_log_lines(path: &Path) -> SeqResult<Vec<String>> {
    if !path.exists() {
        return Err(SeqError::Message(format!(
            "file not found: {}",
            path.display()
        )));
    }
    if !path.is_file() {
        return Err(SeqError::Message(format!(
            "path is not a file: {}",
            path.display()
        )));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(SeqError::Message(format!(
            "unsupported file extension: {}",
            path.display()
        )));
    }

    let metadata = std::fs::metadata(path)
        .map_err(|e| SeqError::Message(format!("failed to stat {}: {e}", path.display())))?;
    if metadata.len() > MAX_FILE_SIZE {
        return Err(SeqError::Message(format!(
            "file size {} exceeds limit {MAX_FILE_SIZE}",
            metadata.len()
        )));
    }
    if metadata.len() == 0 {
        warn!("log file {} is empty", path.display());
    }

    let bytes = std::fs::read(path)
        .map_err(|e| SeqError::Message(format!("failed to read {}: {e}", path.display())))?;
    let text = decode(bytes);

    let lines: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect();

    info!("read {} lines from {}", lines.len(), path.display());
    Ok(lines)
}

fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            debug!("input is not valid UTF-8, falling back to Latin-1");
            e.into_bytes().iter().map(|&b| b as char).collect()
        }
    }
}
