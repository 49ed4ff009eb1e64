use std::io::Write;
use std::path::Path;

use thiserror::Error;

pub mod analyze_cmd;
pub mod templates_cmd;

pub mod core;
pub mod diagram;
pub mod ingest;
pub mod report;
pub mod sequence;
pub mod storage;
pub mod template;

#[derive(Debug, Error)]
pub enum SeqError {
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

pub type SeqResult<T> = Result<T, SeqError>;

// Shared helpers
pub fn sha256_hex(bytes: &[u8]) -> String {
    use sha256::digest;
    digest(bytes)
}

/// Write `contents` to `path` via a temp file in the same directory plus a
/// rename, so a concurrent reader never observes a partially written document.
pub fn write_atomic(path: &Path, contents: &[u8]) -> SeqResult<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .map_err(|e| SeqError::Message(format!("failed to create directory: {e}")))?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| SeqError::Message(format!("failed to create temp file: {e}")))?;
    tmp.write_all(contents)
        .map_err(|e| SeqError::Message(format!("failed to write temp file: {e}")))?;
    tmp.persist(path)
        .map_err(|e| SeqError::Message(format!("failed to persist {}: {e}", path.display())))?;
    Ok(())
}
