//! Write rendered herb documents and the summary file to disk.
//!
//! Output directories are not created here: a missing target directory is a
//! configuration problem and fails the run with the offending path.

use std::path::Path;

use serde::Serialize;
use tracing::debug;

use flora_shared::{FloraError, Result};

/// Write one rendered herb document.
pub fn write_document(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).map_err(|e| FloraError::io(path, e))?;
    debug!(path = %path.display(), "wrote herb document");
    Ok(())
}

/// Write `data` as JSON atomically (temp file, then rename).
///
/// On failure no partial file is left at `path`.
pub fn write_json_atomic<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    let json = serde_json::to_string(data)
        .map_err(|e| FloraError::Serialize(format!("JSON serialization failed: {e}")))?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| FloraError::validation(format!("not a file path: {}", path.display())))?;
    let temp = path.with_file_name(format!(".{file_name}.tmp"));

    std::fs::write(&temp, json).map_err(|e| FloraError::io(&temp, e))?;
    if let Err(e) = std::fs::rename(&temp, path) {
        let _ = std::fs::remove_file(&temp);
        return Err(FloraError::io(path, e));
    }

    debug!(path = %path.display(), "wrote JSON file");
    Ok(())
}
