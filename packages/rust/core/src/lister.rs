//! Enumerate local herb metadata files.

use std::path::Path;

use tracing::{debug, info, instrument};

use flora_shared::{FloraError, Result};

/// File names directly inside `dir` that end with `suffix`, sorted.
///
/// Subdirectories and non-matching files are ignored. A missing or
/// unreadable directory is an error; there is no partial listing.
#[instrument(skip_all, fields(dir = %dir.display(), suffix = %suffix))]
pub fn list_metadata_files(dir: &Path, suffix: &str) -> Result<Vec<String>> {
    let read_dir = std::fs::read_dir(dir).map_err(|e| FloraError::io(dir, e))?;

    let mut files = Vec::new();
    for item in read_dir {
        let item = item.map_err(|e| FloraError::io(dir, e))?;
        let path = item.path();
        if !path.is_file() {
            continue;
        }

        let Some(name) = item.file_name().to_str().map(str::to_string) else {
            debug!(path = %path.display(), "skipping non UTF-8 file name");
            continue;
        };
        if name.ends_with(suffix) {
            files.push(name);
        }
    }
    files.sort();

    info!(count = files.len(), "total number of flora");
    Ok(files)
}
