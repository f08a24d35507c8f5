//! Output Destinations
//!
//! A destination is checked before any rendering starts and written in one
//! step afterwards, so a failed render never leaves a partial file behind.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::RenderError;

fn unwritable(path: &Path, reason: impl ToString) -> RenderError {
    RenderError::UnwritableDestination {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

fn sibling(path: &Path, suffix: &str) -> Result<PathBuf, RenderError> {
    let name = path
        .file_name()
        .ok_or_else(|| unwritable(path, "path has no file name"))?;
    let mut sibling_name = std::ffi::OsString::from(".");
    sibling_name.push(name);
    sibling_name.push(suffix);
    Ok(path.with_file_name(sibling_name))
}

/// Make sure `path` can receive an output file.
///
/// Creates missing parent directories. The destination itself is not
/// created or truncated.
pub fn prepare_destination(path: &Path) -> Result<(), RenderError> {
    if path.as_os_str().is_empty() {
        return Err(unwritable(path, "empty path"));
    }
    if path.is_dir() {
        return Err(unwritable(path, "path is a directory"));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| unwritable(path, e))?;
    }

    let probe = sibling(path, ".probe")?;
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&probe)
        .map_err(|e| unwritable(path, e))?;
    fs::remove_file(&probe).map_err(|e| unwritable(path, e))?;

    debug!(path = %path.display(), "destination writable");
    Ok(())
}

/// Write `bytes` to `path` through a temporary sibling and a rename.
pub fn write_output(path: &Path, bytes: &[u8]) -> Result<(), RenderError> {
    let staging = sibling(path, ".partial")?;
    let result = (|| {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&staging)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&staging, path)
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&staging);
        return Err(unwritable(path, e));
    }
    debug!(path = %path.display(), bytes = bytes.len(), "output written");
    Ok(())
}
