use std::path::Path;

use anyhow::{bail, Result};

/// Error unless the directory already exists.
pub(crate) fn require_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() { bail!("Directory does not exist: {}", path.display()); }
    if !path.is_dir() { bail!("Path exists but is not a directory: {}", path.display()); }
    Ok(())
}

/// Error unless the file already exists.
pub(crate) fn require_file_exists(path: &Path) -> Result<()> {
    if !path.exists() { bail!("File does not exist: {}", path.display()); }
    if !path.is_file() { bail!("Path exists but is not a file: {}", path.display()); }
    Ok(())
}

/// Error if a file already exists at `path`, unless `force` is set.
pub(crate) fn require_writable(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("Output already exists (use --force to overwrite): {}", path.display());
    }
    if path.is_dir() { bail!("Output path is a directory: {}", path.display()); }
    Ok(())
}

/// Lowercase file extension of `path`, if any.
pub(crate) fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}
