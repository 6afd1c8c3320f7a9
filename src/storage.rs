//! File-system side of the pipeline: reading inputs, backups and atomic writes

use crate::error::{Result, TokenError};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Read a required input; a missing file is `FileNotFound`
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => TokenError::file_not_found(path.display().to_string()),
        _ => TokenError::Io(e),
    })
}

/// `<file>.backup` next to `path`
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".backup");
    PathBuf::from(name)
}

/// Copy the current contents of `path` to its backup file
pub fn backup_file(path: &Path, contents: &str) -> Result<PathBuf> {
    let backup = backup_path(path);
    fs::write(&backup, contents)?;
    log::info!("Backed up {} to {}", path.display(), backup.display());
    Ok(backup)
}

/// Write through a temporary sibling and rename over the target
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    ensure_parent(path)?;
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);

    fs::write(&tmp, contents)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    log::info!("Wrote {} ({} bytes)", path.display(), contents.len());
    Ok(())
}

/// Write a generated artifact, creating parent directories
pub fn write_output(path: &Path, contents: &str) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, contents)?;
    log::info!("Wrote {} ({} bytes)", path.display(), contents.len());
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent)?;
            Ok(())
        }
        _ => Ok(()),
    }
}

/// All `*.json` files below `folder`, sorted by file name at each level,
/// as (path relative to `folder`, absolute path) pairs
pub fn scan_folder(folder: &Path) -> Result<Vec<(String, PathBuf)>> {
    if !folder.is_dir() {
        return Err(TokenError::file_not_found(folder.display().to_string()));
    }

    let mut found = Vec::new();
    for entry in WalkDir::new(folder).sort_by_file_name() {
        let entry = entry.map_err(|e| TokenError::Io(e.into()))?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let relative = path
            .strip_prefix(folder)
            .unwrap_or(path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        found.push((relative, path.to_path_buf()));
    }
    log::debug!("Found {} JSON file(s) in {}", found.len(), folder.display());
    Ok(found)
}

/// Modification time, if the file exists
pub fn modified_time(path: &Path) -> Option<std::time::SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}
