//! Partner data directory discovery.

use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};

/// Finds `<root>/<partner_id>`, falling back to a case-insensitive match.
///
/// # Errors
///
/// Returns [`IngestError::DirectoryNotFound`] when no directory matches.
pub fn find_partner_dir(root: &Path, partner_id: &str) -> Result<PathBuf> {
    let direct = root.join(partner_id);
    if direct.is_dir() {
        return Ok(direct);
    }
    let entries = std::fs::read_dir(root).map_err(|_| IngestError::DirectoryNotFound {
        path: direct.clone(),
    })?;
    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: root.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.eq_ignore_ascii_case(partner_id));
        if matches && path.is_dir() {
            return Ok(path);
        }
    }
    Err(IngestError::DirectoryNotFound { path: direct })
}

/// Lists regular, non-hidden files in a directory.
///
/// Returns files sorted by filename.
pub fn list_data_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.') || n.starts_with("~$"));
        if !hidden {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Data files for one partner under the data sources root.
pub fn discover_partner_files(root: &Path, partner_id: &str) -> Result<Vec<PathBuf>> {
    let dir = find_partner_dir(root, partner_id)?;
    list_data_files(&dir)
}
