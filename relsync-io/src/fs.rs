/*
File: relsync-io/src/fs.rs
Purpose: Primitive synchronous filesystem operations.
*/
use std::{
    fs,
    io::{self, Write},
    path::Path,
    sync::Arc,
};

use relsync_common::error::{RelsyncError, Result};
use tempfile::NamedTempFile;
use tracing::{debug, error, warn};

/// Creates a directory and all its parent components if they are missing.
pub fn create_dir_all(path: &Path) -> Result<()> {
    debug!("Creating directory recursively: {}", path.display());
    fs::create_dir_all(path).map_err(|e| {
        error!("Failed create dir {}: {}", path.display(), e);
        RelsyncError::from(e)
    })
}

/// Removes a file, treating an already-missing file as success.
/// Returns whether a file was removed.
pub fn remove_file_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!("Removed file: {}", path.display());
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => {
            error!("Failed remove file {}: {}", path.display(), e);
            Err(RelsyncError::from(e))
        }
    }
}

/// Creates a temporary file next to `final_path` for a later `persist`.
pub fn temp_file_beside(final_path: &Path) -> Result<NamedTempFile> {
    let dir = final_path.parent().ok_or_else(|| {
        RelsyncError::IoError(format!(
            "Cannot get parent directory for {}",
            final_path.display()
        ))
    })?;
    create_dir_all(dir)?;
    Ok(NamedTempFile::new_in(dir)?)
}

/// Renames a finished temporary file over `final_path`.
pub fn persist_temp_file(temp_file: NamedTempFile, final_path: &Path) -> Result<()> {
    let temp_path = temp_file.path().to_path_buf();
    temp_file.persist(final_path).map_err(|e| {
        error!(
            "Failed to persist/rename temporary file {} over {}: {}",
            temp_path.display(),
            final_path.display(),
            e.error
        );
        RelsyncError::Io(Arc::new(e.error))
    })?;
    Ok(())
}

/// Atomically writes data to a file using a temporary file.
/// Preserves original permissions if possible.
pub fn atomic_write_file(original_path: &Path, content: &[u8]) -> Result<()> {
    let original_perms = fs::metadata(original_path).map(|m| m.permissions()).ok();

    let mut temp_file = temp_file_beside(original_path)?;
    debug!(
        "Atomically writing {} bytes to {} via temp file {}",
        content.len(),
        original_path.display(),
        temp_file.path().display()
    );

    temp_file.write_all(content)?;
    temp_file.flush()?;
    temp_file.as_file().sync_all()?;

    persist_temp_file(temp_file, original_path)?;

    if let Some(perms) = original_perms {
        if let Err(e) = fs::set_permissions(original_path, perms) {
            warn!(
                "Failed to restore original permissions on {}: {}",
                original_path.display(),
                e
            );
        }
    } else {
        set_default_file_permissions(original_path);
    }

    Ok(())
}

#[cfg(unix)]
fn set_default_file_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    // NamedTempFile is created 0600.
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o644)) {
        warn!(
            "Failed to set default permissions on new file {}: {}",
            path.display(),
            e
        );
    }
}

#[cfg(not(unix))]
fn set_default_file_permissions(_path: &Path) {}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_creates_parents_and_replaces() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/out.json");

        atomic_write_file(&path, b"first").unwrap();
        atomic_write_file(&path, b"second").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"second");
        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn test_remove_file_if_exists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stale.tar.gz");
        fs::write(&path, b"x").unwrap();

        assert!(remove_file_if_exists(&path).unwrap());
        assert!(!remove_file_if_exists(&path).unwrap());
        assert!(!path.exists());
    }
}
