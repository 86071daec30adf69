//! Filesystem primitives shared by every vault operation.
//!
//! Documents are replaced through a temporary file in the target directory
//! that is renamed over the destination, so readers observe either the old
//! bytes or the new ones.

use std::fs;
use std::io::{self, Write};

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::VaultError;

/// Reads a document, mapping a missing file to [`VaultError::NotFound`].
pub(crate) fn read_document(path: &Utf8Path, reference: &str) -> Result<String, VaultError> {
    fs::read_to_string(path).map_err(|error| match error.kind() {
        io::ErrorKind::NotFound => VaultError::document_not_found(reference),
        _ => VaultError::io(path, error),
    })
}

/// Atomically replaces `path` with `content`, creating parent directories.
///
/// A symlinked document is replaced at its target so the link survives, and
/// an existing document keeps its permissions.
pub(crate) fn write_atomic(path: &Utf8Path, content: &str) -> Result<(), VaultError> {
    let target = write_target(path)?;
    let parent = target.parent().unwrap_or_else(|| Utf8Path::new("."));
    fs::create_dir_all(parent).map_err(|error| VaultError::io(parent, error))?;

    let mut temp_file =
        tempfile::NamedTempFile::new_in(parent).map_err(|error| VaultError::io(path, error))?;
    temp_file
        .write_all(content.as_bytes())
        .map_err(|error| VaultError::io(path, error))?;
    if let Ok(existing) = fs::metadata(&target) {
        temp_file
            .as_file()
            .set_permissions(existing.permissions())
            .map_err(|error| VaultError::io(path, error))?;
    }
    temp_file
        .persist(&target)
        .map_err(|error| VaultError::io(path, error.error))?;
    Ok(())
}

/// Follows symlinks from an existing `path`; a missing one is used as is.
fn write_target(path: &Utf8Path) -> Result<Utf8PathBuf, VaultError> {
    match path.canonicalize_utf8() {
        Ok(target) => Ok(target),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(path.to_path_buf()),
        Err(error) => Err(VaultError::io(path, error)),
    }
}

/// Removes a document, mapping a missing file to [`VaultError::NotFound`].
pub(crate) fn remove_document(path: &Utf8Path, reference: &str) -> Result<(), VaultError> {
    fs::remove_file(path).map_err(|error| match error.kind() {
        io::ErrorKind::NotFound => VaultError::document_not_found(reference),
        _ => VaultError::io(path, error),
    })
}

/// Moves a document, creating the destination's parent directories.
pub(crate) fn move_document(from: &Utf8Path, to: &Utf8Path) -> Result<(), VaultError> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(|error| VaultError::io(parent, error))?;
    }
    fs::rename(from, to).map_err(|error| VaultError::io(from, error))
}

/// Creates `path` and any missing parents.
pub(crate) fn create_directory(path: &Utf8Path) -> Result<(), VaultError> {
    fs::create_dir_all(path).map_err(|error| VaultError::io(path, error))
}

/// Removes a directory, with its contents when `recursive` is set.
pub(crate) fn remove_directory(path: &Utf8Path, recursive: bool) -> Result<(), VaultError> {
    let removed = if recursive {
        fs::remove_dir_all(path)
    } else {
        fs::remove_dir(path)
    };
    removed.map_err(|error| VaultError::io(path, error))
}

/// Returns `true` when something already occupies `path`.
pub(crate) fn exists(path: &Utf8Path) -> bool {
    path.symlink_metadata().is_ok()
}
