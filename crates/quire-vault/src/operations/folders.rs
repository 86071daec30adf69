//! Creating and removing folders inside the vault.

use serde::Deserialize;

use crate::commit::{create_directory, exists, remove_directory};
use crate::error::VaultError;
use crate::report::MutationReport;
use crate::vault::Vault;

use super::traced;

/// Removes a folder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DeleteFolderRequest {
    /// Vault-relative folder reference.
    pub path: String,
    /// Remove the folder even when it still holds entries.
    #[serde(default)]
    pub force: bool,
}

/// Folder reference as reported back, without surrounding slashes.
fn folder_reference(reference: &str) -> &str {
    reference.trim().trim_matches('/')
}

impl Vault {
    /// Creates a folder and any missing parents. An existing folder is
    /// reported with zero changes.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidPath`] for the root or a reference
    /// escaping it, and [`VaultError::Conflict`] when a file occupies the
    /// path.
    pub fn create_folder(&self, reference: &str) -> Result<MutationReport, VaultError> {
        traced("create_folder", reference, || {
            let root = self.root();
            let folder = folder_reference(reference);
            let path = Self::resolve_dir(&root, Some(folder))?;
            if path == root {
                return Err(VaultError::invalid_path(reference, "folder path is empty"));
            }
            if path.is_dir() {
                return Ok(MutationReport::structural(
                    folder,
                    format!("folder {folder} already exists"),
                    0,
                ));
            }
            if exists(&path) {
                return Err(VaultError::Conflict {
                    path: folder.to_owned(),
                    message: format!("{folder} exists and is not a folder"),
                });
            }
            create_directory(&path)?;
            Ok(MutationReport::structural(folder, format!("created folder {folder}"), 1))
        })
    }

    /// Removes a folder. Folders with entries are only removed with
    /// `force`.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidPath`] for the root or a reference
    /// escaping it, [`VaultError::NotFound`] when nothing is there, and
    /// [`VaultError::Conflict`] for a file or a non-empty folder without
    /// `force`.
    pub fn delete_folder(
        &self,
        request: &DeleteFolderRequest,
    ) -> Result<MutationReport, VaultError> {
        traced("delete_folder", &request.path, || {
            let root = self.root();
            let folder = folder_reference(&request.path);
            let path = Self::resolve_dir(&root, Some(folder))?;
            if path == root {
                return Err(VaultError::invalid_path(
                    &request.path,
                    "refusing to delete the vault root",
                ));
            }
            if !exists(&path) {
                return Err(VaultError::NotFound {
                    path: folder.to_owned(),
                    message: format!("folder not found: {folder}"),
                });
            }
            if !path.is_dir() || path.is_symlink() {
                return Err(VaultError::Conflict {
                    path: folder.to_owned(),
                    message: format!("{folder} is not a folder"),
                });
            }
            let has_entries = path
                .read_dir_utf8()
                .map_err(|error| VaultError::io(&path, error))?
                .next()
                .is_some();
            if has_entries && !request.force {
                return Err(VaultError::Conflict {
                    path: folder.to_owned(),
                    message: format!("folder {folder} is not empty; set force to remove it"),
                });
            }
            remove_directory(&path, has_entries)?;
            Ok(MutationReport::structural(folder, format!("deleted folder {folder}"), 1))
        })
    }
}
