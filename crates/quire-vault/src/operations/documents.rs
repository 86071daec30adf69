//! Whole-document reads, writes, deletions, and listings.

use camino::Utf8Path;
use serde::Deserialize;
use walkdir::WalkDir;

use crate::commit::{read_document, remove_document, write_atomic};
use crate::concurrency::{check, modification_stamp};
use crate::error::VaultError;
use crate::report::{DocumentSnapshot, MutationReport, Outline};
use crate::sections::{extract_headings, extract_section};
use crate::vault::Vault;

use super::traced;

/// Creates or overwrites a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WriteRequest {
    /// Vault-relative reference.
    pub path: String,
    /// Full replacement content.
    pub content: String,
    /// Stamp the document must still carry.
    #[serde(default)]
    pub expected_modified: Option<String>,
}

/// Removes a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DeleteRequest {
    /// Vault-relative reference.
    pub path: String,
    /// Stamp the document must still carry.
    #[serde(default)]
    pub expected_modified: Option<String>,
    /// Validate without deleting.
    #[serde(default)]
    pub dry_run: bool,
}

impl Vault {
    /// Reads a document with its current modification stamp.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidPath`] for unsafe references and
    /// [`VaultError::NotFound`] for missing documents.
    pub fn read(&self, reference: &str) -> Result<DocumentSnapshot, VaultError> {
        let root = self.root();
        let document = Self::resolve(&root, reference)?;
        let content = read_document(&document.path, &document.reference)?;
        let modified = modification_stamp(&document.path, &document.reference)?;
        Ok(DocumentSnapshot {
            path: document.reference,
            content,
            modified,
        })
    }

    /// Creates or overwrites a document.
    ///
    /// A supplied stamp is checked even when the document is missing, in
    /// which case the write is rejected as not found.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Conflict`] when the stamp is stale, plus the
    /// resolution and I/O failures shared by every operation.
    pub fn write(&self, request: &WriteRequest) -> Result<MutationReport, VaultError> {
        traced("write", &request.path, || {
            let root = self.root();
            let document = Self::resolve(&root, &request.path)?;
            check(
                &document.path,
                &document.reference,
                request.expected_modified.as_deref(),
            )?;
            write_atomic(&document.path, &request.content)?;
            let modified = modification_stamp(&document.path, &document.reference)?;
            Ok(MutationReport::written(
                &document.reference,
                format!("wrote {}", document.reference),
                1,
                modified,
            ))
        })
    }

    /// Deletes a document.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::NotFound`] for missing documents and
    /// [`VaultError::Conflict`] when the stamp is stale.
    pub fn delete(&self, request: &DeleteRequest) -> Result<MutationReport, VaultError> {
        traced("delete", &request.path, || {
            let root = self.root();
            let document = Self::resolve(&root, &request.path)?;
            check(
                &document.path,
                &document.reference,
                request.expected_modified.as_deref(),
            )?;

            if request.dry_run {
                if !document.path.is_file() {
                    return Err(VaultError::document_not_found(&document.reference));
                }
                return Ok(MutationReport::dry_run(
                    &document.reference,
                    format!("dry run: would delete {}", document.reference),
                    1,
                ));
            }

            remove_document(&document.path, &document.reference)?;
            Ok(MutationReport::removed(
                &document.reference,
                format!("deleted {}", document.reference),
            ))
        })
    }

    /// Returns the heading outline of a document.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::NotFound`] for missing documents.
    pub fn headings(&self, reference: &str) -> Result<Outline, VaultError> {
        let root = self.root();
        let document = Self::resolve(&root, reference)?;
        let content = read_document(&document.path, &document.reference)?;
        Ok(Outline {
            path: document.reference,
            headings: extract_headings(&content),
        })
    }

    /// Returns the trimmed body of the first section titled `heading`.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::NotFound`] when the document or heading is
    /// missing.
    pub fn section(&self, reference: &str, heading: &str) -> Result<String, VaultError> {
        let root = self.root();
        let document = Self::resolve(&root, reference)?;
        let content = read_document(&document.path, &document.reference)?;
        extract_section(&content, heading)
            .ok_or_else(|| VaultError::heading_not_found(&document.reference, heading))
    }

    /// Lists every document below `directory`, sorted, relative to the root.
    ///
    /// Entries that cannot be read are skipped and logged.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidPath`] when the directory escapes the
    /// root and [`VaultError::NotFound`] when it does not exist.
    pub fn list_documents(&self, directory: Option<&str>) -> Result<Vec<String>, VaultError> {
        let root = self.root();
        let search = Self::resolve_dir(&root, directory)?;
        if !search.is_dir() {
            return Err(VaultError::NotFound {
                path: directory.unwrap_or_default().to_owned(),
                message: format!("directory not found: {}", directory.unwrap_or_default()),
            });
        }
        let mut documents = markdown_files(&root, &search);
        documents.sort();
        Ok(documents)
    }
}

/// Collects vault-relative references of every markdown file below `search`.
pub(crate) fn markdown_files(root: &Utf8Path, search: &Utf8Path) -> Vec<String> {
    let mut documents = Vec::new();
    for item in WalkDir::new(search) {
        let entry = match item {
            Ok(entry) => entry,
            Err(error) => {
                tracing::warn!(
                    target: "quire_vault::operations",
                    error = %error,
                    "skipping unreadable entry"
                );
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(path) = Utf8Path::from_path(entry.path()) else {
            continue;
        };
        if path.extension() != Some(quire_config::DEFAULT_DOCUMENT_EXTENSION) {
            continue;
        }
        if let Ok(relative) = path.strip_prefix(root) {
            documents.push(relative.to_string());
        }
    }
    documents
}
