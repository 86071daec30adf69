//! Renaming documents and keeping wikilinks pointed at them.

use camino::Utf8Path;
use regex::{Captures, Regex};
use serde::Deserialize;

use crate::cancellation::Cancellation;
use crate::commit::{exists, move_document, read_document, write_atomic};
use crate::concurrency::modification_stamp;
use crate::error::VaultError;
use crate::report::RenameReport;
use crate::vault::Vault;

use super::documents::markdown_files;
use super::{default_true, traced};

/// Moves a document to a new reference.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RenameRequest {
    /// Current vault-relative reference.
    pub from: String,
    /// New vault-relative reference, possibly in another directory.
    pub to: String,
    /// Rewrite `[[links]]` to the document across the vault.
    #[serde(default = "default_true")]
    pub update_links: bool,
}

impl Default for RenameRequest {
    fn default() -> Self {
        Self {
            from: String::new(),
            to: String::new(),
            update_links: true,
        }
    }
}

/// One `[[old]]` / `[[old|alias]]` rewrite.
struct LinkRewrite {
    pattern: Regex,
    replacement: String,
}

impl LinkRewrite {
    fn new(old: &str, new: &str) -> Result<Self, VaultError> {
        let pattern = Regex::new(&format!(r"\[\[{}(\|[^\]]+)?\]\]", regex::escape(old)))
            .map_err(|error| VaultError::malformed(Some(old), error.to_string()))?;
        Ok(Self {
            pattern,
            replacement: new.to_owned(),
        })
    }

    fn apply(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, |caps: &Captures<'_>| {
                let alias = caps.get(1).map_or("", |found| found.as_str());
                format!("[[{}{alias}]]", self.replacement)
            })
            .into_owned()
    }
}

/// Builds the rewrites for the full stem and, when different, the basename.
fn link_rewrites(from: &str, to: &str) -> Result<Vec<LinkRewrite>, VaultError> {
    let old_name = without_extension(from);
    let new_name = without_extension(to);
    let old_base = Utf8Path::new(from).file_stem().unwrap_or(old_name);
    let new_base = Utf8Path::new(to).file_stem().unwrap_or(new_name);

    let mut rewrites = vec![LinkRewrite::new(old_name, new_name)?];
    if old_base != old_name {
        rewrites.push(LinkRewrite::new(old_base, new_base)?);
    }
    Ok(rewrites)
}

fn without_extension(reference: &str) -> &str {
    reference
        .strip_suffix(&format!(".{}", quire_config::DEFAULT_DOCUMENT_EXTENSION))
        .unwrap_or(reference)
}

impl Vault {
    /// Moves a document, then rewrites links to it across the vault unless
    /// `update_links` is off.
    ///
    /// The move is committed before the sweep starts. The sweep is best
    /// effort: documents that cannot be read or written are logged and
    /// counted, and never undo the move. `cancel` is polled before each
    /// document.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::NotFound`] when the source is missing,
    /// [`VaultError::Conflict`] when the destination exists, and
    /// [`VaultError::Cancelled`] when the sweep is stopped.
    pub fn rename(
        &self,
        request: &RenameRequest,
        cancel: &Cancellation,
    ) -> Result<RenameReport, VaultError> {
        traced("rename", &request.from, || {
            let root = self.root();
            let source = Self::resolve(&root, &request.from)?;
            let destination = Self::resolve(&root, &request.to)?;
            if !source.path.is_file() {
                return Err(VaultError::document_not_found(&source.reference));
            }
            if exists(&destination.path) {
                return Err(VaultError::already_exists(&destination.reference));
            }
            let rewrites = link_rewrites(&source.reference, &destination.reference)?;

            move_document(&source.path, &destination.path)?;
            let modified = modification_stamp(&destination.path, &destination.reference)?;
            if !request.update_links {
                return Ok(RenameReport {
                    from: source.reference,
                    to: destination.reference,
                    modified,
                    links_updated: 0,
                    links_failed: 0,
                });
            }

            let documents: Vec<String> = markdown_files(&root, &root)
                .into_iter()
                .filter(|reference| *reference != destination.reference)
                .collect();
            let total = documents.len();
            let mut links_updated = 0;
            let mut links_failed = 0;

            for (completed, reference) in documents.iter().enumerate() {
                if cancel.is_cancelled() {
                    return Err(VaultError::Cancelled { completed, total });
                }
                match rewrite_links(&root.join(reference), reference, &rewrites) {
                    Ok(true) => links_updated += 1,
                    Ok(false) => {}
                    Err(error) => {
                        links_failed += 1;
                        tracing::warn!(
                            target: "quire_vault::operations",
                            path = %reference,
                            error = %error,
                            "failed to update links"
                        );
                    }
                }
            }

            Ok(RenameReport {
                from: source.reference,
                to: destination.reference,
                modified,
                links_updated,
                links_failed,
            })
        })
    }
}

/// Rewrites links in one document, returning whether it changed.
fn rewrite_links(
    path: &Utf8Path,
    reference: &str,
    rewrites: &[LinkRewrite],
) -> Result<bool, VaultError> {
    let original = read_document(path, reference)?;
    let updated = rewrites
        .iter()
        .fold(original.clone(), |text, rewrite| rewrite.apply(&text));
    if updated == original {
        return Ok(false);
    }
    write_atomic(path, &updated)?;
    Ok(true)
}
