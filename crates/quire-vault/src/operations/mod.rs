//! Document operations exposed on [`Vault`](crate::Vault).
//!
//! Every mutation follows the same path: resolve and contain the reference,
//! check the expected modification stamp, transform the content in memory,
//! then write once. A rejection at any step leaves the filesystem untouched.

mod checklists;
mod documents;
mod editing;
mod folders;
mod links;
mod properties;
mod refactor;

pub use documents::{DeleteRequest, WriteRequest};
pub use editing::{
    AppendPosition, AppendRequest, BatchEditRequest, EditRequest, ReplaceSectionRequest,
};
pub use checklists::{CompleteTasksRequest, ToggleTaskRequest};
pub use folders::DeleteFolderRequest;
pub use links::RenameRequest;
pub use properties::{AddAliasRequest, AddTagRequest, RemovePropertyRequest, SetPropertyRequest};
pub use refactor::{DuplicateRequest, ExtractSectionRequest, MergeRequest, SplitRequest};

use crate::commit::{read_document, write_atomic};
use crate::concurrency::{check, modification_stamp};
use crate::error::VaultError;
use crate::preview::{Marker, render_context};
use crate::report::MutationReport;
use crate::vault::Vault;

const TARGET: &str = "quire_vault::operations";

/// Runs `operation`, logging entry, completion, and rejection.
fn traced<T>(
    operation: &'static str,
    reference: &str,
    run: impl FnOnce() -> Result<T, VaultError>,
) -> Result<T, VaultError> {
    tracing::debug!(target: TARGET, operation, path = %reference, "mutation received");
    match run() {
        Ok(value) => {
            tracing::info!(target: TARGET, operation, path = %reference, "mutation completed");
            Ok(value)
        }
        Err(error) => {
            tracing::debug!(
                target: TARGET,
                operation,
                path = %reference,
                kind = %error.kind(),
                error = %error,
                "mutation rejected"
            );
            Err(error)
        }
    }
}

/// Decision taken by a single-document rewrite.
enum Rewrite {
    /// Commit `content` in one write.
    Changed {
        content: String,
        summary: String,
        changes: usize,
    },
    /// Leave the document as it is.
    Unchanged { summary: String },
}

impl Vault {
    /// Reads a document, checks its stamp, and commits what `transform`
    /// decides. `transform` receives the normalised reference and content.
    fn rewrite(
        &self,
        operation: &'static str,
        reference: &str,
        expected_modified: Option<&str>,
        transform: impl FnOnce(&str, &str) -> Result<Rewrite, VaultError>,
    ) -> Result<MutationReport, VaultError> {
        traced(operation, reference, || {
            let root = self.root();
            let document = Self::resolve(&root, reference)?;
            let content = read_document(&document.path, &document.reference)?;
            check(&document.path, &document.reference, expected_modified)?;

            match transform(&document.reference, &content)? {
                Rewrite::Changed {
                    content: updated,
                    summary,
                    changes,
                } => {
                    write_atomic(&document.path, &updated)?;
                    let modified = modification_stamp(&document.path, &document.reference)?;
                    Ok(MutationReport::written(&document.reference, summary, changes, modified))
                }
                Rewrite::Unchanged { summary } => {
                    let modified = modification_stamp(&document.path, &document.reference)?;
                    Ok(MutationReport::unchanged(&document.reference, summary, modified))
                }
            }
        })
    }
}

/// Renders a preview of `edited` written at line index `start` of `content`.
fn preview_at(
    content: &str,
    start: usize,
    edited: &str,
    context: usize,
    marker: Marker,
) -> Option<String> {
    if context == 0 {
        return None;
    }
    let lines: Vec<&str> = content.split('\n').collect();
    let edited_lines: Vec<&str> = edited.split('\n').collect();
    let end = (start + edited_lines.len()).min(lines.len());
    Some(render_context(&lines, start, end, context, &edited_lines, marker))
}

/// Zero-based line index of the byte `offset` within `content`.
fn line_of_offset(content: &str, offset: usize) -> usize {
    content
        .get(..offset)
        .map_or(0, |prefix| prefix.matches('\n').count())
}

const fn default_true() -> bool {
    true
}
