//! Acknowledgements returned by successful operations.

use serde::Serialize;

use crate::sections::Heading;
use crate::tasks::Task;

/// A document and the stamp to echo back on the next mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSnapshot {
    /// Vault-relative reference.
    pub path: String,
    /// Full document text.
    pub content: String,
    /// Modification stamp at read time.
    pub modified: String,
}

/// Heading outline of one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outline {
    /// Vault-relative reference.
    pub path: String,
    /// Headings in document order.
    pub headings: Vec<Heading>,
}

/// Acknowledgement of a mutation against one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MutationReport {
    /// Vault-relative reference of the affected document.
    pub path: String,
    /// Human-readable outcome.
    pub summary: String,
    /// Occurrences, edits, or lines affected, depending on the operation.
    pub changes: usize,
    /// Stamp after the write; absent for dry runs and deletions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    /// Numbered context around the change, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    /// Whether the filesystem was left untouched on purpose.
    pub dry_run: bool,
}

impl MutationReport {
    pub(crate) fn written(path: &str, summary: String, changes: usize, modified: String) -> Self {
        Self {
            path: path.to_owned(),
            summary,
            changes,
            modified: Some(modified),
            preview: None,
            dry_run: false,
        }
    }

    pub(crate) fn dry_run(path: &str, summary: String, changes: usize) -> Self {
        Self {
            path: path.to_owned(),
            summary,
            changes,
            modified: None,
            preview: None,
            dry_run: true,
        }
    }

    pub(crate) fn unchanged(path: &str, summary: String, modified: String) -> Self {
        Self {
            path: path.to_owned(),
            summary,
            changes: 0,
            modified: Some(modified),
            preview: None,
            dry_run: false,
        }
    }

    /// A change to the tree itself, such as a folder, with no stamp.
    pub(crate) fn structural(path: &str, summary: String, changes: usize) -> Self {
        Self {
            path: path.to_owned(),
            summary,
            changes,
            modified: None,
            preview: None,
            dry_run: false,
        }
    }

    pub(crate) fn removed(path: &str, summary: String) -> Self {
        Self::structural(path, summary, 1)
    }

    pub(crate) fn with_preview(mut self, preview: Option<String>) -> Self {
        self.preview = preview.filter(|text| !text.is_empty());
        self
    }
}

/// Outcome of cutting a section into its own document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractReport {
    /// Document the section was taken from.
    pub source: String,
    /// Newly created document.
    pub output: String,
    /// Stamp of the new document.
    pub output_modified: String,
    /// Stamp of the source when it was rewritten.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_modified: Option<String>,
}

/// Outcome of splitting a document by heading level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplitReport {
    /// Document that was split.
    pub source: String,
    /// Documents created, in section order.
    pub created: Vec<String>,
    /// Whether the source was deleted afterwards.
    pub source_removed: bool,
}

/// Outcome of moving a document and rewriting links to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameReport {
    /// Previous reference.
    pub from: String,
    /// New reference.
    pub to: String,
    /// Stamp of the moved document.
    pub modified: String,
    /// Documents whose links were rewritten.
    pub links_updated: usize,
    /// Documents that could not be rewritten.
    pub links_failed: usize,
}

/// Outcome of concatenating several documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// Document written.
    pub output: String,
    /// Stamp of the written document; absent for dry runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    /// Sources in merge order.
    pub sources: Vec<String>,
    /// Sources that were deleted afterwards.
    pub deleted: Vec<String>,
    /// Whether the filesystem was left untouched on purpose.
    pub dry_run: bool,
}

/// Outcome of ticking several tasks in one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskReport {
    /// Vault-relative reference.
    pub path: String,
    /// Stamp after the write; absent when nothing changed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    /// Tasks ticked by this call, as they now read.
    pub completed: Vec<Task>,
    /// Matched tasks that were already ticked.
    pub already_complete: Vec<Task>,
    /// Requested texts that matched no task or several.
    pub unmatched: Vec<String>,
}
