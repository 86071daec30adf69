//! Find-and-replace engine for single edits and all-or-nothing batches.
//!
//! A batch is validated in full against one snapshot of the document before
//! anything is spliced. Every edit must match exactly once, and no two matched
//! spans may overlap. Splicing runs from the highest offset down so earlier
//! offsets stay valid.

use serde::{Deserialize, Serialize};

use crate::error::{BatchIssue, ErrorKind, VaultError};
use crate::preview::truncate_line;

/// Characters of `old_text` quoted in validation messages.
const ISSUE_PREVIEW_CHARS: usize = 80;

/// One find-and-replace pair.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EditOperation {
    /// Text to find. Must be non-empty.
    pub old_text: String,
    /// Replacement text.
    pub new_text: String,
}

impl EditOperation {
    /// Builds an edit replacing `old_text` with `new_text`.
    #[must_use]
    pub fn new(old_text: impl Into<String>, new_text: impl Into<String>) -> Self {
        Self {
            old_text: old_text.into(),
            new_text: new_text.into(),
        }
    }

    fn span_end(&self, offset: usize) -> usize {
        offset + self.old_text.len()
    }
}

/// An edit pinned to the byte offset of its unique match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatedEdit<'a> {
    /// The edit being applied.
    pub edit: &'a EditOperation,
    /// Byte offset of `old_text` in the validated snapshot.
    pub offset: usize,
    /// One-based position in the caller's batch.
    pub index: usize,
}

impl LocatedEdit<'_> {
    fn end(&self) -> usize {
        self.edit.span_end(self.offset)
    }
}

/// Validates every edit against `content`.
///
/// All edits are checked before anything is reported, so the returned error
/// lists every problem at once. Located edits are returned in ascending
/// offset order.
///
/// # Errors
///
/// Returns [`VaultError::BatchRejected`] when any edit is empty, missing,
/// repeated, or overlaps another.
pub fn validate<'a>(
    reference: &str,
    content: &str,
    edits: &'a [EditOperation],
) -> Result<Vec<LocatedEdit<'a>>, VaultError> {
    let mut located = Vec::with_capacity(edits.len());
    let mut issues = Vec::new();

    for (position, edit) in edits.iter().enumerate() {
        let index = position + 1;
        if edit.old_text.is_empty() {
            issues.push(BatchIssue::new(index, ErrorKind::Malformed, "old_text is empty"));
            continue;
        }

        let quoted = truncate_line(&edit.old_text, ISSUE_PREVIEW_CHARS);
        match content.matches(edit.old_text.as_str()).count() {
            0 => issues.push(BatchIssue::new(
                index,
                ErrorKind::NotFound,
                format!("old_text not found: {quoted:?}"),
            )),
            1 => {
                if let Some(offset) = content.find(edit.old_text.as_str()) {
                    located.push(LocatedEdit {
                        edit,
                        offset,
                        index,
                    });
                }
            }
            count => issues.push(BatchIssue::new(
                index,
                ErrorKind::Ambiguous,
                format!("old_text found {count} times (must be unique): {quoted:?}"),
            )),
        }
    }

    located.sort_by_key(|edit| edit.offset);
    for pair in located.windows(2) {
        if let [earlier, later] = pair
            && later.offset < earlier.end()
        {
            issues.push(BatchIssue::new(
                later.index,
                ErrorKind::Conflict,
                format!("edits {} and {} overlap", earlier.index, later.index),
            ));
        }
    }

    if issues.is_empty() {
        Ok(located)
    } else {
        Err(VaultError::BatchRejected {
            path: reference.to_owned(),
            issues,
        })
    }
}

/// Splices validated edits into `content`, highest offset first.
#[must_use]
pub fn apply(content: &str, located: &[LocatedEdit<'_>]) -> String {
    let mut ordered = located.to_vec();
    ordered.sort_by(|a, b| b.offset.cmp(&a.offset));

    let mut result = content.to_owned();
    for edit in &ordered {
        result.replace_range(edit.offset..edit.end(), &edit.edit.new_text);
    }
    result
}

/// Result of a single find-and-replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    /// Document text after replacement.
    pub content: String,
    /// Number of occurrences replaced.
    pub replaced: usize,
    /// Byte offset of the first replaced occurrence.
    pub first_offset: usize,
}

/// Applies one edit under the single-edit policy.
///
/// One occurrence is replaced. Several occurrences are rejected unless
/// `replace_all` is set, in which case every occurrence is replaced.
///
/// # Errors
///
/// Returns [`VaultError::Malformed`] for empty `old_text`,
/// [`VaultError::NotFound`] when it does not occur, and
/// [`VaultError::Ambiguous`] when it occurs more than once without
/// `replace_all`.
pub fn replace_text(
    reference: &str,
    content: &str,
    edit: &EditOperation,
    replace_all: bool,
) -> Result<Replacement, VaultError> {
    let needle = edit.old_text.as_str();
    if needle.is_empty() {
        return Err(VaultError::malformed(Some(reference), "old_text is empty"));
    }

    let count = content.matches(needle).count();
    let Some(first_offset) = content.find(needle) else {
        return Err(VaultError::NotFound {
            path: reference.to_owned(),
            message: format!("old_text not found in {reference}"),
        });
    };

    if count > 1 && !replace_all {
        return Err(VaultError::Ambiguous {
            path: reference.to_owned(),
            count,
            message: format!(
                "found {count} occurrences of old_text in {reference}; set replace_all or include more context to match uniquely"
            ),
        });
    }

    let updated = if replace_all {
        content.replace(needle, &edit.new_text)
    } else {
        content.replacen(needle, &edit.new_text, 1)
    };

    Ok(Replacement {
        content: updated,
        replaced: count,
        first_offset,
    })
}
