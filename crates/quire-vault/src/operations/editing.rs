//! In-place text mutations of a single document.

use serde::Deserialize;

use crate::batch::{EditOperation, apply, replace_text, validate};
use crate::commit::{exists, read_document, write_atomic};
use crate::concurrency::{check, modification_stamp};
use crate::error::VaultError;
use crate::preview::{Marker, render_context};
use crate::report::MutationReport;
use crate::sections::{parse_heading, replace_section_body};
use crate::vault::Vault;

use super::{line_of_offset, preview_at, traced};

/// Replaces one unique occurrence, or every occurrence with `replace_all`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EditRequest {
    /// Vault-relative reference.
    pub path: String,
    /// Text to find.
    pub old_text: String,
    /// Replacement text.
    pub new_text: String,
    /// Replace every occurrence instead of requiring a unique one.
    #[serde(default)]
    pub replace_all: bool,
    /// Stamp the document must still carry.
    #[serde(default)]
    pub expected_modified: Option<String>,
    /// Lines of context to render around the first change.
    #[serde(default)]
    pub context_lines: usize,
}

/// Applies several unique replacements as one write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BatchEditRequest {
    /// Vault-relative reference.
    pub path: String,
    /// Edits, validated together against one snapshot.
    pub edits: Vec<EditOperation>,
    /// Validate without writing.
    #[serde(default)]
    pub dry_run: bool,
    /// Stamp the document must still carry.
    #[serde(default)]
    pub expected_modified: Option<String>,
    /// Lines of context to render around the first edit by position.
    #[serde(default)]
    pub context_lines: usize,
}

/// Replaces the body beneath a heading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReplaceSectionRequest {
    /// Vault-relative reference.
    pub path: String,
    /// Heading text, matched case-insensitively.
    pub heading: String,
    /// New section body.
    pub content: String,
    /// Stamp the document must still carry.
    #[serde(default)]
    pub expected_modified: Option<String>,
    /// Lines of context to render around the new body.
    #[serde(default)]
    pub context_lines: usize,
}

/// Where appended content lands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppendPosition {
    /// After the last line, separated by a blank line.
    #[default]
    End,
    /// Before the first line.
    Start,
    /// Directly after the target line.
    After,
    /// Directly before the target line.
    Before,
}

/// Inserts content into a document, creating it when missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AppendRequest {
    /// Vault-relative reference.
    pub path: String,
    /// Text to insert.
    pub content: String,
    /// Insertion point.
    #[serde(default)]
    pub position: AppendPosition,
    /// Line or heading anchoring `after` and `before`.
    #[serde(default)]
    pub target: Option<String>,
    /// Stamp the document must still carry.
    #[serde(default)]
    pub expected_modified: Option<String>,
    /// Lines of context to render around the insertion.
    #[serde(default)]
    pub context_lines: usize,
}

impl Vault {
    /// Performs a single find-and-replace.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::NotFound`] when `old_text` is absent,
    /// [`VaultError::Ambiguous`] when it repeats without `replace_all`, and
    /// [`VaultError::Conflict`] when the stamp is stale.
    pub fn edit(&self, request: &EditRequest) -> Result<MutationReport, VaultError> {
        traced("edit", &request.path, || {
            let root = self.root();
            let document = Self::resolve(&root, &request.path)?;
            let content = read_document(&document.path, &document.reference)?;
            check(
                &document.path,
                &document.reference,
                request.expected_modified.as_deref(),
            )?;

            let operation = EditOperation::new(request.old_text.clone(), request.new_text.clone());
            let replacement =
                replace_text(&document.reference, &content, &operation, request.replace_all)?;
            write_atomic(&document.path, &replacement.content)?;
            let modified = modification_stamp(&document.path, &document.reference)?;

            let preview = preview_at(
                &replacement.content,
                line_of_offset(&replacement.content, replacement.first_offset),
                &request.new_text,
                request.context_lines,
                Marker::Changed,
            );
            Ok(MutationReport::written(
                &document.reference,
                format!(
                    "replaced {} occurrence(s) in {}",
                    replacement.replaced, document.reference
                ),
                replacement.replaced,
                modified,
            )
            .with_preview(preview))
        })
    }

    /// Applies every edit in one write, or none of them.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Malformed`] for an empty batch and
    /// [`VaultError::BatchRejected`] listing every invalid edit. The document
    /// is byte-identical after any rejection.
    pub fn batch_edit(&self, request: &BatchEditRequest) -> Result<MutationReport, VaultError> {
        traced("batch_edit", &request.path, || {
            let root = self.root();
            let document = Self::resolve(&root, &request.path)?;
            if request.edits.is_empty() {
                return Err(VaultError::malformed(
                    Some(document.reference.as_str()),
                    "edits list is empty",
                ));
            }

            let content = read_document(&document.path, &document.reference)?;
            check(
                &document.path,
                &document.reference,
                request.expected_modified.as_deref(),
            )?;
            let located = validate(&document.reference, &content, &request.edits)?;
            let result = apply(&content, &located);
            let count = located.len();

            let preview = located.first().and_then(|first| {
                preview_at(
                    &result,
                    line_of_offset(&result, first.offset),
                    &first.edit.new_text,
                    request.context_lines,
                    Marker::Changed,
                )
            });

            if request.dry_run {
                return Ok(MutationReport::dry_run(
                    &document.reference,
                    format!("dry run: {count} edit(s) to {} are valid", document.reference),
                    count,
                )
                .with_preview(preview));
            }

            write_atomic(&document.path, &result)?;
            let modified = modification_stamp(&document.path, &document.reference)?;
            Ok(MutationReport::written(
                &document.reference,
                format!("applied {count} edit(s) to {}", document.reference),
                count,
                modified,
            )
            .with_preview(preview))
        })
    }

    /// Replaces the body of the first section titled `heading`.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::NotFound`] when the heading is missing and
    /// [`VaultError::Conflict`] when the stamp is stale.
    pub fn replace_section(
        &self,
        request: &ReplaceSectionRequest,
    ) -> Result<MutationReport, VaultError> {
        traced("replace_section", &request.path, || {
            let root = self.root();
            let document = Self::resolve(&root, &request.path)?;
            let content = read_document(&document.path, &document.reference)?;
            check(
                &document.path,
                &document.reference,
                request.expected_modified.as_deref(),
            )?;

            let replaced = replace_section_body(&content, &request.heading, &request.content)
                .ok_or_else(|| {
                    VaultError::heading_not_found(&document.reference, &request.heading)
                })?;
            write_atomic(&document.path, &replaced.content)?;
            let modified = modification_stamp(&document.path, &document.reference)?;

            let preview = (request.context_lines > 0).then(|| {
                let lines: Vec<&str> = replaced.content.split('\n').collect();
                let end = (replaced.body_start + replaced.inserted_lines).min(lines.len());
                let edited = lines.get(replaced.body_start..end).unwrap_or_default();
                render_context(
                    &lines,
                    replaced.body_start,
                    end,
                    request.context_lines,
                    edited,
                    Marker::Changed,
                )
            });

            Ok(MutationReport::written(
                &document.reference,
                format!(
                    "replaced section '{}' in {} ({} lines replaced with {} lines)",
                    request.heading,
                    document.reference,
                    replaced.replaced_lines,
                    replaced.inserted_lines
                ),
                replaced.inserted_lines,
                modified,
            )
            .with_preview(preview))
        })
    }

    /// Inserts content at the requested position.
    ///
    /// A missing document is created holding exactly `content`.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::NotFound`] when an `after`/`before` target is
    /// absent, [`VaultError::Ambiguous`] when it matches several lines, and
    /// [`VaultError::Malformed`] when the target is empty.
    pub fn append(&self, request: &AppendRequest) -> Result<MutationReport, VaultError> {
        traced("append", &request.path, || {
            let root = self.root();
            let document = Self::resolve(&root, &request.path)?;
            check(
                &document.path,
                &document.reference,
                request.expected_modified.as_deref(),
            )?;

            if !exists(&document.path) {
                write_atomic(&document.path, &request.content)?;
                let modified = modification_stamp(&document.path, &document.reference)?;
                return Ok(MutationReport::written(
                    &document.reference,
                    format!("created {}", document.reference),
                    request.content.split('\n').count(),
                    modified,
                ));
            }

            let content = read_document(&document.path, &document.reference)?;
            let lines: Vec<&str> = content.split('\n').collect();
            let inserted: Vec<&str> = request.content.split('\n').collect();
            let (start, merged) = insert_lines(
                &document.reference,
                &lines,
                &inserted,
                request.position,
                request.target.as_deref().unwrap_or_default(),
            )?;
            let result = merged.join("\n");

            write_atomic(&document.path, &result)?;
            let modified = modification_stamp(&document.path, &document.reference)?;

            let preview = (request.context_lines > 0).then(|| {
                let end = (start + inserted.len()).min(merged.len());
                render_context(
                    &merged,
                    start,
                    end,
                    request.context_lines,
                    &inserted,
                    Marker::Inserted,
                )
            });
            Ok(MutationReport::written(
                &document.reference,
                format!("appended content to {}", document.reference),
                inserted.len(),
                modified,
            )
            .with_preview(preview))
        })
    }
}

/// Splices `inserted` into `lines`, returning the insertion index and result.
fn insert_lines<'a>(
    reference: &str,
    lines: &[&'a str],
    inserted: &[&'a str],
    position: AppendPosition,
    target: &str,
) -> Result<(usize, Vec<&'a str>), VaultError> {
    let index = match position {
        AppendPosition::End => {
            let mut merged = lines.to_vec();
            if lines.last().is_some_and(|last| !last.is_empty()) {
                merged.push("");
            }
            let start = merged.len();
            merged.extend_from_slice(inserted);
            return Ok((start, merged));
        }
        AppendPosition::Start => 0,
        AppendPosition::After => find_target_line(reference, lines, target)? + 1,
        AppendPosition::Before => find_target_line(reference, lines, target)?,
    };

    let split_at = index.min(lines.len());
    let (head, tail) = lines.split_at(split_at);
    let merged = head
        .iter()
        .chain(inserted.iter())
        .chain(tail.iter())
        .copied()
        .collect();
    Ok((split_at, merged))
}

/// Locates the line an insertion is anchored to.
///
/// A heading whose text equals `target` (ignoring case) wins outright.
/// Otherwise exactly one line must contain `target` (ignoring case).
fn find_target_line(reference: &str, lines: &[&str], target: &str) -> Result<usize, VaultError> {
    if target.trim().is_empty() {
        return Err(VaultError::malformed(
            Some(reference),
            "an insertion target is required for positions 'after' and 'before'",
        ));
    }

    let wanted = target.to_lowercase();
    if let Some(index) = lines.iter().position(|line| {
        parse_heading(line).is_some_and(|(_, text)| text.to_lowercase() == wanted)
    }) {
        return Ok(index);
    }

    let matches: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.to_lowercase().contains(&wanted))
        .map(|(index, _)| index)
        .collect();

    match matches.as_slice() {
        [] => Err(VaultError::NotFound {
            path: reference.to_owned(),
            message: format!("target '{target}' not found in {reference}"),
        }),
        [only] => Ok(*only),
        several => Err(VaultError::Ambiguous {
            path: reference.to_owned(),
            count: several.len(),
            message: format!(
                "ambiguous target '{target}' found {} times in {reference}",
                several.len()
            ),
        }),
    }
}
