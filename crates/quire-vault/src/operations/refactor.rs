//! Operations that reshape documents: extract, split, duplicate, merge.

use std::collections::HashSet;

use camino::Utf8Path;
use serde::Deserialize;

use quire_config::DEFAULT_DOCUMENT_EXTENSION;

use crate::cancellation::Cancellation;
use crate::commit::{exists, read_document, remove_document, write_atomic};
use crate::concurrency::{check, modification_stamp};
use crate::error::VaultError;
use crate::report::{ExtractReport, MergeReport, MutationReport, SplitReport};
use crate::sections::{
    locate_section, parse_heading, remove_section, sanitize_file_stem, split_by_level,
};
use crate::vault::{ResolvedDocument, Vault};

use super::{default_true, traced};

const DEFAULT_SPLIT_LEVEL: usize = 2;
const DEFAULT_SEPARATOR: &str = "\n\n---\n\n";

/// Moves one section into a document of its own.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExtractSectionRequest {
    /// Vault-relative reference of the source document.
    pub path: String,
    /// Heading text, matched case-insensitively.
    pub heading: String,
    /// Output reference; defaults to the sanitised heading at the vault root.
    #[serde(default)]
    pub output: Option<String>,
    /// Cut the section out of the source.
    #[serde(default = "default_true")]
    pub remove_from_source: bool,
    /// Leave a wikilink to the new document where the section was.
    #[serde(default = "default_true")]
    pub add_link: bool,
    /// Stamp the source must still carry.
    #[serde(default)]
    pub expected_modified: Option<String>,
}

impl Default for ExtractSectionRequest {
    fn default() -> Self {
        Self {
            path: String::new(),
            heading: String::new(),
            output: None,
            remove_from_source: true,
            add_link: true,
            expected_modified: None,
        }
    }
}

/// Splits a document into one document per heading of a level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SplitRequest {
    /// Vault-relative reference of the source document.
    pub path: String,
    /// Heading level to split at, 1 to 6; defaults to 2.
    #[serde(default)]
    pub level: Option<usize>,
    /// Directory for the new documents; defaults to the source's directory.
    #[serde(default)]
    pub output_dir: Option<String>,
    /// Keep the source after splitting.
    #[serde(default)]
    pub keep_original: bool,
}

/// Copies a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DuplicateRequest {
    /// Vault-relative reference of the source document.
    pub path: String,
    /// Output reference; defaults to `<stem> (copy)` beside the source.
    #[serde(default)]
    pub output: Option<String>,
}

/// Concatenates several documents into one.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MergeRequest {
    /// Sources in merge order; at least two.
    pub paths: Vec<String>,
    /// Output reference. An existing document is overwritten.
    pub output: String,
    /// Text placed between sources; defaults to a horizontal rule.
    #[serde(default)]
    pub separator: Option<String>,
    /// Prefix `## <stem>` to sources that do not start with a heading.
    #[serde(default = "default_true")]
    pub add_headings: bool,
    /// Delete the sources after writing the output.
    #[serde(default)]
    pub delete_originals: bool,
    /// Validate without writing or deleting.
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for MergeRequest {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            output: String::new(),
            separator: None,
            add_headings: true,
            delete_originals: false,
            dry_run: false,
        }
    }
}

impl Vault {
    /// Cuts a section, nested sub-sections included, into a new document.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::NotFound`] when the heading is missing,
    /// [`VaultError::Conflict`] when the output exists or the source stamp is
    /// stale.
    pub fn extract_section(
        &self,
        request: &ExtractSectionRequest,
    ) -> Result<ExtractReport, VaultError> {
        traced("extract_section", &request.path, || {
            let root = self.root();
            let source = Self::resolve(&root, &request.path)?;
            let content = read_document(&source.path, &source.reference)?;
            check(
                &source.path,
                &source.reference,
                request.expected_modified.as_deref(),
            )?;

            let lines: Vec<&str> = content.split('\n').collect();
            let span = locate_section(&content, &request.heading).ok_or_else(|| {
                VaultError::heading_not_found(&source.reference, &request.heading)
            })?;
            let title = lines
                .get(span.heading_line)
                .and_then(|line| parse_heading(line))
                .map_or_else(|| request.heading.as_str(), |(_, text)| text);
            let body = lines
                .get(span.body_start()..span.end)
                .unwrap_or_default()
                .join("\n");

            let output_reference = request
                .output
                .clone()
                .unwrap_or_else(|| sanitize_file_stem(title));
            let output = Self::resolve(&root, &output_reference)?;
            if exists(&output.path) {
                return Err(VaultError::already_exists(&output.reference));
            }

            let rewritten = if request.remove_from_source {
                let remaining = remove_section(&content, &request.heading).ok_or_else(|| {
                    VaultError::heading_not_found(&source.reference, &request.heading)
                })?;
                Some(if request.add_link {
                    format!("{remaining}\n\nSee: [[{}]]\n", stem_of(&output.reference))
                } else {
                    remaining
                })
            } else {
                None
            };

            write_atomic(&output.path, &format!("# {title}\n\n{}", body.trim()))?;
            let output_modified = modification_stamp(&output.path, &output.reference)?;

            let source_modified = match rewritten {
                Some(text) => {
                    write_atomic(&source.path, &text)?;
                    Some(modification_stamp(&source.path, &source.reference)?)
                }
                None => None,
            };

            Ok(ExtractReport {
                source: source.reference,
                output: output.reference,
                output_modified,
                source_modified,
            })
        })
    }

    /// Writes one document per section at the requested heading level.
    ///
    /// Text before the first heading is dropped. Fewer than two sections
    /// leave the vault unchanged. Every output is checked before the first
    /// write, and `cancel` is polled before each file.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Malformed`] for a level outside 1 to 6,
    /// [`VaultError::Conflict`] when an output exists or two sections share a
    /// file name, and [`VaultError::Cancelled`] when stopped part way.
    pub fn split(
        &self,
        request: &SplitRequest,
        cancel: &Cancellation,
    ) -> Result<SplitReport, VaultError> {
        traced("split", &request.path, || {
            let level = request.level.unwrap_or(DEFAULT_SPLIT_LEVEL);
            if !(1..=6).contains(&level) {
                return Err(VaultError::malformed(
                    Some(request.path.as_str()),
                    format!("invalid split level {level}; expected 1 to 6"),
                ));
            }

            let root = self.root();
            let source = Self::resolve(&root, &request.path)?;
            let content = read_document(&source.path, &source.reference)?;

            let sections: Vec<_> = split_by_level(&content, level)
                .into_iter()
                .filter(|section| !section.title.is_empty())
                .collect();
            if sections.len() < 2 {
                tracing::info!(
                    target: "quire_vault::operations",
                    path = %source.reference,
                    level,
                    "no sections to split at this level"
                );
                return Ok(SplitReport {
                    source: source.reference,
                    created: Vec::new(),
                    source_removed: false,
                });
            }

            let directory = request.output_dir.clone().unwrap_or_else(|| {
                Utf8Path::new(&source.reference)
                    .parent()
                    .map(Utf8Path::to_string)
                    .unwrap_or_default()
            });
            Self::resolve_dir(&root, Some(directory.as_str()))?;

            let mut planned: Vec<(ResolvedDocument, String)> = Vec::with_capacity(sections.len());
            let mut seen = HashSet::new();
            for section in &sections {
                let file_name = format!(
                    "{}.{DEFAULT_DOCUMENT_EXTENSION}",
                    sanitize_file_stem(&section.title)
                );
                let joined = Utf8Path::new(&directory).join(file_name);
                let target = Self::resolve(&root, joined.as_str())?;
                if exists(&target.path) {
                    return Err(VaultError::already_exists(&target.reference));
                }
                if !seen.insert(target.reference.clone()) {
                    return Err(VaultError::Conflict {
                        path: target.reference,
                        message: "two sections map to the same document name".to_owned(),
                    });
                }
                let text = format!("# {}\n\n{}", section.title, section.body.trim());
                planned.push((target, text));
            }

            let total = planned.len();
            let mut created = Vec::with_capacity(total);
            for (target, text) in planned {
                if cancel.is_cancelled() {
                    return Err(VaultError::Cancelled {
                        completed: created.len(),
                        total,
                    });
                }
                write_atomic(&target.path, &text)?;
                created.push(target.reference);
            }

            let source_removed = !request.keep_original;
            if source_removed {
                remove_document(&source.path, &source.reference)?;
            }

            Ok(SplitReport {
                source: source.reference,
                created,
                source_removed,
            })
        })
    }

    /// Copies a document under a new name.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::NotFound`] for a missing source and
    /// [`VaultError::Conflict`] when the output exists.
    pub fn duplicate(&self, request: &DuplicateRequest) -> Result<MutationReport, VaultError> {
        traced("duplicate", &request.path, || {
            let root = self.root();
            let source = Self::resolve(&root, &request.path)?;
            let content = read_document(&source.path, &source.reference)?;

            let output_reference = request.output.clone().unwrap_or_else(|| {
                let directory = Utf8Path::new(&source.reference)
                    .parent()
                    .unwrap_or_else(|| Utf8Path::new(""));
                directory
                    .join(format!("{} (copy)", stem_of(&source.reference)))
                    .to_string()
            });
            let output = Self::resolve(&root, &output_reference)?;
            if exists(&output.path) {
                return Err(VaultError::already_exists(&output.reference));
            }

            write_atomic(&output.path, &content)?;
            let modified = modification_stamp(&output.path, &output.reference)?;
            Ok(MutationReport::written(
                &output.reference,
                format!("duplicated {} to {}", source.reference, output.reference),
                1,
                modified,
            ))
        })
    }

    /// Concatenates documents in order into `output`.
    ///
    /// Every source is read before anything is written. Deleting sources is
    /// best effort: failures are logged and the source is left in place. The
    /// output is never deleted even when it is also a source.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Malformed`] for fewer than two sources and
    /// [`VaultError::NotFound`] when any source is missing.
    pub fn merge(&self, request: &MergeRequest) -> Result<MergeReport, VaultError> {
        traced("merge", &request.output, || {
            if request.paths.len() < 2 {
                return Err(VaultError::malformed(
                    Some(request.output.as_str()),
                    "at least 2 paths are required to merge",
                ));
            }

            let root = self.root();
            let output = Self::resolve(&root, &request.output)?;
            let mut sources = Vec::with_capacity(request.paths.len());
            let mut parts = Vec::with_capacity(request.paths.len());
            for reference in &request.paths {
                let source = Self::resolve(&root, reference)?;
                let content = read_document(&source.path, &source.reference)?;
                let part = if request.add_headings && !content.trim().starts_with('#') {
                    format!("## {}\n\n{content}", stem_of(&source.reference))
                } else {
                    content
                };
                parts.push(part.trim().to_owned());
                sources.push(source);
            }

            let separator = request.separator.as_deref().unwrap_or(DEFAULT_SEPARATOR);
            let merged = parts.join(separator);
            let references: Vec<String> =
                sources.iter().map(|source| source.reference.clone()).collect();

            if request.dry_run {
                return Ok(MergeReport {
                    output: output.reference,
                    modified: None,
                    sources: references,
                    deleted: Vec::new(),
                    dry_run: true,
                });
            }

            write_atomic(&output.path, &merged)?;
            let modified = modification_stamp(&output.path, &output.reference)?;

            let deleted = if request.delete_originals {
                delete_sources(&sources, &output)
            } else {
                Vec::new()
            };

            Ok(MergeReport {
                output: output.reference,
                modified: Some(modified),
                sources: references,
                deleted,
                dry_run: false,
            })
        })
    }
}

fn delete_sources(sources: &[ResolvedDocument], output: &ResolvedDocument) -> Vec<String> {
    let mut deleted = Vec::new();
    for source in sources.iter().filter(|source| source.path != output.path) {
        match remove_document(&source.path, &source.reference) {
            Ok(()) => deleted.push(source.reference.clone()),
            Err(error) => tracing::warn!(
                target: "quire_vault::operations",
                path = %source.reference,
                error = %error,
                "failed to delete merged source"
            ),
        }
    }
    deleted
}

/// File name of `reference` without the document extension.
fn stem_of(reference: &str) -> &str {
    Utf8Path::new(reference).file_stem().unwrap_or(reference)
}
