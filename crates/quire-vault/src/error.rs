//! Error types surfaced by vault operations.
//!
//! Every rejection carries an [`ErrorKind`] so the dispatch boundary can map
//! failures without matching on messages. Validation failures are always
//! reported before any mutating I/O takes place.

use std::fmt;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use thiserror::Error;

/// Coarse classification of a [`VaultError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A reference escaped the vault or was not a usable path.
    InvalidPath,
    /// A document, heading, or insertion target does not exist.
    NotFound,
    /// The document changed underneath the caller, or edits collide.
    Conflict,
    /// A match that must be unique occurred more than once.
    Ambiguous,
    /// The request itself is unusable.
    Malformed,
    /// A multi-document sweep stopped at a cancellation point.
    Cancelled,
    /// The filesystem reported an error.
    Io,
}

impl ErrorKind {
    /// Stable identifier used in JSON envelopes.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidPath => "invalid_path",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Ambiguous => "ambiguous",
            Self::Malformed => "malformed",
            Self::Cancelled => "cancelled",
            Self::Io => "io",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single problem found while validating a batch of edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchIssue {
    /// One-based position of the offending edit in the caller's batch.
    index: usize,
    #[serde(rename = "type")]
    kind: ErrorKind,
    message: String,
}

impl BatchIssue {
    /// Builds an issue for the edit at the one-based `index`.
    #[must_use]
    pub fn new(index: usize, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            index,
            kind,
            message: message.into(),
        }
    }

    /// One-based position of the offending edit.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Classification of the issue.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Human-readable description.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for BatchIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "edit {}: {}", self.index, self.message)
    }
}

/// Errors surfaced by vault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Containment failure, unusable reference, or disallowed vault switch.
    #[error("invalid path '{path}': {reason}")]
    InvalidPath {
        /// Reference as supplied by the caller.
        path: String,
        /// Why the reference was rejected.
        reason: String,
    },

    /// A document, heading, or target line is missing.
    #[error("{message}")]
    NotFound {
        /// Document the lookup ran against.
        path: String,
        /// Description of what was missing.
        message: String,
    },

    /// Stale modification stamp, overlapping edits, or an existing output.
    #[error("{message}")]
    Conflict {
        /// Document involved in the conflict.
        path: String,
        /// Description of the conflict.
        message: String,
    },

    /// A match that must be unique occurred more than once.
    #[error("{message}")]
    Ambiguous {
        /// Document the match ran against.
        path: String,
        /// Number of matches observed.
        count: usize,
        /// Description of the ambiguity.
        message: String,
    },

    /// The request could not be interpreted.
    #[error("{message}")]
    Malformed {
        /// Document the request targeted, when known.
        path: Option<String>,
        /// Description of the defect.
        message: String,
    },

    /// One or more edits in a batch failed validation.
    #[error("batch edit validation failed for {path}:{}", render_issues(.issues))]
    BatchRejected {
        /// Document the batch targeted.
        path: String,
        /// Every issue found, in discovery order.
        issues: Vec<BatchIssue>,
    },

    /// A sweep stopped at a cancellation point.
    #[error("operation cancelled after {completed} of {total} documents")]
    Cancelled {
        /// Documents fully processed before stopping.
        completed: usize,
        /// Documents the sweep intended to process.
        total: usize,
    },

    /// The filesystem reported an error.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Absolute path involved in the failing call.
        path: Utf8PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
}

fn render_issues(issues: &[BatchIssue]) -> String {
    issues.iter().map(|issue| format!("\n- {issue}")).collect()
}

impl VaultError {
    /// Rejects a reference with the supplied reason.
    #[must_use]
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Reports a missing document.
    #[must_use]
    pub fn document_not_found(path: &str) -> Self {
        Self::NotFound {
            path: path.to_owned(),
            message: format!("document not found: {path}"),
        }
    }

    /// Reports a heading missing from a document.
    #[must_use]
    pub fn heading_not_found(path: &str, heading: &str) -> Self {
        Self::NotFound {
            path: path.to_owned(),
            message: format!("heading '{heading}' not found in {path}"),
        }
    }

    /// Reports an output document that already exists.
    #[must_use]
    pub fn already_exists(path: &str) -> Self {
        Self::Conflict {
            path: path.to_owned(),
            message: format!("document already exists: {path}"),
        }
    }

    /// Reports an unusable request.
    #[must_use]
    pub fn malformed(path: Option<&str>, message: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.map(str::to_owned),
            message: message.into(),
        }
    }

    /// Wraps an I/O failure for `path`.
    #[must_use]
    pub fn io(path: &Utf8Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Classification used by the dispatch boundary.
    ///
    /// A rejected batch takes the kind of its first issue.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidPath { .. } => ErrorKind::InvalidPath,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Ambiguous { .. } => ErrorKind::Ambiguous,
            Self::Malformed { .. } => ErrorKind::Malformed,
            Self::BatchRejected { issues, .. } => issues
                .first()
                .map_or(ErrorKind::Malformed, BatchIssue::kind),
            Self::Cancelled { .. } => ErrorKind::Cancelled,
            Self::Io { .. } => ErrorKind::Io,
        }
    }

    /// Issues attached to a rejected batch; empty for every other variant.
    #[must_use]
    pub fn issues(&self) -> &[BatchIssue] {
        match self {
            Self::BatchRejected { issues, .. } => issues,
            _ => &[],
        }
    }

    /// Renders the `{"status":"error","type":…,"details":…}` envelope.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let issues = self.issues();
        let envelope = VaultErrorEnvelope {
            status: "error",
            kind: self.kind(),
            details: VaultErrorDetails {
                message: self.to_string(),
                path: self.path(),
                issues: (!issues.is_empty()).then_some(issues),
            },
        };
        serde_json::to_string(&envelope)
    }

    fn path(&self) -> Option<String> {
        match self {
            Self::InvalidPath { path, .. }
            | Self::NotFound { path, .. }
            | Self::Conflict { path, .. }
            | Self::Ambiguous { path, .. }
            | Self::BatchRejected { path, .. } => Some(path.clone()),
            Self::Malformed { path, .. } => path.clone(),
            Self::Io { path, .. } => Some(path.to_string()),
            Self::Cancelled { .. } => None,
        }
    }
}

#[derive(Debug, Serialize)]
struct VaultErrorEnvelope<'a> {
    status: &'static str,
    #[serde(rename = "type")]
    kind: ErrorKind,
    details: VaultErrorDetails<'a>,
}

#[derive(Debug, Serialize)]
struct VaultErrorDetails<'a> {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    issues: Option<&'a [BatchIssue]>,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::Value;

    use super::*;

    #[rstest]
    fn batch_kind_follows_first_issue() {
        let error = VaultError::BatchRejected {
            path: "notes/a.md".to_owned(),
            issues: vec![
                BatchIssue::new(2, ErrorKind::Ambiguous, "old_text found 3 times"),
                BatchIssue::new(1, ErrorKind::NotFound, "old_text not found"),
            ],
        };
        assert_eq!(error.kind(), ErrorKind::Ambiguous);
    }

    #[rstest]
    fn batch_message_lists_every_issue() {
        let error = VaultError::BatchRejected {
            path: "a.md".to_owned(),
            issues: vec![
                BatchIssue::new(1, ErrorKind::Malformed, "old_text is empty"),
                BatchIssue::new(3, ErrorKind::NotFound, "old_text not found: \"x\""),
            ],
        };
        assert_eq!(
            error.to_string(),
            "batch edit validation failed for a.md:\n- edit 1: old_text is empty\n- edit 3: old_text not found: \"x\""
        );
    }

    #[rstest]
    fn json_envelope_carries_kind_and_path() {
        let error = VaultError::heading_not_found("a.md", "Tasks");
        let json = error.to_json().expect("serialise envelope");
        let value: Value = serde_json::from_str(&json).expect("parse envelope");

        assert_eq!(value["status"], "error");
        assert_eq!(value["type"], "not_found");
        assert_eq!(value["details"]["path"], "a.md");
        assert_eq!(value["details"]["message"], "heading 'Tasks' not found in a.md");
        assert!(value["details"].get("issues").is_none());
    }

    #[rstest]
    fn json_envelope_lists_batch_issues() {
        let error = VaultError::BatchRejected {
            path: "a.md".to_owned(),
            issues: vec![BatchIssue::new(2, ErrorKind::Conflict, "edits 1 and 2 overlap")],
        };
        let json = error.to_json().expect("serialise envelope");
        let value: Value = serde_json::from_str(&json).expect("parse envelope");

        assert_eq!(value["type"], "conflict");
        assert_eq!(value["details"]["issues"][0]["index"], 2);
        assert_eq!(value["details"]["issues"][0]["type"], "conflict");
    }

    #[rstest]
    fn cancellation_omits_path() {
        let error = VaultError::Cancelled {
            completed: 1,
            total: 4,
        };
        let json = error.to_json().expect("serialise envelope");
        assert!(!json.contains("\"path\""));
        assert_eq!(error.kind(), ErrorKind::Cancelled);
    }
}
