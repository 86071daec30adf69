//! Frontmatter property writes: set, remove, and list additions.

use serde::Deserialize;

use crate::error::VaultError;
use crate::frontmatter::{add_to_list, remove_key, set_key};
use crate::report::MutationReport;
use crate::vault::Vault;

use super::Rewrite;

/// Sets a top-level frontmatter key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SetPropertyRequest {
    /// Vault-relative reference.
    pub path: String,
    /// Key, written in lowercase.
    pub key: String,
    /// Value, written verbatim on one line.
    pub value: String,
    /// Stamp the document must still carry.
    #[serde(default)]
    pub expected_modified: Option<String>,
}

/// Removes a top-level frontmatter key and any list items under it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RemovePropertyRequest {
    /// Vault-relative reference.
    pub path: String,
    /// Key, matched case-insensitively.
    pub key: String,
    /// Stamp the document must still carry.
    #[serde(default)]
    pub expected_modified: Option<String>,
}

/// Adds an entry to the `aliases` list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AddAliasRequest {
    /// Vault-relative reference.
    pub path: String,
    /// Alternative name for the document.
    pub alias: String,
    /// Stamp the document must still carry.
    #[serde(default)]
    pub expected_modified: Option<String>,
}

/// Adds an entry to the `tags` list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AddTagRequest {
    /// Vault-relative reference.
    pub path: String,
    /// Tag, with or without a leading `#`.
    pub tag: String,
    /// Stamp the document must still carry.
    #[serde(default)]
    pub expected_modified: Option<String>,
}

fn single_line<'a>(reference: &str, field: &str, value: &'a str) -> Result<&'a str, VaultError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(VaultError::malformed(Some(reference), format!("{field} is empty")));
    }
    if trimmed.contains('\n') {
        return Err(VaultError::malformed(
            Some(reference),
            format!("{field} must fit on one line"),
        ));
    }
    Ok(trimmed)
}

fn property_key<'a>(reference: &str, key: &'a str) -> Result<&'a str, VaultError> {
    let name = single_line(reference, "key", key)?;
    if name.contains(':') || name.starts_with(['-', '#']) {
        return Err(VaultError::malformed(
            Some(reference),
            format!("'{name}' is not a usable frontmatter key"),
        ));
    }
    Ok(name)
}

impl Vault {
    /// Sets a frontmatter key, creating the block when missing.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Malformed`] for an unusable key or a multi-line
    /// value, plus the resolution, stamp, and I/O failures shared by every
    /// mutation.
    pub fn set_property(&self, request: &SetPropertyRequest) -> Result<MutationReport, VaultError> {
        self.rewrite(
            "set_property",
            &request.path,
            request.expected_modified.as_deref(),
            |reference, content| {
                let key = property_key(reference, &request.key)?;
                let value = request.value.trim();
                if value.contains('\n') {
                    return Err(VaultError::malformed(
                        Some(reference),
                        "value must fit on one line",
                    ));
                }
                Ok(Rewrite::Changed {
                    content: set_key(content, key, value),
                    summary: format!("set {}: {value} in {reference}", key.to_lowercase()),
                    changes: 1,
                })
            },
        )
    }

    /// Removes a frontmatter key. A missing key leaves the document alone.
    ///
    /// # Errors
    ///
    /// Fails as [`Vault::set_property`] does.
    pub fn remove_property(
        &self,
        request: &RemovePropertyRequest,
    ) -> Result<MutationReport, VaultError> {
        self.rewrite(
            "remove_property",
            &request.path,
            request.expected_modified.as_deref(),
            |reference, content| {
                let key = property_key(reference, &request.key)?;
                Ok(remove_key(content, key).map_or_else(
                    || Rewrite::Unchanged {
                        summary: format!("key '{key}' not found in frontmatter of {reference}"),
                    },
                    |updated| Rewrite::Changed {
                        content: updated,
                        summary: format!("removed {key} from {reference}"),
                        changes: 1,
                    },
                ))
            },
        )
    }

    /// Adds an alias to the document's `aliases` list.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Malformed`] for an empty alias, plus the shared
    /// mutation failures.
    pub fn add_alias(&self, request: &AddAliasRequest) -> Result<MutationReport, VaultError> {
        self.add_list_value(
            "add_alias",
            &request.path,
            "aliases",
            &request.alias,
            request.expected_modified.as_deref(),
        )
    }

    /// Adds a tag to the document's `tags` list, dropping a leading `#`.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Malformed`] for an empty tag, plus the shared
    /// mutation failures.
    pub fn add_tag(&self, request: &AddTagRequest) -> Result<MutationReport, VaultError> {
        let tag = request.tag.trim();
        self.add_list_value(
            "add_tag",
            &request.path,
            "tags",
            tag.strip_prefix('#').unwrap_or(tag),
            request.expected_modified.as_deref(),
        )
    }

    fn add_list_value(
        &self,
        operation: &'static str,
        path: &str,
        key: &'static str,
        raw: &str,
        expected_modified: Option<&str>,
    ) -> Result<MutationReport, VaultError> {
        self.rewrite(operation, path, expected_modified, |reference, content| {
            let value = single_line(reference, key, raw)?;
            Ok(add_to_list(content, key, value).map_or_else(
                || Rewrite::Unchanged {
                    summary: format!("'{value}' is already in {key} of {reference}"),
                },
                |updated| Rewrite::Changed {
                    content: updated,
                    summary: format!("added '{value}' to {key} of {reference}"),
                    changes: 1,
                },
            ))
        })
    }
}
