//! The vault handle: active root, alias registry, and reference resolution.
//!
//! The active root is the only shared mutable state. Operations take one
//! snapshot of it on entry, so a concurrent switch never splits a single
//! operation across two vaults.

use std::sync::{PoisonError, RwLock};

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

use quire_config::{Config, DEFAULT_DOCUMENT_EXTENSION, VaultAlias};

use crate::concurrency::modification_stamp;
use crate::error::VaultError;
use crate::path_guard::{is_safe, lexically_clean};

/// A vault-relative reference resolved to an absolute, contained path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDocument {
    /// Reference with the document extension applied.
    pub reference: String,
    /// Absolute path inside the vault root.
    pub path: Utf8PathBuf,
}

/// Registered vaults and the one currently active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VaultListing {
    /// Root every operation currently runs against.
    pub active: Utf8PathBuf,
    /// Alternate roots that may be switched to.
    pub vaults: Vec<VaultAlias>,
}

/// Handle onto a tree of markdown documents.
#[derive(Debug)]
pub struct Vault {
    root: RwLock<Utf8PathBuf>,
    aliases: Vec<VaultAlias>,
    allow_switching: bool,
}

impl Vault {
    /// Opens a vault rooted at `root`.
    ///
    /// Relative roots are resolved against the working directory. The root is
    /// not required to exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Io`] when the working directory cannot be read
    /// and [`VaultError::InvalidPath`] when it is not valid UTF-8.
    pub fn open(root: impl AsRef<Utf8Path>) -> Result<Self, VaultError> {
        Ok(Self {
            root: RwLock::new(absolute_root(root.as_ref())?),
            aliases: Vec::new(),
            allow_switching: false,
        })
    }

    /// Opens the vault described by `config`.
    ///
    /// The explicit root wins, then the first alias, then the working
    /// directory.
    ///
    /// # Errors
    ///
    /// Fails as [`Vault::open`] does.
    pub fn from_config(config: &Config) -> Result<Self, VaultError> {
        let root = config
            .initial_vault_root()
            .map_or_else(|| Utf8PathBuf::from("."), Utf8Path::to_path_buf);
        Ok(Self::open(root)?
            .with_aliases(config.vaults().to_vec())
            .with_switching(config.allow_vault_switching()))
    }

    /// Registers the roots that [`Vault::switch_vault`] may select.
    #[must_use]
    pub fn with_aliases(mut self, aliases: Vec<VaultAlias>) -> Self {
        self.aliases = aliases;
        self
    }

    /// Enables or disables runtime vault switching.
    #[must_use]
    pub const fn with_switching(mut self, allow: bool) -> Self {
        self.allow_switching = allow;
        self
    }

    /// Snapshot of the active root.
    #[must_use]
    pub fn root(&self) -> Utf8PathBuf {
        self.root
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Lists the active root and every registered alias.
    #[must_use]
    pub fn list_vaults(&self) -> VaultListing {
        VaultListing {
            active: self.root(),
            vaults: self.aliases.clone(),
        }
    }

    /// Makes another registered vault the active one.
    ///
    /// `target` matches an alias name first, then a registered path after
    /// lexical cleaning.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidPath`] when switching is disabled or the
    /// target is not registered.
    pub fn switch_vault(&self, target: &str) -> Result<VaultAlias, VaultError> {
        if !self.allow_switching {
            return Err(VaultError::invalid_path(target, "vault switching is disabled"));
        }

        let wanted = lexically_clean(Utf8Path::new(target));
        let selected = self
            .aliases
            .iter()
            .find(|alias| alias.alias() == target)
            .or_else(|| {
                self.aliases
                    .iter()
                    .find(|alias| lexically_clean(alias.path()) == wanted)
            })
            .ok_or_else(|| {
                VaultError::invalid_path(target, "vault is not registered or is not allowed")
            })?;

        let new_root = absolute_root(selected.path())?;
        *self.root.write().unwrap_or_else(PoisonError::into_inner) = new_root.clone();

        tracing::info!(
            target: "quire_vault::vault",
            alias = selected.alias(),
            root = %new_root,
            "active vault switched"
        );
        Ok(selected.clone())
    }

    /// Resolves a document reference against `root`.
    ///
    /// The document extension is appended when missing.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidPath`] for empty or absolute references
    /// and for anything that escapes the root.
    pub fn resolve(root: &Utf8Path, reference: &str) -> Result<ResolvedDocument, VaultError> {
        let trimmed = reference.trim();
        if trimmed.is_empty() {
            return Err(VaultError::invalid_path(reference, "path is empty"));
        }
        let suffix = format!(".{DEFAULT_DOCUMENT_EXTENSION}");
        let normalised = if trimmed.ends_with(&suffix) {
            trimmed.to_owned()
        } else {
            format!("{trimmed}{suffix}")
        };
        let path = Self::contained(root, &normalised)?;
        Ok(ResolvedDocument {
            reference: normalised,
            path,
        })
    }

    /// Resolves a directory reference against `root`; `None` or empty means
    /// the root itself.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidPath`] when the directory escapes the root.
    pub fn resolve_dir(
        root: &Utf8Path,
        reference: Option<&str>,
    ) -> Result<Utf8PathBuf, VaultError> {
        reference
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map_or_else(|| Ok(root.to_path_buf()), |directory| Self::contained(root, directory))
    }

    fn contained(root: &Utf8Path, reference: &str) -> Result<Utf8PathBuf, VaultError> {
        let relative = Utf8Path::new(reference);
        if relative.is_absolute() || relative.has_root() {
            return Err(VaultError::invalid_path(reference, "path must be relative to the vault"));
        }
        let candidate = lexically_clean(&root.join(relative));
        if is_safe(root, &candidate) {
            Ok(candidate)
        } else {
            Err(VaultError::invalid_path(reference, "path must be within vault"))
        }
    }

    /// Returns the modification stamp of a document.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidPath`] for unsafe references and
    /// [`VaultError::NotFound`] for missing documents.
    pub fn stamp(&self, reference: &str) -> Result<String, VaultError> {
        let root = self.root();
        let document = Self::resolve(&root, reference)?;
        modification_stamp(&document.path, &document.reference)
    }
}

fn absolute_root(root: &Utf8Path) -> Result<Utf8PathBuf, VaultError> {
    if root.is_absolute() {
        return Ok(lexically_clean(root));
    }
    let cwd = std::env::current_dir().map_err(|error| VaultError::io(root, error))?;
    let base = Utf8PathBuf::from_path_buf(cwd).map_err(|path| {
        VaultError::invalid_path(
            path.display().to_string(),
            "working directory is not valid UTF-8",
        )
    })?;
    Ok(lexically_clean(&base.join(root)))
}
