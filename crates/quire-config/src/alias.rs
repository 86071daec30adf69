//! Named vault roots that an operator may switch between.

use std::fmt;
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A vault root registered under a short alias.
///
/// Aliases travel through every configuration layer as `alias=path` text so
/// the TOML file, the `QUIRE_VAULTS` variable, and `--vaults` share one
/// spelling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct VaultAlias {
    alias: String,
    path: Utf8PathBuf,
}

impl VaultAlias {
    /// Registers `path` under `alias`.
    #[must_use]
    pub fn new(alias: impl Into<String>, path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            alias: alias.into(),
            path: path.into(),
        }
    }

    /// Short name used when switching vaults.
    #[must_use]
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Root directory of the aliased vault.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl fmt::Display for VaultAlias {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}={}", self.alias, self.path)
    }
}

impl FromStr for VaultAlias {
    type Err = VaultAliasParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (raw_alias, raw_path) = input
            .split_once('=')
            .ok_or_else(|| VaultAliasParseError::MissingSeparator(input.to_owned()))?;
        let alias = raw_alias.trim();
        let path = raw_path.trim();
        if alias.is_empty() {
            return Err(VaultAliasParseError::EmptyAlias(input.to_owned()));
        }
        if path.is_empty() {
            return Err(VaultAliasParseError::EmptyPath(input.to_owned()));
        }
        Ok(Self::new(alias, path))
    }
}

impl TryFrom<String> for VaultAlias {
    type Error = VaultAliasParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VaultAlias> for String {
    fn from(value: VaultAlias) -> Self {
        value.to_string()
    }
}

/// Errors encountered while parsing a [`VaultAlias`] from text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VaultAliasParseError {
    /// The `=` separating alias and path was absent.
    #[error("vault alias '{0}' must be written as alias=path")]
    MissingSeparator(String),
    /// The alias half was blank.
    #[error("vault alias '{0}' has an empty alias")]
    EmptyAlias(String),
    /// The path half was blank.
    #[error("vault alias '{0}' has an empty path")]
    EmptyPath(String),
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("work=/srv/work", "work", "/srv/work")]
    #[case(" home = /home/me/notes ", "home", "/home/me/notes")]
    #[case("odd=/path/with=equals", "odd", "/path/with=equals")]
    fn parses_alias_and_path(#[case] input: &str, #[case] alias: &str, #[case] path: &str) {
        let parsed: VaultAlias = input.parse().expect("alias should parse");
        assert_eq!(parsed.alias(), alias);
        assert_eq!(parsed.path(), Utf8Path::new(path));
    }

    #[rstest]
    #[case("no-separator", VaultAliasParseError::MissingSeparator("no-separator".to_owned()))]
    #[case("=/srv", VaultAliasParseError::EmptyAlias("=/srv".to_owned()))]
    #[case("work=", VaultAliasParseError::EmptyPath("work=".to_owned()))]
    fn rejects_malformed_entries(#[case] input: &str, #[case] expected: VaultAliasParseError) {
        assert_eq!(input.parse::<VaultAlias>(), Err(expected));
    }

    #[rstest]
    fn display_matches_input_spelling() {
        let alias = VaultAlias::new("work", "/srv/work");
        assert_eq!(alias.to_string(), "work=/srv/work");
    }
}
