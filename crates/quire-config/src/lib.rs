//! Shared configuration for the Quire vault tooling.
//!
//! Configuration is layered by [`ortho_config`]: built-in defaults, a TOML
//! file located through `--config-path` or `QUIRE_CONFIG_PATH`, `QUIRE_*`
//! environment variables, and finally command-line flags. Later layers win.
//!
//! The configuration names the vault root that bounds every document
//! operation, the registry of alternate roots an operator may switch to at
//! runtime, and the logging knobs consumed by the telemetry bootstrap.

mod alias;
mod defaults;
mod logging;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use alias::{VaultAlias, VaultAliasParseError};
pub use defaults::{
    DEFAULT_DOCUMENT_EXTENSION, DEFAULT_LOG_FILTER, default_log_filter,
    default_log_filter_string, default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved configuration shared by every Quire entry point.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "QUIRE")]
pub struct Config {
    /// Root directory of the active vault.
    ///
    /// When unset, the first registered alias is used, falling back to the
    /// current working directory.
    pub vault_root: Option<Utf8PathBuf>,
    /// Alternate vault roots, written as `alias=path`.
    #[ortho_config(merge_strategy = "append")]
    #[serde(default)]
    pub vaults: Vec<VaultAlias>,
    /// Permits switching the active vault to one of [`Config::vaults`].
    #[serde(default)]
    pub allow_vault_switching: bool,
    /// `tracing` filter directive applied to the global subscriber.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format of the global subscriber.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vault_root: None,
            vaults: Vec::new(),
            allow_vault_switching: false,
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Explicitly configured vault root, if any.
    #[must_use]
    pub fn vault_root(&self) -> Option<&Utf8Path> {
        self.vault_root.as_deref()
    }

    /// Registered vault aliases in declaration order.
    #[must_use]
    pub fn vaults(&self) -> &[VaultAlias] {
        &self.vaults
    }

    /// Whether runtime vault switching is enabled.
    #[must_use]
    pub const fn allow_vault_switching(&self) -> bool {
        self.allow_vault_switching
    }

    /// Filter directive for the telemetry subscriber.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Output format for the telemetry subscriber.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Root the vault should open on first use.
    ///
    /// Precedence: the explicit [`Config::vault_root`], then the first alias
    /// in [`Config::vaults`]. Returns `None` when neither is configured.
    #[must_use]
    pub fn initial_vault_root(&self) -> Option<&Utf8Path> {
        self.vault_root()
            .or_else(|| self.vaults.first().map(VaultAlias::path))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
        assert_eq!(config.log_format(), LogFormat::Json);
        assert!(config.vaults().is_empty());
        assert!(!config.allow_vault_switching());
        assert!(config.initial_vault_root().is_none());
    }

    #[rstest]
    fn explicit_root_wins_over_aliases() {
        let config = Config {
            vault_root: Some(Utf8PathBuf::from("/srv/notes")),
            vaults: vec![VaultAlias::new("work", "/srv/work")],
            ..Config::default()
        };
        assert_eq!(
            config.initial_vault_root(),
            Some(Utf8Path::new("/srv/notes"))
        );
    }

    #[rstest]
    fn first_alias_is_used_without_explicit_root() {
        let config = Config {
            vaults: vec![
                VaultAlias::new("work", "/srv/work"),
                VaultAlias::new("home", "/srv/home"),
            ],
            ..Config::default()
        };
        assert_eq!(
            config.initial_vault_root(),
            Some(Utf8Path::new("/srv/work"))
        );
    }
}
