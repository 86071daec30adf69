//! Workspace bootstrap: configuration, telemetry, then the vault.

use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use thiserror::Error;

use quire_config::Config;

use crate::error::VaultError;
use crate::health::HealthReporter;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};
use crate::vault::Vault;

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the configuration.
    ///
    /// # Errors
    ///
    /// Returns the layered loader's error when any source is invalid.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// The configured vault could not be opened.
    #[error("failed to open vault: {source}")]
    Vault {
        /// Underlying vault error.
        #[source]
        source: VaultError,
    },
}

/// Result of a successful bootstrap invocation.
#[derive(Debug)]
pub struct Workspace {
    config: Config,
    vault: Vault,
    telemetry: TelemetryHandle,
}

impl Workspace {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The vault every operation runs against.
    #[must_use]
    pub const fn vault(&self) -> &Vault {
        &self.vault
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub const fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }
}

/// Bootstraps a workspace from the system configuration sources.
///
/// # Errors
///
/// Fails as [`bootstrap_with`] does.
pub fn bootstrap(reporter: &dyn HealthReporter) -> Result<Workspace, BootstrapError> {
    bootstrap_with(&SystemConfigLoader, reporter)
}

/// Bootstraps a workspace using the supplied collaborators.
///
/// # Errors
///
/// Returns a [`BootstrapError`] naming the first stage that failed. The
/// reporter is told about the failure before it is returned.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: &dyn HealthReporter,
) -> Result<Workspace, BootstrapError> {
    reporter.bootstrap_starting();

    let config = match loader.load() {
        Ok(config) => config,
        Err(source) => {
            let error = BootstrapError::Configuration { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let telemetry = match telemetry::initialise(&config) {
        Ok(handle) => handle,
        Err(source) => {
            let error = BootstrapError::Telemetry { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let vault = match Vault::from_config(&config) {
        Ok(vault) => vault,
        Err(source) => {
            let error = BootstrapError::Vault { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    reporter.bootstrap_succeeded(&config);
    Ok(Workspace {
        config,
        vault,
        telemetry,
    })
}
