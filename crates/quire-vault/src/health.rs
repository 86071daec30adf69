//! Structured health reporting for workspace lifecycle events.

use std::sync::Arc;

use quire_config::Config;

use crate::bootstrap::BootstrapError;

/// Observer notified as a workspace is brought up.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: "quire_vault::health",
            event = "bootstrap_starting",
            "starting vault bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: "quire_vault::health",
            event = "bootstrap_succeeded",
            vault_root = ?config.initial_vault_root(),
            vaults = config.vaults().len(),
            allow_vault_switching = config.allow_vault_switching(),
            log_filter = %config.log_filter(),
            log_format = %config.log_format(),
            "vault bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: "quire_vault::health",
            event = "bootstrap_failed",
            error = %error,
            "vault bootstrap failed"
        );
    }
}
