//! Unit tests for the workspace bootstrap sequence.

use std::sync::Arc;

use camino::Utf8PathBuf;
use rstest::rstest;
use tempfile::TempDir;

use quire_config::{Config, VaultAlias};

use crate::{BootstrapError, bootstrap_with};

use super::support::{FailingLoader, HealthEvent, RecordingHealthReporter, StaticLoader};

#[rstest]
fn bootstrap_opens_the_configured_vault() {
    let dir = TempDir::new().expect("temporary directory");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 path");
    let loader = StaticLoader(Config {
        vault_root: Some(root.clone()),
        vaults: vec![VaultAlias::new("archive", root.join("archive"))],
        allow_vault_switching: true,
        ..Config::default()
    });
    let reporter = Arc::new(RecordingHealthReporter::default());

    let workspace = bootstrap_with(&loader, &reporter).expect("bootstrap should succeed");

    assert_eq!(workspace.vault().root(), root);
    assert_eq!(workspace.vault().list_vaults().vaults.len(), 1);
    assert!(workspace.config().allow_vault_switching());
    assert_eq!(
        reporter.events(),
        vec![HealthEvent::BootstrapStarting, HealthEvent::BootstrapSucceeded]
    );
}

#[rstest]
fn configuration_failures_are_reported() {
    let reporter = Arc::new(RecordingHealthReporter::default());

    let error = bootstrap_with(&FailingLoader, &reporter).expect_err("bootstrap should fail");

    assert!(matches!(error, BootstrapError::Configuration { .. }));
    let events = reporter.events();
    assert_eq!(events.first(), Some(&HealthEvent::BootstrapStarting));
    assert!(
        events
            .iter()
            .any(|event| matches!(event, HealthEvent::BootstrapFailed(_))),
        "bootstrap failure event missing: {events:?}"
    );
}
