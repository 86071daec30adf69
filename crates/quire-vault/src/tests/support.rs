//! Shared fixtures: a vault inside a temporary directory and the BDD world.

use std::ffi::OsString;
use std::fs;
use std::sync::{Arc, Mutex};

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::{OrthoConfig, OrthoError};
use tempfile::TempDir;

use quire_config::Config;

use crate::bootstrap::{BootstrapError, ConfigLoader};
use crate::health::HealthReporter;
use crate::{EditOperation, MutationReport, Vault, VaultError};

/// A vault rooted at `<tempdir>/vault`, leaving the temp dir itself as
/// "outside".
pub struct TestVault {
    dir: TempDir,
    vault: Vault,
}

impl TestVault {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("temporary directory");
        let root = Utf8Path::from_path(dir.path())
            .expect("utf8 temporary directory")
            .join("vault");
        fs::create_dir_all(&root).expect("create vault root");
        let vault = Vault::open(&root).expect("open vault");
        Self { dir, vault }
    }

    pub fn vault(&self) -> &Vault {
        &self.vault
    }

    pub fn root(&self) -> Utf8PathBuf {
        self.vault.root()
    }

    pub fn outside(&self) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(self.dir.path().to_path_buf()).expect("utf8 temporary directory")
    }

    pub fn seed(&self, reference: &str, content: &str) {
        let path = self.root().join(reference);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent directories");
        }
        fs::write(&path, content).expect("seed document");
    }

    pub fn contents(&self, reference: &str) -> String {
        fs::read_to_string(self.root().join(reference)).expect("read document")
    }

    pub fn exists(&self, reference: &str) -> bool {
        self.root().join(reference).exists()
    }
}

/// Scenario world shared by the vault behaviour suites.
pub struct VaultWorld {
    pub vault: TestVault,
    pub edits: Vec<EditOperation>,
    pub stamp: Option<String>,
    pub original: Option<String>,
    pub original_stamp: Option<String>,
    pub outcome: Option<Result<MutationReport, VaultError>>,
}

impl VaultWorld {
    pub fn new() -> Self {
        Self {
            vault: TestVault::new(),
            edits: Vec::new(),
            stamp: None,
            original: None,
            original_stamp: None,
            outcome: None,
        }
    }

    pub fn report(&self) -> &MutationReport {
        match self.outcome.as_ref() {
            Some(Ok(report)) => report,
            Some(Err(error)) => panic!("operation failed: {error}"),
            None => panic!("no operation has run"),
        }
    }

    pub fn error(&self) -> &VaultError {
        match self.outcome.as_ref() {
            Some(Err(error)) => error,
            Some(Ok(report)) => panic!("operation succeeded unexpectedly: {report:?}"),
            None => panic!("no operation has run"),
        }
    }
}

/// Loader returning a fixed configuration.
pub struct StaticLoader(pub Config);

impl ConfigLoader for StaticLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.0.clone())
    }
}

/// Loader that fails by passing an unknown log format on the command line.
pub struct FailingLoader;

impl ConfigLoader for FailingLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("quire"),
            OsString::from("--log-format"),
            OsString::from("pretty"),
        ];
        Config::load_from_iter(args)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    BootstrapStarting,
    BootstrapSucceeded,
    BootstrapFailed(String),
}

/// Records health events for assertions.
#[derive(Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }
}
