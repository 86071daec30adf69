//! Safe, concurrency-aware editing of a markdown vault.
//!
//! A vault is a directory tree of UTF-8 markdown documents addressed by
//! vault-relative references. [`Vault`] exposes every document operation as a
//! method taking a typed request and returning a typed report or a
//! [`VaultError`].
//!
//! Each mutation runs the same pipeline:
//!
//! 1. **Containment**: the reference is resolved against the active root and
//!    rejected unless it stays inside it, lexically and after symlinks are
//!    followed ([`path_guard`]).
//! 2. **Optimistic concurrency**: when the caller supplies the modification
//!    stamp it last observed, the write is refused if the document changed
//!    since ([`concurrency`]).
//! 3. **Validation**: edits are located and checked against one snapshot of
//!    the content; batches are all-or-nothing ([`batch`], [`sections`]).
//! 4. **Commit**: the new content replaces the document through a temporary
//!    file and a rename, so readers never observe a partial write.
//!
//! Frontmatter properties ([`frontmatter`]) and checkbox tasks ([`tasks`])
//! are edited through the same pipeline.
//!
//! A rejection at any stage leaves the filesystem untouched. Multi-document
//! sweeps such as [`Vault::rename`] are best effort and honour a
//! [`Cancellation`] flag between documents.
//!
//! [`bootstrap_with`] wires configuration from [`quire_config`], structured
//! telemetry, and the vault together for binaries embedding the crate.

pub mod batch;
mod bootstrap;
mod cancellation;
mod commit;
pub mod concurrency;
mod error;
pub mod frontmatter;
mod health;
mod operations;
pub mod path_guard;
pub mod preview;
mod report;
pub mod sections;
pub mod tasks;
mod telemetry;
mod vault;

pub use batch::EditOperation;
pub use bootstrap::{
    BootstrapError, ConfigLoader, SystemConfigLoader, Workspace, bootstrap, bootstrap_with,
};
pub use cancellation::Cancellation;
pub use concurrency::ModificationStamp;
pub use error::{BatchIssue, ErrorKind, VaultError};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use operations::{
    AddAliasRequest, AddTagRequest, AppendPosition, AppendRequest, BatchEditRequest,
    CompleteTasksRequest, DeleteFolderRequest, DeleteRequest, DuplicateRequest, EditRequest,
    ExtractSectionRequest, MergeRequest, RemovePropertyRequest, RenameRequest,
    ReplaceSectionRequest, SetPropertyRequest, SplitRequest, ToggleTaskRequest, WriteRequest,
};
pub use report::{
    DocumentSnapshot, ExtractReport, MergeReport, MutationReport, Outline, RenameReport,
    SplitReport, TaskReport,
};
pub use sections::Heading;
pub use tasks::Task;
pub use telemetry::{TelemetryError, TelemetryHandle, initialise as initialise_telemetry};
pub use vault::{ResolvedDocument, Vault, VaultListing};

#[cfg(test)]
mod tests;
