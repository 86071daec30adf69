//! Containment checks that keep every document path inside the vault root.
//!
//! A candidate passes only when it is inside the root both lexically and
//! after symlinks are resolved. Write targets often do not exist yet, so
//! resolution canonicalises the deepest existing ancestor and re-attaches the
//! missing suffix unchanged.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

/// Returns `true` when `candidate` lies within `root`.
///
/// Both paths are expected to be absolute. Any failure to resolve either side
/// is reported as unsafe rather than raised.
#[must_use]
pub fn is_safe(root: &Utf8Path, candidate: &Utf8Path) -> bool {
    let clean_root = lexically_clean(root);
    let clean_candidate = lexically_clean(candidate);

    if !is_within(&clean_root, &clean_candidate) {
        return false;
    }

    match (
        resolve_with_existing_ancestors(&clean_root),
        resolve_with_existing_ancestors(&clean_candidate),
    ) {
        (Some(resolved_root), Some(resolved_candidate)) => {
            is_within(&resolved_root, &resolved_candidate)
        }
        _ => false,
    }
}

/// Resolves `.` and `..` components without consulting the filesystem.
///
/// A `..` directly below the root is dropped, matching how the kernel treats
/// `/..`.
#[must_use]
pub fn lexically_clean(path: &Utf8Path) -> Utf8PathBuf {
    let mut parts: Vec<Utf8Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => match parts.last() {
                Some(Utf8Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Utf8Component::RootDir | Utf8Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    parts.iter().collect()
}

fn is_within(base: &Utf8Path, target: &Utf8Path) -> bool {
    base.is_absolute() && target.strip_prefix(base).is_ok()
}

fn resolve_with_existing_ancestors(path: &Utf8Path) -> Option<Utf8PathBuf> {
    let mut existing = path;
    let mut missing = Vec::new();

    while existing.symlink_metadata().is_err() {
        missing.push(existing.file_name()?);
        existing = existing.parent()?;
    }

    let mut resolved = existing.canonicalize_utf8().ok()?;
    for segment in missing.iter().rev() {
        resolved.push(segment);
    }
    Some(resolved)
}
