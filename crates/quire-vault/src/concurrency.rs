//! Optimistic concurrency guard based on file modification stamps.
//!
//! Callers echo back the stamp they last observed; a write proceeds only
//! while the file still carries that stamp. No lock is held between the
//! check and the write that follows it.

use std::fmt;
use std::fs;
use std::io;
use std::str::FromStr;

use camino::Utf8Path;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::VaultError;

/// A UTC modification instant with nanosecond precision.
///
/// Renders as RFC 3339 with as many fractional digits as the instant needs,
/// so parsing a rendered stamp yields an equal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModificationStamp(OffsetDateTime);

impl ModificationStamp {
    /// Wraps an instant, normalising it to UTC.
    #[must_use]
    pub fn new(instant: OffsetDateTime) -> Self {
        Self(instant.to_offset(time::UtcOffset::UTC))
    }

    /// Reads the modification stamp of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::NotFound`] when the file is missing and
    /// [`VaultError::Io`] for any other metadata failure.
    pub fn of_file(path: &Utf8Path, reference: &str) -> Result<Self, VaultError> {
        let metadata = fs::metadata(path).map_err(|error| match error.kind() {
            io::ErrorKind::NotFound => VaultError::document_not_found(reference),
            _ => VaultError::io(path, error),
        })?;
        let modified = metadata
            .modified()
            .map_err(|error| VaultError::io(path, error))?;
        Ok(Self::new(OffsetDateTime::from(modified)))
    }

    /// Underlying instant.
    #[must_use]
    pub const fn instant(&self) -> OffsetDateTime {
        self.0
    }
}

impl fmt::Display for ModificationStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.format(&Rfc3339) {
            Ok(text) => f.write_str(&text),
            Err(_) => Err(fmt::Error),
        }
    }
}

impl FromStr for ModificationStamp {
    type Err = time::error::Parse;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        OffsetDateTime::parse(input, &Rfc3339).map(Self::new)
    }
}

/// Returns the stamp of the file at `path` in its lossless textual form.
///
/// # Errors
///
/// Fails as [`ModificationStamp::of_file`] does.
pub fn modification_stamp(path: &Utf8Path, reference: &str) -> Result<String, VaultError> {
    ModificationStamp::of_file(path, reference).map(|stamp| stamp.to_string())
}

/// Rejects the mutation when the file no longer carries `expected`.
///
/// `None` or an empty string disables the check. The file is never modified.
///
/// # Errors
///
/// Returns [`VaultError::Malformed`] for an unparseable stamp,
/// [`VaultError::NotFound`] when the file is missing, and
/// [`VaultError::Conflict`] when the stamps differ.
pub fn check(path: &Utf8Path, reference: &str, expected: Option<&str>) -> Result<(), VaultError> {
    let Some(raw) = expected.filter(|value| !value.is_empty()) else {
        return Ok(());
    };

    let wanted: ModificationStamp = raw.parse().map_err(|error| {
        VaultError::malformed(
            Some(reference),
            format!("invalid expected_modified '{raw}', must be RFC 3339: {error}"),
        )
    })?;

    let actual = ModificationStamp::of_file(path, reference).map_err(|error| match error {
        VaultError::NotFound { .. } => VaultError::NotFound {
            path: reference.to_owned(),
            message: format!("{reference} does not exist for the expected_modified check"),
        },
        other => other,
    })?;

    if actual == wanted {
        return Ok(());
    }

    tracing::debug!(
        target: "quire_vault::concurrency",
        path = %reference,
        expected = %wanted,
        actual = %actual,
        "modification stamp mismatch"
    );
    Err(VaultError::Conflict {
        path: reference.to_owned(),
        message: format!(
            "{reference} was modified concurrently: expected {wanted}, found {actual}"
        ),
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::nanoseconds("2024-05-01T10:20:30.123456789Z")]
    #[case::milliseconds("2024-05-01T10:20:30.5Z")]
    #[case::whole_seconds("2024-05-01T10:20:30Z")]
    fn stamps_round_trip_textually(#[case] text: &str) {
        let stamp: ModificationStamp = text.parse().expect("parse stamp");
        assert_eq!(stamp.to_string(), text);
    }

    #[rstest]
    fn offsets_normalise_to_utc() {
        let stamp: ModificationStamp = "2024-05-01T12:20:30+02:00".parse().expect("parse stamp");
        let utc = OffsetDateTime::parse("2024-05-01T10:20:30Z", &Rfc3339).expect("parse instant");
        assert_eq!(stamp.instant(), utc);
        assert_eq!(stamp.instant().offset(), time::UtcOffset::UTC);
        assert_eq!(stamp.to_string(), "2024-05-01T10:20:30Z");
    }

    #[rstest]
    #[case::absent(None)]
    #[case::empty(Some(""))]
    fn missing_expectation_skips_the_check(#[case] expected: Option<&str>) {
        let path = Utf8Path::new("/definitely/not/here.md");
        assert!(check(path, "here.md", expected).is_ok());
    }

    #[rstest]
    fn unparseable_expectation_is_malformed() {
        let path = Utf8Path::new("/definitely/not/here.md");
        let error = check(path, "here.md", Some("yesterday")).expect_err("reject");
        assert!(matches!(error, VaultError::Malformed { .. }));
    }

    #[rstest]
    fn missing_file_is_not_found() {
        let path = Utf8Path::new("/definitely/not/here.md");
        let error = check(path, "here.md", Some("2024-05-01T10:20:30Z")).expect_err("reject");
        assert!(matches!(error, VaultError::NotFound { .. }));
    }
}
