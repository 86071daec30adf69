//! Output formats for the vault tooling's log stream.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How log events are rendered on stderr.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One flattened JSON object per event, for the calling agent's log sink.
    #[default]
    Json,
    /// Terse single-line text for operators at a terminal.
    Compact,
}

impl LogFormat {
    /// Whether ANSI colour codes may be emitted.
    ///
    /// JSON output is never coloured, since escape codes would corrupt the
    /// records; compact output is coloured only on an interactive stream.
    #[must_use]
    pub const fn colours(self, interactive: bool) -> bool {
        matches!(self, Self::Compact) && interactive
    }
}

/// Error raised when a `--log-format` value names no known format.
pub type LogFormatParseError = strum::ParseError;
