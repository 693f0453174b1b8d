//! Result types returned by a conversion run.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The terminal outcome of one [`crate::convert::convert`] call.
///
/// Exactly one `ConversionResult` is produced per run and it is delivered
/// both as the return value and through
/// [`crate::progress::ConversionProgressCallback::on_complete`]. Fields are
/// private so a result cannot be half success, half failure; use the
/// accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<ConversionStats>,
}

impl ConversionResult {
    /// A successful run that wrote `output_path`.
    pub fn succeeded(output_path: impl Into<PathBuf>, stats: ConversionStats) -> Self {
        Self {
            success: true,
            output_path: Some(output_path.into()),
            error: None,
            stats: Some(stats),
        }
    }

    /// A failed run with a human-readable message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            output_path: None,
            error: Some(message.into()),
            stats: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Path of the written Markdown file. `None` on failure.
    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    /// Error message. `None` on success.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Line and size statistics. `None` on failure.
    pub fn stats(&self) -> Option<&ConversionStats> {
        self.stats.as_ref()
    }
}

/// Statistics about a completed conversion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Lines in the decoded source document.
    pub total_lines: usize,
    /// Blank (empty or whitespace-only) lines.
    pub blank_lines: usize,
    /// Lines rendered as indented body paragraphs.
    pub body_lines: usize,
    /// Headings rendered at level 1 (`#`).
    pub h1_headings: usize,
    /// Headings rendered at level 2 (`##`).
    pub h2_headings: usize,
    /// Headings rendered at level 3 (`###`).
    pub h3_headings: usize,
    /// Size of the source file in bytes.
    pub input_bytes: usize,
    /// Size of the written Markdown in bytes (BOM excluded).
    pub output_bytes: usize,
    /// Name of the encoding the source was decoded with.
    pub encoding: String,
    /// True when malformed byte sequences were replaced with U+FFFD.
    pub had_replacements: bool,
    /// Wall-clock duration of the whole run.
    pub duration_ms: u64,
}

impl ConversionStats {
    /// Total number of heading lines at any level.
    pub fn headings(&self) -> usize {
        self.h1_headings + self.h2_headings + self.h3_headings
    }
}
