//! Error types for the txt2md library.
//!
//! Every failure of a conversion run maps to one [`Txt2MdError`] variant.
//! The variants mirror the stages of the pipeline so a caller (or a log
//! reader) can tell at a glance whether the input was missing, could not be
//! decoded, or whether the destination refused the write.
//!
//! At the [`crate::convert::convert`] boundary every error is flattened into
//! a failed [`crate::output::ConversionResult`] carrying the error's
//! `Display` text. Library callers who prefer `?` can use
//! [`crate::convert::try_convert`] and match on the variants directly.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the txt2md library.
#[derive(Debug, Error)]
pub enum Txt2MdError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path (or is not a regular file).
    #[error("Text file not found: '{path}'\nCheck the path exists and is a regular file.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists but reading its bytes failed.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Decode errors ─────────────────────────────────────────────────────
    /// The file contains byte sequences that are invalid in the configured
    /// encoding and strict decoding is enabled.
    #[error(
        "'{path}' is not valid {encoding} text ({malformed} malformed sequence(s))\n\
Re-save the file as {encoding}, pick another --encoding, or drop --strict."
    )]
    DecodeFailed {
        path: PathBuf,
        encoding: &'static str,
        malformed: usize,
    },

    // ── Transform errors ──────────────────────────────────────────────────
    /// The line classification task failed unexpectedly.
    #[error("Markdown transform failed: {0}")]
    TransformFailed(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output Markdown file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_not_found_names_the_path() {
        let e = Txt2MdError::FileNotFound {
            path: PathBuf::from("/books/missing.txt"),
        };
        let msg = e.to_string();
        assert!(msg.contains("/books/missing.txt"), "got: {msg}");
        assert!(msg.contains("not found"));
    }

    #[test]
    fn decode_failed_display() {
        let e = Txt2MdError::DecodeFailed {
            path: PathBuf::from("novel.txt"),
            encoding: "GBK",
            malformed: 3,
        };
        let msg = e.to_string();
        assert!(msg.contains("GBK"), "got: {msg}");
        assert!(msg.contains("3 malformed"));
    }

    #[test]
    fn output_write_failed_keeps_source() {
        use std::error::Error as _;
        let e = Txt2MdError::OutputWriteFailed {
            path: PathBuf::from("/readonly/out.md"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.to_string().contains("/readonly/out.md"));
        assert!(e.source().is_some());
    }

    #[test]
    fn transform_failed_display() {
        let e = Txt2MdError::TransformFailed("task panicked".into());
        assert_eq!(e.to_string(), "Markdown transform failed: task panicked");
    }
}
