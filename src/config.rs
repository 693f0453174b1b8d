//! Configuration types for text-to-Markdown conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The knobs are few on purpose: the
//! line classification rules and the body indentation marker are fixed, only
//! the source encoding and the I/O details are configurable.

use crate::error::Txt2MdError;
use crate::progress::ProgressCallback;
use encoding_rs::{Encoding, GBK};
use std::fmt;

/// Encoding label used when none is configured.
pub const DEFAULT_ENCODING_LABEL: &str = "gbk";

/// Configuration for a text-to-Markdown conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use txt2md::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .encoding_label("gb18030")
///     .strict_decoding(true)
///     .build()
///     .unwrap();
/// assert_eq!(config.encoding.name(), "gb18030");
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// The single encoding the source file is decoded with. Default: GBK.
    ///
    /// No detection is attempted: the file is read with exactly this
    /// encoding. A leading byte-order mark still takes precedence, the same
    /// way a standard text reader treats one.
    pub encoding: &'static Encoding,

    /// Fail the run when the source contains byte sequences that are invalid
    /// in [`Self::encoding`]. Default: false (they become U+FFFD).
    pub strict_decoding: bool,

    /// Prepend a UTF-8 byte-order mark to the written file. Default: false.
    pub write_bom: bool,

    /// Observer for progress and completion events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            encoding: GBK,
            strict_decoding: false,
            write_bom: false,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("encoding", &self.encoding.name())
            .field("strict_decoding", &self.strict_decoding)
            .field("write_bom", &self.write_bom)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
            encoding_label: None,
        }
    }
}

/// Builder for [`ConversionConfig`].
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
    encoding_label: Option<String>,
}

impl fmt::Debug for ConversionConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfigBuilder")
            .field("config", &self.config)
            .field("encoding_label", &self.encoding_label)
            .finish()
    }
}

impl ConversionConfigBuilder {
    pub fn encoding(mut self, encoding: &'static Encoding) -> Self {
        self.config.encoding = encoding;
        self.encoding_label = None;
        self
    }

    /// Select the source encoding by WHATWG label (`"gbk"`, `"big5"`, …).
    ///
    /// The label is resolved in [`Self::build`]; an unknown label fails
    /// there with [`Txt2MdError::InvalidConfig`].
    pub fn encoding_label(mut self, label: impl Into<String>) -> Self {
        self.encoding_label = Some(label.into());
        self
    }

    pub fn strict_decoding(mut self, v: bool) -> Self {
        self.config.strict_decoding = v;
        self
    }

    pub fn write_bom(mut self, v: bool) -> Self {
        self.config.write_bom = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Txt2MdError> {
        let mut config = self.config;
        if let Some(label) = self.encoding_label {
            config.encoding = resolve_encoding(&label)?;
        }
        Ok(config)
    }
}

/// Resolve a WHATWG encoding label.
///
/// `"replacement"` is rejected: it decodes every input to a single U+FFFD
/// and is never what a caller means.
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding, Txt2MdError> {
    let trimmed = label.trim();
    match Encoding::for_label(trimmed.as_bytes()) {
        Some(enc) if enc != encoding_rs::REPLACEMENT => Ok(enc),
        _ => Err(Txt2MdError::InvalidConfig(format!(
            "unknown encoding label '{trimmed}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_gbk_lenient() {
        let c = ConversionConfig::default();
        assert_eq!(c.encoding, GBK);
        assert!(!c.strict_decoding);
        assert!(!c.write_bom);
        assert!(c.progress_callback.is_none());
    }

    #[test]
    fn builder_resolves_label() {
        let c = ConversionConfig::builder()
            .encoding_label("Big5")
            .build()
            .unwrap();
        assert_eq!(c.encoding, encoding_rs::BIG5);
    }

    #[test]
    fn builder_rejects_unknown_label() {
        let err = ConversionConfig::builder()
            .encoding_label("klingon-8")
            .build()
            .unwrap_err();
        assert!(matches!(err, Txt2MdError::InvalidConfig(_)));
        assert!(err.to_string().contains("klingon-8"));
    }

    #[test]
    fn replacement_label_is_rejected() {
        assert!(resolve_encoding("iso-2022-kr").is_err());
    }

    #[test]
    fn explicit_encoding_overrides_earlier_label() {
        let c = ConversionConfig::builder()
            .encoding_label("big5")
            .encoding(encoding_rs::UTF_8)
            .build()
            .unwrap();
        assert_eq!(c.encoding, encoding_rs::UTF_8);
    }

    #[test]
    fn debug_hides_callback() {
        let c = ConversionConfig::builder()
            .progress_callback(std::sync::Arc::new(crate::progress::NoopProgressCallback))
            .build()
            .unwrap();
        let dbg = format!("{c:?}");
        assert!(dbg.contains("GBK"));
        assert!(dbg.contains("<dyn ConversionProgressCallback>"));
    }
}
