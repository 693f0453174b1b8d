//! Decoding: raw bytes → `String` in one fixed encoding.
//!
//! Source files are decoded with exactly the configured encoding (GBK by
//! default). There is no statistical detection: a UTF-8 file read as GBK
//! comes out as mojibake, and callers must pick the right encoding. The
//! only exception is a leading byte-order mark, which
//! [`encoding_rs::Encoding::decode`] honours the way any text reader does.

use crate::error::Txt2MdError;
use encoding_rs::Encoding;
use std::path::Path;
use tracing::{debug, warn};

/// The decoded document text.
#[derive(Debug)]
pub struct DecodedText {
    pub text: String,
    /// Encoding actually used (differs from the configured one only when a BOM was present).
    pub encoding: &'static Encoding,
    /// Number of U+FFFD characters introduced for malformed input.
    pub replacements: usize,
}

/// Decode `bytes` with `encoding`.
///
/// With `strict` set, any malformed sequence fails with
/// [`Txt2MdError::DecodeFailed`]; otherwise it is replaced with U+FFFD and
/// logged.
pub fn decode_text(
    path: &Path,
    bytes: &[u8],
    encoding: &'static Encoding,
    strict: bool,
) -> Result<DecodedText, Txt2MdError> {
    let (cow, used, had_errors) = encoding.decode(bytes);

    let replacements = if had_errors {
        let in_source = count_replacement_bytes(bytes, used);
        cow.chars()
            .filter(|&c| c == char::REPLACEMENT_CHARACTER)
            .count()
            .saturating_sub(in_source)
            .max(1)
    } else {
        0
    };

    if had_errors && strict {
        return Err(Txt2MdError::DecodeFailed {
            path: path.to_path_buf(),
            encoding: used.name(),
            malformed: replacements,
        });
    }

    if had_errors {
        warn!(
            "{}: {} malformed {} sequence(s) replaced with U+FFFD",
            path.display(),
            replacements,
            used.name()
        );
    }
    if used != encoding {
        debug!(
            "{}: byte-order mark selects {} over {}",
            path.display(),
            used.name(),
            encoding.name()
        );
    }

    Ok(DecodedText {
        text: cow.into_owned(),
        encoding: used,
        replacements,
    })
}

/// U+FFFD characters that were already present in a UTF-8 source, so they
/// are not counted as decode errors.
fn count_replacement_bytes(bytes: &[u8], used: &'static Encoding) -> usize {
    if used != encoding_rs::UTF_8 {
        return 0;
    }
    bytes
        .windows(3)
        .filter(|w| *w == [0xEF, 0xBF, 0xBD])
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{GBK, UTF_8};

    fn gbk(s: &str) -> Vec<u8> {
        let (bytes, _, unmappable) = GBK.encode(s);
        assert!(!unmappable);
        bytes.into_owned()
    }

    #[test]
    fn decodes_gbk() {
        let bytes = gbk("第一章 开始\r\n他说：你好。");
        let out = decode_text(Path::new("a.txt"), &bytes, GBK, true).unwrap();
        assert_eq!(out.text, "第一章 开始\r\n他说：你好。");
        assert_eq!(out.encoding, GBK);
        assert_eq!(out.replacements, 0);
    }

    #[test]
    fn utf8_bom_wins_over_configured_encoding() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("第二卷".as_bytes());
        let out = decode_text(Path::new("a.txt"), &bytes, GBK, true).unwrap();
        assert_eq!(out.text, "第二卷");
        assert_eq!(out.encoding, UTF_8);
    }

    #[test]
    fn malformed_bytes_are_replaced_when_lenient() {
        // 0x81 is a GBK lead byte; a trailing 0x20 is not a valid trail byte.
        let bytes = [b'a', 0x81, 0x20, b'b'];
        let out = decode_text(Path::new("a.txt"), &bytes, GBK, false).unwrap();
        assert!(out.text.contains('\u{FFFD}'));
        assert!(out.replacements >= 1);
    }

    #[test]
    fn malformed_bytes_fail_when_strict() {
        let bytes = [b'a', 0xFF, b'b'];
        let err = decode_text(Path::new("bad.txt"), &bytes, UTF_8, true).unwrap_err();
        match err {
            Txt2MdError::DecodeFailed { encoding, malformed, .. } => {
                assert_eq!(encoding, "UTF-8");
                assert_eq!(malformed, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn existing_replacement_chars_are_not_errors() {
        let bytes = "ok \u{FFFD} ok".as_bytes();
        let out = decode_text(Path::new("a.txt"), bytes, UTF_8, true).unwrap();
        assert_eq!(out.replacements, 0);
    }
}
