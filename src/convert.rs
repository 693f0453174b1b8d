//! Conversion entry points.
//!
//! [`convert`] is the primary API: it never returns `Err`, every failure is
//! folded into a failed [`ConversionResult`] and announced through the
//! progress callback. [`try_convert`] runs the identical pipeline but hands
//! back the typed [`Txt2MdError`] for callers that want to use `?`.
//!
//! The in-memory helpers ([`convert_text`], [`convert_bytes`]) apply the same
//! classification and cleanup without touching the filesystem or emitting
//! progress.

use crate::config::ConversionConfig;
use crate::error::Txt2MdError;
use crate::output::{ConversionResult, ConversionStats};
use crate::pipeline::{classify, decode, input, postprocess};
use crate::progress::{analyzing_percent, ConversionPhase, Reporter};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Convert a text file to Markdown and write it to `output_path`.
///
/// # Arguments
/// * `input_path`  — the source `.txt` file, in `config.encoding`
/// * `output_path` — destination; parent directories are created
/// * `config`      — conversion configuration
///
/// # Returns
/// A [`ConversionResult`]: success with the output path, or failure with
/// the error message. The same result is passed to the configured
/// callback's `on_complete` before this returns.
pub async fn convert(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> ConversionResult {
    let output_path = output_path.as_ref();
    let reporter = Reporter::new(config.progress_callback.clone());
    let outcome = run(input_path.as_ref(), output_path, config, &reporter).await;
    finish(&reporter, output_path, outcome)
}

/// Like [`convert`], but returns the typed error.
///
/// Progress and completion notifications are emitted exactly as for
/// [`convert`].
pub async fn try_convert(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionStats, Txt2MdError> {
    let output_path = output_path.as_ref();
    let reporter = Reporter::new(config.progress_callback.clone());
    let outcome = run(input_path.as_ref(), output_path, config, &reporter).await;

    match outcome {
        Ok(stats) => {
            reporter.complete(&ConversionResult::succeeded(output_path, stats.clone()));
            Ok(stats)
        }
        Err(e) => {
            announce_failure(&reporter, &e);
            Err(e)
        }
    }
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> ConversionResult {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => rt.block_on(convert(input_path, output_path, config)),
        Err(e) => {
            let reporter = Reporter::new(config.progress_callback.clone());
            let err = Txt2MdError::Internal(format!("Failed to create tokio runtime: {}", e));
            finish(&reporter, output_path.as_ref(), Err(err))
        }
    }
}

/// Convert already-decoded text to Markdown.
///
/// ```rust
/// let md = txt2md::convert_text("第一章 开始\n\n他说：你好。");
/// assert_eq!(md, "## 第一章 开始\n\n&emsp;  他说：你好。\n");
/// ```
pub fn convert_text(text: &str) -> String {
    let lines = classify::split_lines(text);
    let (rendered, _) = classify::render_lines(&lines, |_, _| {});
    postprocess::clean_markdown(&rendered.join("\n"))
}

/// Decode `bytes` with `config.encoding` and convert them to Markdown.
///
/// Useful when the text comes from an archive or a network buffer rather
/// than a file. No progress is reported.
pub fn convert_bytes(bytes: &[u8], config: &ConversionConfig) -> Result<String, Txt2MdError> {
    let decoded = decode::decode_text(
        Path::new("<memory>"),
        bytes,
        config.encoding,
        config.strict_decoding,
    )?;
    Ok(convert_text(&decoded.text))
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// The pipeline proper. Emits every progress event of a successful run;
/// failure reporting is left to the caller.
async fn run(
    input_path: &Path,
    output_path: &Path,
    config: &ConversionConfig,
    reporter: &Reporter,
) -> Result<ConversionStats, Txt2MdError> {
    let total_start = Instant::now();
    info!("Starting conversion: {}", input_path.display());
    reporter.emit(0, ConversionPhase::Starting, "Starting conversion…");

    // ── Step 1: Validate input ───────────────────────────────────────────
    let path = input::resolve_input(input_path).await?;

    // ── Step 2: Read and decode ──────────────────────────────────────────
    reporter.emit(10, ConversionPhase::Reading, "Reading file…");
    let bytes = input::read_source(&path).await?;
    let decoded = decode::decode_text(&path, &bytes, config.encoding, config.strict_decoding)?;
    debug!(
        "Decoded {} bytes as {} ({} replacement(s))",
        bytes.len(),
        decoded.encoding.name(),
        decoded.replacements
    );

    // ── Step 3: Classify lines (CPU-bound) ───────────────────────────────
    reporter.emit(30, ConversionPhase::Analyzing, "Analyzing structure…");
    let line_reporter = reporter.clone();
    let text = decoded.text;
    let (markdown, counts, total_lines) = tokio::task::spawn_blocking(move || {
        let lines = classify::split_lines(&text);
        let (rendered, counts) = classify::render_lines(&lines, |i, total| {
            line_reporter.emit(
                analyzing_percent(i, total),
                ConversionPhase::Analyzing,
                format!("Analyzing line {}/{}…", i + 1, total),
            );
        });

        // ── Step 4: Join and clean up ────────────────────────────────────
        let markdown = postprocess::clean_markdown(&rendered.join("\n"));
        (markdown, counts, lines.len())
    })
    .await
    .map_err(|e| Txt2MdError::TransformFailed(format!("classification task failed: {}", e)))?;

    info!(
        "Classified {} lines: {} heading(s), {} body, {} blank",
        total_lines,
        counts.h1 + counts.h2 + counts.h3,
        counts.body,
        counts.blank
    );

    // ── Step 5: Write output ─────────────────────────────────────────────
    reporter.emit(70, ConversionPhase::Saving, "Saving Markdown file…");
    write_markdown(output_path, &markdown, config.write_bom).await?;

    let stats = ConversionStats {
        total_lines,
        blank_lines: counts.blank,
        body_lines: counts.body,
        h1_headings: counts.h1,
        h2_headings: counts.h2,
        h3_headings: counts.h3,
        input_bytes: bytes.len(),
        output_bytes: markdown.len(),
        encoding: decoded.encoding.name().to_string(),
        had_replacements: decoded.replacements > 0,
        duration_ms: total_start.elapsed().as_millis() as u64,
    };

    reporter.emit(100, ConversionPhase::Done, "Conversion complete!");
    info!(
        "Conversion complete: {} → {} ({}ms)",
        input_path.display(),
        output_path.display(),
        stats.duration_ms
    );

    Ok(stats)
}

/// Turn the pipeline outcome into the terminal result and notify the callback.
fn finish(
    reporter: &Reporter,
    output_path: &Path,
    outcome: Result<ConversionStats, Txt2MdError>,
) -> ConversionResult {
    let result = match outcome {
        Ok(stats) => ConversionResult::succeeded(output_path, stats),
        Err(e) => {
            announce_failure(reporter, &e);
            return ConversionResult::failed(e.to_string());
        }
    };
    reporter.complete(&result);
    result
}

/// Emit the terminal 0% event and the failed completion for `e`.
fn announce_failure(reporter: &Reporter, e: &Txt2MdError) {
    warn!("Conversion failed: {}", e);
    reporter.emit(0, ConversionPhase::Failed, format!("Conversion failed: {}", e));
    reporter.complete(&ConversionResult::failed(e.to_string()));
}

/// Write `markdown` as UTF-8, creating parent directories first.
///
/// Uses atomic write (temp file + rename) so readers never observe a
/// half-written file.
async fn write_markdown(path: &Path, markdown: &str, bom: bool) -> Result<(), Txt2MdError> {
    let write_err = |e: std::io::Error| Txt2MdError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }
    }

    let mut bytes = Vec::with_capacity(markdown.len() + UTF8_BOM.len());
    if bom {
        bytes.extend_from_slice(UTF8_BOM);
    }
    bytes.extend_from_slice(markdown.as_bytes());

    let tmp_path = temp_path_for(path);
    tokio::fs::write(&tmp_path, &bytes).await.map_err(write_err)?;

    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_err(e));
    }

    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// `book.md` → `book.md.tmp`, next to the destination.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_text_end_to_end_example() {
        let md = convert_text("第一章 开始\n\n他说：你好。");
        assert!(md.starts_with("## 第一章 开始\n\n&emsp;  他说：你好。\n"));
    }

    #[test]
    fn convert_text_empty_input() {
        assert_eq!(convert_text(""), "\n");
    }

    #[test]
    fn convert_text_volume_chapter_body() {
        let md = convert_text("第二卷 风云\r\n第三章 kills\r\n  他走了。\r\n===尾声===\r\n");
        assert_eq!(
            md,
            "# 第二卷 风云\n\n## 第三章 kills\n\n&emsp;    他走了。\n\n## 尾声\n"
        );
    }

    #[test]
    fn convert_bytes_decodes_gbk() {
        let (bytes, _, _) = encoding_rs::GBK.encode("第一章\n正文");
        let md = convert_bytes(&bytes, &ConversionConfig::default()).unwrap();
        assert_eq!(md, "## 第一章\n\n&emsp;  正文\n");
    }

    #[test]
    fn convert_bytes_strict_rejects_malformed() {
        let config = ConversionConfig::builder()
            .encoding(encoding_rs::UTF_8)
            .strict_decoding(true)
            .build()
            .unwrap();
        let err = convert_bytes(&[b'a', 0xFF, b'b'], &config);
        assert!(err.is_err());
    }

    #[test]
    fn temp_path_appends_suffix() {
        assert_eq!(
            temp_path_for(Path::new("/out/book.md")),
            PathBuf::from("/out/book.md.tmp")
        );
    }
}
