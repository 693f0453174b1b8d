//! CLI binary for txt2md.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use txt2md::{
    convert, convert_stream, default_output_path, ConversionConfig, ConversionEvent,
    ConversionPhase, ConversionProgressCallback, ConversionResult, ProgressCallback,
    ProgressEvent, ThrottledProgress,
};

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar running 0–100 with the current
/// phase as prefix and the status line as message.
struct BarProgressCallback {
    bar: ProgressBar,
}

impl BarProgressCallback {
    fn new() -> Arc<Self> {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:<10.bold}  \
             [{bar:42.green/238}] {pos:>3}%  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        let bar = ProgressBar::new(100);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl ConversionProgressCallback for BarProgressCallback {
    fn on_progress(&self, event: &ProgressEvent) {
        // The terminal Failed event resets to 0; leave the bar where it stopped.
        if event.phase == ConversionPhase::Failed {
            return;
        }
        self.bar.set_prefix(phase_label(event.phase));
        self.bar.set_position(u64::from(event.percent));
        self.bar.set_message(event.status.clone());
    }

    // Success and failure are both reported by `main` once the run returns.
    fn on_complete(&self, _result: &ConversionResult) {
        self.bar.finish_and_clear();
    }
}

/// Plain status lines on stderr, for `--no-progress` or non-TTY use.
struct LineProgressCallback;

impl ConversionProgressCallback for LineProgressCallback {
    fn on_progress(&self, event: &ProgressEvent) {
        eprintln!(
            "{} {}",
            dim(&format!("[{:>3}%]", event.percent)),
            event.status
        );
    }
}

fn phase_label(phase: ConversionPhase) -> &'static str {
    match phase {
        ConversionPhase::Starting => "Starting",
        ConversionPhase::Reading => "Reading",
        ConversionPhase::Analyzing => "Analyzing",
        ConversionPhase::Saving => "Saving",
        ConversionPhase::Done => "Done",
        ConversionPhase::Failed => "Failed",
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert next to the source (novel.txt → novel.md)
  txt2md novel.txt

  # Explicit output path; parent directories are created
  txt2md novel.txt -o out/books/novel.md

  # Source in another encoding, fail on malformed bytes
  txt2md --encoding big5 --strict novel.txt

  # Machine-readable progress, one JSON event per line
  txt2md --events novel.txt > events.ndjson

  # Print the result (with statistics) as JSON
  txt2md --json novel.txt

HEADING RULES (first match wins):
  第N卷 / 第N部 / 第N集 …        → # …
  第N章 / 第N节 / 第N回 / 第N篇 … → ## …
  1. / 2、 / 3)  + CJK text      → ### …
  ===…=== / ***…***              → ## … (banner symbols stripped)
  卷一： / 部二： / 集三： / 篇四：  → ## …
  anything else                  → &emsp;  … (indented body paragraph)

ENVIRONMENT VARIABLES:
  TXT2MD_OUTPUT          Output path
  TXT2MD_ENCODING        Source encoding label (default: gbk)
  TXT2MD_STRICT          Fail on malformed byte sequences
  TXT2MD_BOM             Write a UTF-8 byte-order mark
  RUST_LOG               Override the log filter (e.g. txt2md=debug)
"#;

/// Convert GBK text files to Markdown.
#[derive(Parser, Debug)]
#[command(
    name = "txt2md",
    version,
    about = "Convert plain-text novels (GBK by default) to Markdown",
    long_about = "Convert plain-text documents, typically Chinese novels exported as GBK .txt \
files, into Markdown. Volume, chapter, numbered and banner lines become headings; every other \
non-blank line becomes an indented paragraph.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Source text file.
    input: PathBuf,

    /// Write Markdown here instead of next to the input with a `.md` extension.
    #[arg(short, long, env = "TXT2MD_OUTPUT")]
    output: Option<PathBuf>,

    /// Source encoding label (WHATWG names: gbk, gb18030, big5, utf-8, …).
    #[arg(long, env = "TXT2MD_ENCODING", default_value = txt2md::config::DEFAULT_ENCODING_LABEL)]
    encoding: String,

    /// Fail instead of substituting U+FFFD for malformed byte sequences.
    #[arg(long, env = "TXT2MD_STRICT")]
    strict: bool,

    /// Prefix the output with a UTF-8 byte-order mark.
    #[arg(long, env = "TXT2MD_BOM")]
    bom: bool,

    /// Print every progress event and the result as newline-delimited JSON.
    #[arg(long, env = "TXT2MD_EVENTS", conflicts_with = "json")]
    events: bool,

    /// Print the conversion result as JSON.
    #[arg(long, env = "TXT2MD_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "TXT2MD_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "TXT2MD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "TXT2MD_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar carries the user-facing feedback; keep library INFO
    // logs out of its way unless asked for.
    let machine_output = cli.json || cli.events;
    let show_bar = !cli.quiet && !cli.no_progress && !machine_output;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_bar || machine_output {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input));

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_bar {
        Some(BarProgressCallback::new() as ProgressCallback)
    } else if !cli.quiet && !machine_output {
        // One line per milestone, and per-line analysis at most once a second.
        Some(Arc::new(ThrottledProgress::new(
            LineProgressCallback,
            Duration::from_secs(1),
        )))
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Run conversion ───────────────────────────────────────────────────
    let result = if cli.events {
        run_with_events(&cli.input, &output_path, &config).await?
    } else {
        convert(&cli.input, &output_path, &config).await
    };

    if cli.json {
        let json = serde_json::to_string_pretty(&result).context("Failed to serialise result")?;
        println!("{json}");
    }

    if let Some(msg) = result.error() {
        anyhow::bail!("{} Conversion failed: {msg}", red("✘"));
    }

    if !cli.quiet && !machine_output {
        if let Some(stats) = result.stats() {
            eprintln!(
                "{}  {} lines  {} headings  {}ms  →  {}",
                green("✔"),
                stats.total_lines,
                stats.headings(),
                stats.duration_ms,
                bold(&output_path.display().to_string()),
            );
            if stats.had_replacements {
                eprintln!(
                    "   {}",
                    dim(&format!(
                        "malformed {} sequences were replaced with U+FFFD",
                        stats.encoding
                    ))
                );
            }
        }
    }

    Ok(())
}

/// Drive the conversion through the event stream, echoing each event to
/// stdout as one JSON line.
async fn run_with_events(
    input: &Path,
    output: &Path,
    config: &ConversionConfig,
) -> Result<ConversionResult> {
    let mut events = convert_stream(input, output, config);
    let mut result = None;

    while let Some(event) = events.next().await {
        println!("{}", event.to_json_line());
        if let ConversionEvent::Completed(r) = event {
            result = Some(r);
        }
    }

    result.context("Conversion task ended without a result")
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .encoding_label(cli.encoding.clone())
        .strict_decoding(cli.strict)
        .write_bom(cli.bom);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
