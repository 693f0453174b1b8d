//! # txt2md
//!
//! Convert plain-text documents (typically novels exported as GBK `.txt`)
//! into structured Markdown.
//!
//! ## What it does
//!
//! Each source line is classified as blank, heading, or body text using
//! line-level patterns common in Chinese fiction:
//!
//! | Source line | Markdown |
//! |-------------|----------|
//! | `第二卷 风云` | `# 第二卷 风云` |
//! | `第三章 重逢` | `## 第三章 重逢` |
//! | `1. 引言` | `### 1. 引言` |
//! | `===楔子===` | `## 楔子` |
//! | `卷一：开端` | `## 卷一：开端` |
//! | `他说：你好。` | `&emsp;  他说：你好。` + blank line |
//!
//! The assembled document then goes through a cleanup pass that normalises
//! blank lines and heading spacing.
//!
//! ## Pipeline Overview
//!
//! ```text
//! .txt
//!  │
//!  ├─ 1. Input     existence check, full read
//!  ├─ 2. Decode    one fixed encoding (GBK by default)
//!  ├─ 3. Classify  blank / heading / body per line (spawn_blocking, 30–70%)
//!  ├─ 4. Cleanup   blank-line collapse, indentation, heading spacing
//!  └─ 5. Output    UTF-8 Markdown, parent directories created
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use txt2md::{convert, default_output_path, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let input = "books/三体.txt";
//!     let output = default_output_path(input);
//!     let result = convert(input, &output, &ConversionConfig::default()).await;
//!     match result.error() {
//!         None => println!("wrote {}", output.display()),
//!         Some(msg) => eprintln!("failed: {msg}"),
//!     }
//! }
//! ```
//!
//! ## Encoding
//!
//! The source is decoded with exactly one encoding, GBK unless configured
//! otherwise with [`ConversionConfigBuilder::encoding_label`]. No detection
//! is attempted; a file in another encoding decodes to garbage (or fails,
//! with [`ConversionConfigBuilder::strict_decoding`]).
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `txt2md` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stream;
pub mod throttle;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert, convert_bytes, convert_sync, convert_text, try_convert};
pub use error::Txt2MdError;
pub use output::{ConversionResult, ConversionStats};
pub use pipeline::classify::{classify, HeadingLevel, LineKind, BODY_INDENT};
pub use pipeline::input::default_output_path;
pub use pipeline::postprocess::clean_markdown;
pub use progress::{
    ConversionPhase, ConversionProgressCallback, NoopProgressCallback, ProgressCallback,
    ProgressEvent,
};
pub use stream::{convert_stream, ConversionEvent, EventStream};
pub use throttle::{NotificationThrottle, ThrottledProgress};
