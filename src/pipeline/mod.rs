//! Pipeline stages for text-to-Markdown conversion.
//!
//! Each submodule implements exactly one transformation step so each can be
//! tested on its own.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ decode ──▶ classify ──▶ postprocess
//! (path)    (GBK)      (rules)      (cleanup)
//! ```
//!
//! 1. [`input`]    — validate the source path and read its bytes
//! 2. [`decode`]   — decode with the one configured encoding
//! 3. [`classify`] — blank / heading / body per line, rendered to Markdown;
//!    runs in `spawn_blocking` because it is the only CPU-bound stage
//! 4. [`postprocess`] — blank-line, indentation and heading-spacing cleanup

pub mod classify;
pub mod decode;
pub mod input;
pub mod postprocess;
