//! Post-processing: the cleanup pass over the assembled Markdown.
//!
//! The classifier emits one Markdown line per source line (two for body
//! text), so the joined document carries the source's blank-line noise.
//! These rules normalise it without touching content.
//!
//! ## Rule Order
//!
//! Blank-line runs are collapsed before leading whitespace is stripped, and
//! heading spacing runs last so its inserted blank line is subject to one
//! more collapse. That final collapse is what makes [`clean_markdown`]
//! idempotent: a heading always ends up followed by exactly one blank line.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to the joined Markdown.
///
/// Rules (applied in order):
/// 1. Collapse 3+ consecutive newlines to 2
/// 2. Strip leading spaces and tabs from every line
/// 3. Ensure a blank line after every heading (then collapse again)
/// 4. Trim the document and end it with exactly one newline
pub fn clean_markdown(input: &str) -> String {
    let s = collapse_blank_lines(input);
    let s = strip_leading_whitespace(&s);
    let s = ensure_blank_after_headings(&s);
    let s = collapse_blank_lines(&s);
    ensure_final_newline(&s)
}

// ── Rule 1: Collapse excessive blank lines ───────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").to_string()
}

// ── Rule 2: Strip leading horizontal whitespace ─────────────────────────────

static RE_LEADING_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]+").unwrap());

fn strip_leading_whitespace(input: &str) -> String {
    RE_LEADING_WS.replace_all(input, "").to_string()
}

// ── Rule 3: Blank line after headings ────────────────────────────────────────

static RE_HEADING_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^(#+ .+)$").unwrap());

fn ensure_blank_after_headings(input: &str) -> String {
    RE_HEADING_LINE.replace_all(input, "$1\n").to_string()
}

// ── Rule 4: Trim and end with a single newline ───────────────────────────────

fn ensure_final_newline(input: &str) -> String {
    format!("{}\n", input.trim())
}
