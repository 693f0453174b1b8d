//! Line classification: decide whether each source line is blank, a heading,
//! or body text, and render it as Markdown.
//!
//! ## Two rule tables
//!
//! Heading detection runs in two passes over the trimmed line:
//!
//! 1. [`DETECT_RULES`] answers "is this a heading at all?".
//! 2. [`LEVEL_RULES`] picks the heading level and the rendered title, first
//!    match wins.
//!
//! The tables overlap but are not identical. A line such as `卷一：风起`
//! passes detection but matches no level rule, so it falls through to
//! [`FALLBACK_LEVEL`] over the raw trimmed text. Keeping both tables as
//! explicit ordered lists makes that asymmetry visible and testable.
//!
//! Classification is stateless: each line is judged on its own, with no
//! lookahead or lookbehind.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Prefix written before every body line: an `&emsp;` entity then two spaces.
pub const BODY_INDENT: &str = "&emsp;  ";

/// Markdown heading level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HeadingLevel {
    /// `#`: volumes, parts, collections.
    H1,
    /// `##`: chapters, sections, banners.
    H2,
    /// `###`: numbered sub-sections.
    H3,
}

impl HeadingLevel {
    /// The `#` run for this level.
    pub fn marker(&self) -> &'static str {
        match self {
            HeadingLevel::H1 => "#",
            HeadingLevel::H2 => "##",
            HeadingLevel::H3 => "###",
        }
    }
}

/// Category of one source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Heading(HeadingLevel),
    Body,
}

// ── Patterns ─────────────────────────────────────────────────────────────────

/// `第` + numeral + any structural unit, as a prefix.
static RE_ORDINAL_UNIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^第[一二三四五六七八九十\d]+[章节回卷集篇部]").unwrap());

/// `第` + numeral + unit as the whole line.
static RE_ORDINAL_UNIT_ALONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^第[一二三四五六七八九十\d]+[章节回卷集篇部]$").unwrap());

/// `卷一：`, `篇3:` and friends.
static RE_UNIT_ORDINAL_COLON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[卷篇部集][一二三四五六七八九十\d]+[：:]").unwrap());

/// Line bounded by 3+ banner symbols on both ends.
static RE_BANNER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[=*#\-—]{3,}.*[=*#\-—]{3,}$").unwrap());

/// Symbol runs stripped from a banner's ends.
static RE_BANNER_EDGES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[=*#\-—]+|[=*#\-—]+$").unwrap());

/// `1.`, `2、`, `3)` followed by CJK text.
static RE_NUMBERED_CJK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+[.、)]\s*[\x{4e00}-\x{9fa5}]+").unwrap());

/// `第` + numeral + volume-like unit.
static RE_ORDINAL_VOLUME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^第[一二三四五六七八九十\d]+[卷部集]").unwrap());

/// `第` + numeral + chapter-like unit.
static RE_ORDINAL_CHAPTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^第[一二三四五六七八九十\d]+[章节回篇]").unwrap());

// ── Rule tables ──────────────────────────────────────────────────────────────

/// A line is a heading when any of these matches its trimmed text.
pub static DETECT_RULES: [&Lazy<Regex>; 5] = [
    &RE_ORDINAL_UNIT,
    &RE_ORDINAL_UNIT_ALONE,
    &RE_UNIT_ORDINAL_COLON,
    &RE_BANNER,
    &RE_NUMBERED_CJK,
];

/// One level-assignment rule.
pub struct LevelRule {
    pub name: &'static str,
    pub pattern: &'static Lazy<Regex>,
    pub level: HeadingLevel,
    /// Produces the heading title from the trimmed line.
    pub title: fn(&str) -> String,
}

/// Level assignment, evaluated top to bottom for detected headings.
pub static LEVEL_RULES: [LevelRule; 4] = [
    LevelRule {
        name: "ordinal-volume",
        pattern: &RE_ORDINAL_VOLUME,
        level: HeadingLevel::H1,
        title: keep_title,
    },
    LevelRule {
        name: "ordinal-chapter",
        pattern: &RE_ORDINAL_CHAPTER,
        level: HeadingLevel::H2,
        title: keep_title,
    },
    LevelRule {
        name: "numbered-section",
        pattern: &RE_NUMBERED_CJK,
        level: HeadingLevel::H3,
        title: keep_title,
    },
    LevelRule {
        name: "banner",
        pattern: &RE_BANNER,
        level: HeadingLevel::H2,
        title: strip_banner,
    },
];

/// Level for detected headings that no [`LEVEL_RULES`] entry matches.
pub const FALLBACK_LEVEL: HeadingLevel = HeadingLevel::H2;

fn keep_title(trimmed: &str) -> String {
    trimmed.to_string()
}

fn strip_banner(trimmed: &str) -> String {
    RE_BANNER_EDGES.replace_all(trimmed, "").trim().to_string()
}

// ── Classification ───────────────────────────────────────────────────────────

/// True when the trimmed line matches any detection rule.
pub fn is_heading(trimmed: &str) -> bool {
    DETECT_RULES.iter().any(|re| re.is_match(trimmed))
}

/// First [`LEVEL_RULES`] entry matching `trimmed`, if any.
pub fn matching_rule(trimmed: &str) -> Option<&'static LevelRule> {
    LEVEL_RULES.iter().find(|rule| rule.pattern.is_match(trimmed))
}

/// Level and rendered title for a line that passed [`is_heading`].
pub fn assign_level(trimmed: &str) -> (HeadingLevel, String) {
    match matching_rule(trimmed) {
        Some(rule) => {
            trace!("{:?} heading via rule '{}': {}", rule.level, rule.name, trimmed);
            (rule.level, (rule.title)(trimmed))
        }
        None => {
            trace!("{:?} heading via fallback: {}", FALLBACK_LEVEL, trimmed);
            (FALLBACK_LEVEL, trimmed.to_string())
        }
    }
}

/// Classify one raw source line.
pub fn classify(line: &str) -> LineKind {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        LineKind::Blank
    } else if is_heading(trimmed) {
        LineKind::Heading(assign_level(trimmed).0)
    } else {
        LineKind::Body
    }
}

// ── Rendering ────────────────────────────────────────────────────────────────

/// Per-category line counts gathered while rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineCounts {
    pub blank: usize,
    pub body: usize,
    pub h1: usize,
    pub h2: usize,
    pub h3: usize,
}

impl LineCounts {
    fn record(&mut self, kind: LineKind) {
        match kind {
            LineKind::Blank => self.blank += 1,
            LineKind::Body => self.body += 1,
            LineKind::Heading(HeadingLevel::H1) => self.h1 += 1,
            LineKind::Heading(HeadingLevel::H2) => self.h2 += 1,
            LineKind::Heading(HeadingLevel::H3) => self.h3 += 1,
        }
    }
}

/// Render one source line, appending its Markdown line(s) to `out`.
///
/// Blank lines stay a single empty line. Headings become `<marker> <title>`.
/// Body lines keep their original (untrimmed) text behind [`BODY_INDENT`]
/// and are followed by an empty line.
pub fn render_line(line: &str, out: &mut Vec<String>) -> LineKind {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        out.push(String::new());
        return LineKind::Blank;
    }

    if is_heading(trimmed) {
        let (level, title) = assign_level(trimmed);
        out.push(format!("{} {}", level.marker(), title));
        return LineKind::Heading(level);
    }

    out.push(format!("{BODY_INDENT}{line}"));
    out.push(String::new());
    LineKind::Body
}

/// Split decoded text into source lines.
///
/// Splits on `\n` and drops one trailing `\r` per line, so CRLF and LF files
/// classify identically. Empty text is one empty line.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect()
}

/// Render every line in order, calling `on_line(index, total)` before each.
pub fn render_lines<F>(lines: &[&str], mut on_line: F) -> (Vec<String>, LineCounts)
where
    F: FnMut(usize, usize),
{
    let total = lines.len();
    let mut out = Vec::with_capacity(total * 2);
    let mut counts = LineCounts::default();

    for (i, line) in lines.iter().enumerate() {
        on_line(i, total);
        counts.record(render_line(line, &mut out));
    }

    (out, counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(line: &str) -> Vec<String> {
        let mut out = Vec::new();
        render_line(line, &mut out);
        out
    }

    #[test]
    fn blank_lines() {
        assert_eq!(classify(""), LineKind::Blank);
        assert_eq!(classify("   \t "), LineKind::Blank);
        assert_eq!(classify("\u{3000}\u{3000}"), LineKind::Blank);
        assert_eq!(render("  "), vec![String::new()]);
    }

    #[test]
    fn chapter_is_level_two() {
        assert_eq!(classify("第三章 kills"), LineKind::Heading(HeadingLevel::H2));
        assert_eq!(render("第三章 kills"), vec!["## 第三章 kills"]);
        assert_eq!(render("  第12回 大闹天宫  "), vec!["## 第12回 大闹天宫"]);
        assert_eq!(render("第一节"), vec!["## 第一节"]);
        assert_eq!(render("第五篇 终"), vec!["## 第五篇 终"]);
    }

    #[test]
    fn volume_is_level_one() {
        assert_eq!(render("第二卷"), vec!["# 第二卷"]);
        assert_eq!(render("第十部 归来"), vec!["# 第十部 归来"]);
        assert_eq!(render("第3集"), vec!["# 第3集"]);
    }

    #[test]
    fn numbered_section_is_level_three() {
        assert_eq!(render("1. 引言"), vec!["### 1. 引言"]);
        assert_eq!(render("2、背景"), vec!["### 2、背景"]);
        assert_eq!(render("10)结论"), vec!["### 10)结论"]);
    }

    #[test]
    fn numbered_line_without_cjk_is_body() {
        assert_eq!(classify("1. Introduction"), LineKind::Body);
        assert_eq!(classify("2024.05 update"), LineKind::Body);
    }

    #[test]
    fn banner_is_stripped_level_two() {
        assert_eq!(render("===标题==="), vec!["## 标题"]);
        assert_eq!(render("*** 楔子 ***"), vec!["## 楔子"]);
        assert_eq!(render("———尾声———"), vec!["## 尾声"]);
        assert_eq!(render("##### 后记 #####"), vec!["## 后记"]);
    }

    #[test]
    fn short_symbol_runs_are_not_banners() {
        assert_eq!(classify("==标题=="), LineKind::Body);
        assert_eq!(classify("---"), LineKind::Body);
    }

    #[test]
    fn plain_latin_text_is_not_a_banner() {
        assert_eq!(classify("Hello there, friend"), LineKind::Body);
    }

    #[test]
    fn unit_colon_falls_through_to_level_two_raw() {
        assert!(is_heading("卷一：风起"));
        assert!(LEVEL_RULES.iter().all(|r| !r.pattern.is_match("卷一：风起")));
        assert_eq!(render("卷一：风起"), vec!["## 卷一：风起"]);
        assert_eq!(render("篇3:结局"), vec!["## 篇3:结局"]);
    }

    #[test]
    fn volume_rule_wins_over_chapter_rule() {
        // Both a 卷 prefix and a later 章: the first level rule decides.
        assert_eq!(render("第一卷第三章"), vec!["# 第一卷第三章"]);
    }

    #[test]
    fn matching_rule_names_the_rule() {
        let name = |line: &str| matching_rule(line).map(|r| r.name);
        assert_eq!(name("第3集 x"), Some("ordinal-volume"));
        assert_eq!(name("第一节"), Some("ordinal-chapter"));
        assert_eq!(name("1. 引言"), Some("numbered-section"));
        assert_eq!(name("===楔子==="), Some("banner"));
        assert_eq!(name("卷一：风起"), None);
    }

    #[test]
    fn chapter_unit_before_colon_is_body() {
        assert!(!is_heading("章三：x"));
        assert_eq!(render("章三：x"), vec!["&emsp;  章三：x", ""]);
    }

    #[test]
    fn body_keeps_original_line_and_adds_blank() {
        assert_eq!(
            render("这是一段普通文字"),
            vec!["&emsp;  这是一段普通文字".to_string(), String::new()]
        );
        assert_eq!(
            render("\u{3000}\u{3000}他笑了。"),
            vec!["&emsp;  \u{3000}\u{3000}他笑了。".to_string(), String::new()]
        );
    }

    #[test]
    fn ordinal_not_at_start_is_body() {
        assert_eq!(classify("他读到了第三章"), LineKind::Body);
    }

    #[test]
    fn split_lines_handles_crlf_and_empty() {
        assert_eq!(split_lines("a\r\nb\nc"), vec!["a", "b", "c"]);
        assert_eq!(split_lines(""), vec![""]);
        assert_eq!(split_lines("a\n"), vec!["a", ""]);
    }

    #[test]
    fn render_lines_reports_every_index() {
        let lines = ["第一章 开始", "", "他说：你好。"];
        let mut seen = Vec::new();
        let (out, counts) = render_lines(&lines, |i, total| seen.push((i, total)));

        assert_eq!(seen, vec![(0, 3), (1, 3), (2, 3)]);
        assert_eq!(
            out,
            vec!["## 第一章 开始", "", "&emsp;  他说：你好。", ""]
        );
        assert_eq!(
            counts,
            LineCounts {
                blank: 1,
                body: 1,
                h2: 1,
                ..Default::default()
            }
        );
    }
}
