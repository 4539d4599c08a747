//! The individual rewriting stages of the markdown pipeline
//!
//! Each stage is a plain `&str -> String` function. Later stages rely on
//! artifacts of earlier ones (the line breaks inserted after closing tags are
//! partly undone for link syntax at the end), so they are only meaningful in
//! the order given by [`super::PIPELINE`].

use super::sanitize::{sanitize as sanitize_html, MARKDOWN_POLICY};
use regex::{Captures, NoExpand, Regex};
use std::sync::LazyLock;

static ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a\s+(?:[^>]*?\s+)?href="([^"]*)"[^>]*>(.*?)</a>"#)
        .expect("hardcoded regex pattern is valid")
});

static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<li>(.*?)</li>").expect("hardcoded regex pattern is valid"));

static CLOSING_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(</[^>]*>)").expect("hardcoded regex pattern is valid"));

static EMPTY_ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<a[^>]*>(?:\s|&nbsp;)*</a>").expect("hardcoded regex pattern is valid")
});

static SPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" {2,}").expect("hardcoded regex pattern is valid"));

static INDENTED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n +").expect("hardcoded regex pattern is valid"));

static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\r?\n){2,}").expect("hardcoded regex pattern is valid"));

// Word characters are ASCII-only here
static BREAK_AFTER_BRACKET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(?:\r?\n)+([0-9A-Za-z_])").expect("hardcoded regex pattern is valid")
});

static BREAK_BEFORE_BRACKET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9A-Za-z_])(?:\r?\n)+\[").expect("hardcoded regex pattern is valid")
});

/// Line break used by every stage that inserts one
pub const LINE_BREAK: &str = "\r\n";

/// Stage 1: `<a ... href="H" ...>TEXT</a>` becomes `[TEXT](H)`
///
/// Runs before sanitizing so link targets survive as plain text. Anchors
/// whose text spans several lines are left alone.
pub fn anchors_to_links(text: &str) -> String {
    ANCHOR.replace_all(text, "[${2}](${1})").into_owned()
}

/// Stage 2: `<li>TEXT</li>` becomes `- TEXT`
pub fn list_items_to_bullets(text: &str) -> String {
    LIST_ITEM.replace_all(text, "- ${1}").into_owned()
}

/// Stage 3: a line break after every closing tag
pub fn break_after_closing_tags(text: &str) -> String {
    CLOSING_TAG
        .replace_all(text, |caps: &Captures<'_>| format!("{}{}", &caps[1], LINE_BREAK))
        .into_owned()
}

/// Stage 4: allow-list sanitizing (`a`, `li`, `iframe`; `href`, `src`)
pub fn sanitize(text: &str) -> String {
    sanitize_html(text, &MARKDOWN_POLICY)
}

/// Stage 5: `&nbsp;` entities become plain spaces
pub fn decode_nbsp(text: &str) -> String {
    text.replace("&nbsp;", " ")
}

/// Stage 6: anchors with no visible content are removed
pub fn drop_empty_anchors(text: &str) -> String {
    EMPTY_ANCHOR.replace_all(text, "").into_owned()
}

/// Stage 7: runs of two or more spaces are removed entirely
pub fn collapse_spaces(text: &str) -> String {
    SPACE_RUN.replace_all(text, "").into_owned()
}

/// Stage 8: spaces after a line break are removed
pub fn dedent_lines(text: &str) -> String {
    INDENTED_LINE.replace_all(text, NoExpand(LINE_BREAK)).into_owned()
}

/// Stage 9: two or more line breaks become exactly one blank line
pub fn collapse_blank_lines(text: &str) -> String {
    BLANK_LINES
        .replace_all(text, NoExpand(&LINE_BREAK.repeat(2)))
        .into_owned()
}

/// Stage 10: rejoins link brackets split by the inserted line breaks
///
/// `[` followed by line breaks loses the breaks. A word character followed by
/// line breaks and `[` becomes the character followed by `]`.
pub fn join_split_links(text: &str) -> String {
    let opened = BREAK_AFTER_BRACKET.replace_all(text, "[${1}");
    BREAK_BEFORE_BRACKET
        .replace_all(&opened, "${1}]")
        .into_owned()
}
