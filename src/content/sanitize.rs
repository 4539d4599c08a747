//! Allow-list HTML sanitizer
//!
//! Parses a fragment with html5ever (through `scraper`) and re-serializes only
//! the permitted elements and attributes. Text is always re-escaped, so the
//! output is well-formed HTML regardless of the input.

use scraper::{ElementRef, Html, Node};

/// Elements whose content is dropped together with the element when they are
/// not on the allow-list, even with `keep_content`.
///
/// This is DOMPurify's default `FORBID_CONTENTS` list, matched without regard
/// to case (`foreignObject`).
const DROP_CONTENT_TAGS: &[&str] = &[
    "annotation-xml", "audio", "colgroup", "desc", "foreignobject", "head", "iframe", "math",
    "mi", "mn", "mo", "ms", "mtext", "noembed", "noframes", "noscript", "plaintext", "script",
    "style", "svg", "template", "thead", "title", "video", "xmp",
];

/// Elements serialized without children or a closing tag.
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// URL schemes that are never kept in an attribute value.
const UNSAFE_SCHEMES: &[&str] = &["javascript:", "vbscript:"];

/// What the sanitizer lets through
#[derive(Debug, Clone, Copy)]
pub struct SanitizePolicy<'a> {
    /// Element names that are kept (lowercase)
    pub allowed_tags: &'a [&'a str],
    /// Attribute names that are kept on allowed elements (lowercase)
    pub allowed_attributes: &'a [&'a str],
    /// Also keep any `aria-*` attribute
    pub allow_aria_attributes: bool,
    /// Also keep any `data-*` attribute
    pub allow_data_attributes: bool,
    /// Keep the children of elements that are stripped
    pub keep_content: bool,
}

/// Policy used by the markdown pipeline: anchors, list items and iframes
/// with their `href`/`src`, everything else reduced to its text.
pub const MARKDOWN_POLICY: SanitizePolicy<'static> = SanitizePolicy {
    allowed_tags: &["a", "li", "iframe"],
    allowed_attributes: &["href", "src"],
    allow_aria_attributes: false,
    allow_data_attributes: false,
    keep_content: true,
};

impl SanitizePolicy<'_> {
    fn allows_tag(&self, name: &str) -> bool {
        self.allowed_tags.contains(&name)
    }

    fn allows_attribute(&self, name: &str) -> bool {
        self.allowed_attributes.contains(&name)
            || (self.allow_aria_attributes && name.starts_with("aria-"))
            || (self.allow_data_attributes && name.starts_with("data-"))
    }
}

/// Sanitizes an HTML fragment against an allow-list policy
///
/// # Examples
///
/// ```
/// use ephys_scraper::content::{sanitize, MARKDOWN_POLICY};
///
/// let html = r#"<p class="lead">Go <a href="/docs" class="btn">here</a></p>"#;
/// assert_eq!(sanitize(html, &MARKDOWN_POLICY), r#"Go <a href="/docs">here</a>"#);
/// ```
pub fn sanitize(html: &str, policy: &SanitizePolicy<'_>) -> String {
    let fragment = Html::parse_fragment(html);
    let mut out = String::with_capacity(html.len());
    sanitize_children(fragment.root_element(), policy, &mut out);
    out
}

fn sanitize_children(parent: ElementRef<'_>, policy: &SanitizePolicy<'_>, out: &mut String) {
    for child in parent.children() {
        match child.value() {
            Node::Text(text) => escape_text(text, out),
            Node::Element(_) => {
                if let Some(element) = ElementRef::wrap(child) {
                    sanitize_element(element, policy, out);
                }
            }
            // Comments, doctypes and processing instructions never survive
            _ => {}
        }
    }
}

fn sanitize_element(element: ElementRef<'_>, policy: &SanitizePolicy<'_>, out: &mut String) {
    let name = element.value().name();

    if !policy.allows_tag(name) {
        if policy.keep_content && !drops_content(name) {
            sanitize_children(element, policy, out);
        }
        return;
    }

    // Source order (scraper's `deterministic` feature)
    let attributes = element
        .value()
        .attrs()
        .filter(|(attribute, value)| policy.allows_attribute(attribute) && is_safe_value(value));

    out.push('<');
    out.push_str(name);
    for (attribute, value) in attributes {
        out.push(' ');
        out.push_str(attribute);
        out.push_str("=\"");
        escape_attribute(value, out);
        out.push('"');
    }
    out.push('>');

    if VOID_TAGS.contains(&name) {
        return;
    }

    sanitize_children(element, policy, out);
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn drops_content(name: &str) -> bool {
    DROP_CONTENT_TAGS
        .iter()
        .any(|tag| tag.eq_ignore_ascii_case(name))
}

fn is_safe_value(value: &str) -> bool {
    let normalized: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    !UNSAFE_SCHEMES
        .iter()
        .any(|scheme| normalized.starts_with(scheme))
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}

fn escape_attribute(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}
