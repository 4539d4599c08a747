//! HTML to markdown conversion
//!
//! The main-content HTML of a page goes through a fixed sequence of text
//! rewriting stages. The result is "markdown-ish": links and list items use
//! markdown syntax, all other markup is reduced to its text.

mod sanitize;
pub mod stages;

pub use sanitize::{sanitize, SanitizePolicy, MARKDOWN_POLICY};

/// One named rewriting step
#[derive(Clone, Copy)]
pub struct Stage {
    pub name: &'static str,
    pub apply: fn(&str) -> String,
}

/// The conversion stages, applied in this order
pub const PIPELINE: [Stage; 10] = [
    Stage {
        name: "anchors-to-links",
        apply: stages::anchors_to_links,
    },
    Stage {
        name: "list-items-to-bullets",
        apply: stages::list_items_to_bullets,
    },
    Stage {
        name: "break-after-closing-tags",
        apply: stages::break_after_closing_tags,
    },
    Stage {
        name: "sanitize",
        apply: stages::sanitize,
    },
    Stage {
        name: "decode-nbsp",
        apply: stages::decode_nbsp,
    },
    Stage {
        name: "drop-empty-anchors",
        apply: stages::drop_empty_anchors,
    },
    Stage {
        name: "collapse-spaces",
        apply: stages::collapse_spaces,
    },
    Stage {
        name: "dedent-lines",
        apply: stages::dedent_lines,
    },
    Stage {
        name: "collapse-blank-lines",
        apply: stages::collapse_blank_lines,
    },
    Stage {
        name: "join-split-links",
        apply: stages::join_split_links,
    },
];

/// Converts main-content HTML into the page's markdown document
///
/// Deterministic and infallible: any input string produces some output.
///
/// # Examples
///
/// ```
/// use ephys_scraper::content::transform_content;
///
/// assert_eq!(transform_content(r#"<a href="/x">hi</a>"#), "[hi](/x)");
/// assert_eq!(transform_content("<li>item</li>"), "- item");
/// ```
pub fn transform_content(html: &str) -> String {
    PIPELINE.iter().fold(html.to_string(), |text, stage| {
        let next = (stage.apply)(&text);
        tracing::trace!("stage {}: {} -> {} bytes", stage.name, text.len(), next.len());
        next
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_order() {
        let names: Vec<&str> = PIPELINE.iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec![
                "anchors-to-links",
                "list-items-to-bullets",
                "break-after-closing-tags",
                "sanitize",
                "decode-nbsp",
                "drop-empty-anchors",
                "collapse-spaces",
                "dedent-lines",
                "collapse-blank-lines",
                "join-split-links",
            ]
        );
    }

    #[test]
    fn test_heading_and_paragraph() {
        let html = r#"<h1>Title</h1><p>Read the <a href="/docs">docs</a> now.</p>"#;
        assert_eq!(
            transform_content(html),
            "Title\nRead the [docs](/docs) now.\n"
        );
    }

    #[test]
    fn test_list() {
        let html = "<ul>\n<li>one</li>\n<li>two</li>\n</ul>";
        let markdown = transform_content(html);
        assert!(markdown.contains("- one\n- two"));
        assert!(!markdown.contains("<li>"));
        assert!(!markdown.contains("<ul>"));
    }

    #[test]
    fn test_nbsp_becomes_space() {
        assert_eq!(transform_content("<p>a&nbsp;b</p>"), "a b\n");
    }

    #[test]
    fn test_script_dropped_and_blank_lines_collapsed() {
        assert_eq!(
            transform_content("<p>x</p><script>alert(1)</script>"),
            "x\r\n\r\n"
        );
    }

    #[test]
    fn test_indentation_removed() {
        let html = "<div>\n    <p>Hello</p>\n</div>";
        assert_eq!(transform_content(html), "\nHello\r\n\r\n");
    }

    #[test]
    fn test_anchor_without_href_removed() {
        assert_eq!(
            transform_content(r#"<a name="top"></a><p>Hi</p>"#),
            "\nHi\n"
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(transform_content(""), "");
    }

    #[test]
    fn test_deterministic() {
        let html = r#"<div><h2>Docs</h2><ul><li><a href="/a">A</a></li></ul></div>"#;
        assert_eq!(transform_content(html), transform_content(html));
    }
}
