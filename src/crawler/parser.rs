//! DOM queries over a loaded page
//!
//! The HTTP navigator keeps the page as text and parses it on demand for each
//! query. Hrefs and image sources are resolved the way a browser resolves
//! them: against `<base href>` when present, otherwise against the page URL.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

static CSS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"url\(\s*['"]?([^'")]+?)['"]?\s*\)"#).expect("hardcoded regex pattern is valid")
});

/// Parses a CSS selector, returning the selector error as text
pub fn parse_selector(selector: &str) -> Result<Selector, String> {
    Selector::parse(selector).map_err(|e| e.to_string())
}

/// Returns the inner HTML of the first element matching `selector`
///
/// # Example
///
/// ```
/// use ephys_scraper::crawler::{parse_selector, select_inner_html};
///
/// let html = r#"<html><body><div id="mainContent"><p>Hi</p></div></body></html>"#;
/// let selector = parse_selector("[id=mainContent]").unwrap();
/// assert_eq!(select_inner_html(html, &selector), Some("<p>Hi</p>".to_string()));
/// ```
pub fn select_inner_html(html: &str, selector: &Selector) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(selector)
        .next()
        .map(|element| element.inner_html())
}

/// Returns the resolved `href` of every `<a>` element in document order
///
/// Anchors without an `href` yield `""`. An `href` that cannot be resolved is
/// returned unchanged.
pub fn extract_anchor_hrefs(html: &str, page_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let base = document_base(&document, page_url);

    let Ok(a_selector) = Selector::parse("a") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .map(|element| match element.value().attr("href") {
            Some(href) => base
                .join(href)
                .map(|absolute| absolute.to_string())
                .unwrap_or_else(|_| href.to_string()),
            None => String::new(),
        })
        .collect()
}

/// Returns the distinct HTTP(S) image URLs the markup references
///
/// Covers `<img src>`, `srcset` candidates on `<img>` and `<source>`, and
/// `url(...)` values in inline `style` attributes, in document order. These
/// are the image requests a browser makes for the page without running
/// scripts or stylesheets.
pub fn extract_image_urls(html: &str, page_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let base = document_base(&document, page_url);

    let Ok(selector) = Selector::parse("img, source[srcset], [style]") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    document
        .select(&selector)
        .flat_map(image_references)
        .map(str::trim)
        .filter(|reference| !reference.is_empty())
        .filter_map(|reference| base.join(reference).ok())
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .filter(|url| seen.insert(url.to_string()))
        .collect()
}

/// Raw image references carried by one element's attributes
fn image_references<'a>(element: ElementRef<'a>) -> Vec<&'a str> {
    let element = element.value();
    let mut references = Vec::new();

    if element.name() == "img" {
        references.extend(element.attr("src"));
    }
    if matches!(element.name(), "img" | "source") {
        references.extend(element.attr("srcset").map(srcset_urls).unwrap_or_default());
    }
    if let Some(style) = element.attr("style") {
        references.extend(
            CSS_URL
                .captures_iter(style)
                .filter_map(|captures| captures.get(1))
                .map(|url| url.as_str()),
        );
    }

    references
}

/// URLs of the candidates in a `srcset` value
///
/// Data URLs contain commas, so a `srcset` carrying one is skipped.
fn srcset_urls(srcset: &str) -> Vec<&str> {
    if srcset.contains("data:") {
        return Vec::new();
    }
    srcset
        .split(',')
        .filter_map(|candidate| candidate.split_whitespace().next())
        .collect()
}

/// The URL relative references on the page resolve against
fn document_base(document: &Html, page_url: &Url) -> Url {
    Selector::parse("base[href]")
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .and_then(|element| element.value().attr("href"))
                .and_then(|href| page_url.join(href).ok())
        })
        .unwrap_or_else(|| page_url.clone())
}
