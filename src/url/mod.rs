//! URL handling module
//!
//! This module decides which discovered links the crawler follows and maps
//! page URLs onto output directories.

mod matcher;
mod output_path;

use crate::state::CrawlState;

// Re-export main functions
pub use matcher::SiteScope;
pub use output_path::output_path_for;

/// Link classification results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkClass {
    /// In-scope and not yet visited - should be crawled
    Accept,
    /// Off-site, a PDF, or carrying a fragment or query - record once and skip
    SkipDomain,
    /// Already visited - skip silently
    SkipAlreadyHandled,
    /// Anchor without a target - skip silently
    SkipEmpty,
}

/// Classifies a discovered link against the site scope and the crawl state
///
/// Rules are applied in order:
/// 1. Empty link → `SkipEmpty`
/// 2. Already visited → `SkipAlreadyHandled`
/// 3. Not on the site → `SkipDomain`
/// 4. Ends with `.pdf` → `SkipDomain`
/// 5. Contains a fragment (`#`) → `SkipDomain`
/// 6. Contains a query (`?`) → `SkipDomain`
///
/// Anything else is `Accept`. Classification does not touch the crawl state;
/// recording `SkipDomain` links is the caller's job.
///
/// # Examples
///
/// ```
/// use ephys_scraper::state::CrawlState;
/// use ephys_scraper::url::{classify_link, LinkClass, SiteScope};
///
/// let scope = SiteScope::new("https", "open-ephys.org");
/// let state = CrawlState::new();
///
/// assert_eq!(classify_link("https://open-ephys.org/a", &scope, &state), LinkClass::Accept);
/// assert_eq!(classify_link("https://open-ephys.org/a?x=1", &scope, &state), LinkClass::SkipDomain);
/// assert_eq!(classify_link("https://external.com/b", &scope, &state), LinkClass::SkipDomain);
/// assert_eq!(classify_link("", &scope, &state), LinkClass::SkipEmpty);
/// ```
pub fn classify_link(link: &str, scope: &SiteScope, state: &CrawlState) -> LinkClass {
    if link.is_empty() {
        return LinkClass::SkipEmpty;
    }

    if state.is_visited(link) {
        return LinkClass::SkipAlreadyHandled;
    }

    if !scope.contains(link) || link.ends_with(".pdf") || link.contains('#') || link.contains('?')
    {
        return LinkClass::SkipDomain;
    }

    LinkClass::Accept
}
