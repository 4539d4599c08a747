use crate::config::SiteConfig;
use url::Url;

/// The set of URLs considered to be on the crawled site
///
/// A link is on the site when it starts with `<scheme>://` followed by the
/// configured domain, optionally prefixed with `www.`. The check is a plain
/// prefix match on the link text, so `https://open-ephys.org.example/` also
/// matches `open-ephys.org`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteScope {
    scheme: String,
    domain: String,
}

impl SiteScope {
    /// Creates a scope for `domain` reached over `scheme`
    pub fn new(scheme: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            domain: domain.into(),
        }
    }

    /// Builds the scope from the site configuration
    ///
    /// The scheme is taken from the root URL and defaults to `https` when the
    /// root URL does not parse.
    pub fn from_site(site: &SiteConfig) -> Self {
        let scheme = Url::parse(&site.root_url)
            .map(|url| url.scheme().to_string())
            .unwrap_or_else(|_| "https".to_string());
        Self::new(scheme, site.domain.clone())
    }

    /// Checks whether a link lies on the site
    ///
    /// # Examples
    ///
    /// ```
    /// use ephys_scraper::url::SiteScope;
    ///
    /// let scope = SiteScope::new("https", "open-ephys.org");
    /// assert!(scope.contains("https://open-ephys.org/a"));
    /// assert!(scope.contains("https://www.open-ephys.org/a"));
    /// assert!(!scope.contains("http://open-ephys.org/a"));
    /// assert!(!scope.contains("https://external.com/b"));
    /// ```
    pub fn contains(&self, link: &str) -> bool {
        let Some(rest) = link
            .strip_prefix(self.scheme.as_str())
            .and_then(|rest| rest.strip_prefix("://"))
        else {
            return false;
        };

        let host = rest.strip_prefix("www.").unwrap_or(rest);
        host.starts_with(self.domain.as_str())
    }
}
