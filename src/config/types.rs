use serde::Deserialize;

/// Main configuration structure for the scraper
///
/// Every section is optional; a missing section falls back to the defaults
/// for the open-ephys.org site.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
}

/// The site being mirrored
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Root URL the crawl starts from, with trailing slash
    #[serde(rename = "root-url")]
    pub root_url: String,

    /// Domain links must stay on (an optional `www.` prefix is also accepted)
    pub domain: String,

    /// CSS selector of the page's main-content region
    #[serde(rename = "main-content-selector")]
    pub main_content_selector: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            root_url: "https://open-ephys.org/".to_string(),
            domain: "open-ephys.org".to_string(),
            main_content_selector: "[id=mainContent]".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory under which each run creates its timestamped output root
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: ".scraped".to_string(),
        }
    }
}

/// How pages are loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigatorBackend {
    /// Plain HTTP requests, no script execution
    #[default]
    Http,
    /// A headless browser driven over WebDriver
    WebDriver,
}

/// Settings for the navigators
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Navigator used for the crawl
    pub backend: NavigatorBackend,

    /// WebDriver endpoint (chromedriver, geckodriver) for the `webdriver` backend
    #[serde(rename = "webdriver-url")]
    pub webdriver_url: String,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds, also bounds a browser page load
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            backend: NavigatorBackend::Http,
            webdriver_url: "http://localhost:4444".to_string(),
            user_agent: format!("ephys-scraper/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
        }
    }
}
