//! WebDriver navigator
//!
//! Drives a headless browser through a WebDriver endpoint with `fantoccini`,
//! so pages run their scripts and load their stylesheets. WebDriver offers no
//! response interception. Once the page has loaded, the browser's resource
//! timing entries are polled until no new request shows up for a quiet
//! period, then every resource listed there is requested again with
//! `reqwest` and published as a [`PageEvent::Response`].

use crate::config::NavigationConfig;
use crate::crawler::fetcher::{build_http_client, publish_resource};
use crate::crawler::navigator::{EventHub, Navigator, PageEvent};
use crate::{Result, ScrapeError};
use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder};
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

/// Time without new resource entries after which a load counts as settled
pub const QUIET_PERIOD: Duration = Duration::from_millis(500);

const RESOURCE_URLS_SCRIPT: &str =
    "return performance.getEntriesByType('resource').map(entry => entry.name);";

const MAIN_CONTENT_SCRIPT: &str =
    "const element = document.querySelector(arguments[0]); return element === null ? null : element.innerHTML;";

const ANCHOR_HREFS_SCRIPT: &str =
    "return Array.from(document.querySelectorAll('a'), anchor => anchor.href);";

/// Session capabilities: headless Chrome or Firefox with our user agent
pub fn session_capabilities(config: &NavigationConfig) -> Map<String, Value> {
    let mut capabilities = Map::new();
    capabilities.insert(
        "goog:chromeOptions".to_string(),
        json!({
            "args": [
                "--headless",
                "--disable-gpu",
                format!("--user-agent={}", config.user_agent),
            ]
        }),
    );
    capabilities.insert(
        "moz:firefoxOptions".to_string(),
        json!({
            "args": ["-headless"],
            "prefs": { "general.useragent.override": config.user_agent },
        }),
    );
    capabilities
}

/// The strings of a script result that should be an array of strings
fn string_list(value: Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Distinct HTTP(S) resource URLs in first-seen order
fn resource_urls(entries: &[String]) -> Vec<Url> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter_map(|entry| Url::parse(entry).ok())
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .filter(|url| seen.insert(url.to_string()))
        .collect()
}

/// [`Navigator`] backed by a WebDriver session
pub struct WebDriverNavigator {
    browser: Client,
    http: reqwest::Client,
    events: EventHub,
    timeout: Duration,
    loaded: Option<String>,
}

impl WebDriverNavigator {
    /// Opens a browser session at `config.webdriver_url`
    pub async fn connect(config: &NavigationConfig) -> Result<Self> {
        let mut builder = ClientBuilder::rustls()
            .map_err(|e| ScrapeError::WebDriver(format!("TLS setup failed: {}", e)))?;
        builder.capabilities(session_capabilities(config));

        let browser = builder.connect(&config.webdriver_url).await.map_err(|e| {
            ScrapeError::WebDriver(format!(
                "cannot start a session at {}: {}",
                config.webdriver_url, e
            ))
        })?;
        tracing::info!("Browser session opened at {}", config.webdriver_url);

        Ok(Self {
            browser,
            http: build_http_client(config)?,
            events: EventHub::new(),
            timeout: Duration::from_secs(config.timeout_secs),
            loaded: None,
        })
    }

    fn loaded(&self) -> Result<&str> {
        self.loaded.as_deref().ok_or_else(|| ScrapeError::Navigation {
            url: String::new(),
            message: "no page has been loaded".to_string(),
        })
    }

    async fn script(&self, url: &str, script: &str, args: Vec<Value>) -> Result<Value> {
        self.browser
            .execute(script, args)
            .await
            .map_err(|e| ScrapeError::Navigation {
                url: url.to_string(),
                message: format!("script failed: {}", e),
            })
    }

    /// Waits until the page stops requesting resources, bounded by the timeout
    async fn settled_resources(&self, url: &str) -> Result<Vec<String>> {
        let deadline = Instant::now() + self.timeout;
        let mut entries = string_list(self.script(url, RESOURCE_URLS_SCRIPT, Vec::new()).await?);

        loop {
            tokio::time::sleep(QUIET_PERIOD).await;
            let current = string_list(self.script(url, RESOURCE_URLS_SCRIPT, Vec::new()).await?);
            if current.len() == entries.len() {
                return Ok(current);
            }
            if Instant::now() >= deadline {
                tracing::warn!("{} still loading resources after {:?}", url, self.timeout);
                return Ok(current);
            }
            entries = current;
        }
    }
}

#[async_trait]
impl Navigator for WebDriverNavigator {
    fn events(&self) -> &EventHub {
        &self.events
    }

    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.loaded = None;

        match tokio::time::timeout(self.timeout, self.browser.goto(url)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                return Err(ScrapeError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })
            }
            Err(_) => {
                return Err(ScrapeError::Navigation {
                    url: url.to_string(),
                    message: "page load timeout".to_string(),
                })
            }
        }
        self.events.publish(PageEvent::ContentReady);

        let resources = resource_urls(&self.settled_resources(url).await?);
        tracing::debug!("{} loaded {} resources", url, resources.len());
        for resource in resources {
            publish_resource(&self.http, &self.events, resource).await;
        }

        self.loaded = Some(url.to_string());
        Ok(())
    }

    async fn main_content_html(&mut self, selector: &str) -> Result<Option<String>> {
        let url = self.loaded()?.to_string();
        let value = self
            .script(&url, MAIN_CONTENT_SCRIPT, vec![Value::String(selector.to_string())])
            .await?;
        Ok(match value {
            Value::String(html) => Some(html),
            _ => None,
        })
    }

    async fn anchor_hrefs(&mut self) -> Result<Vec<String>> {
        let url = self.loaded()?.to_string();
        Ok(string_list(
            self.script(&url, ANCHOR_HREFS_SCRIPT, Vec::new()).await?,
        ))
    }

    async fn shutdown(&mut self) {
        if let Err(e) = self.browser.clone().close().await {
            tracing::warn!("Failed to close browser session: {}", e);
        }
    }
}
