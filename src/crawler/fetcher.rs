//! HTTP navigator
//!
//! Loads pages with `reqwest` and answers DOM queries with `scraper`. There is
//! no script execution. The browser's network activity is emulated: the page
//! document itself and every image the markup references (`<img src>`,
//! `srcset`, `<picture><source srcset>`, inline `style` backgrounds) are
//! fetched and published as [`PageEvent::Response`] notifications before
//! `navigate` returns.
//!
//! Responses a browser would see but this navigator cannot: images set from
//! stylesheets, anything requested or inserted by scripts, and lazy-loading
//! attributes such as `data-src`. Use the WebDriver navigator for those sites.

use crate::config::NavigationConfig;
use crate::crawler::navigator::{EventHub, InterceptedResponse, Navigator, PageEvent};
use crate::crawler::parser::{
    extract_anchor_hrefs, extract_image_urls, parse_selector, select_inner_html,
};
use crate::{ConfigError, Result, ScrapeError};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use std::time::Duration;
use url::Url;

/// Builds the HTTP client used for every request of a crawl
///
/// # Example
///
/// ```
/// use ephys_scraper::config::NavigationConfig;
/// use ephys_scraper::crawler::build_http_client;
///
/// let client = build_http_client(&NavigationConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &NavigationConfig) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// The most recently loaded document
#[derive(Debug, Clone)]
struct LoadedPage {
    url: Url,
    html: String,
}

/// [`Navigator`] backed by plain HTTP requests
pub struct HttpNavigator {
    client: Client,
    events: EventHub,
    page: Option<LoadedPage>,
}

impl HttpNavigator {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            events: EventHub::new(),
            page: None,
        }
    }

    /// Builds a navigator with its own client
    pub fn from_config(config: &NavigationConfig) -> Result<Self> {
        Ok(Self::new(build_http_client(config)?))
    }

    fn page(&self) -> Result<&LoadedPage> {
        self.page.as_ref().ok_or_else(|| ScrapeError::Navigation {
            url: String::new(),
            message: "no page has been loaded".to_string(),
        })
    }
}

/// Fetches one subresource and publishes the response
///
/// Failed subresource requests do not fail the page load.
pub(crate) async fn publish_resource(client: &Client, events: &EventHub, url: Url) {
    let response = match client.get(url.clone()).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Failed to fetch {}: {}", url, e);
            return;
        }
    };

    match intercept(response).await {
        Ok(intercepted) => events.publish(PageEvent::Response(intercepted)),
        Err(e) => tracing::warn!("Failed to read {}: {}", url, e),
    }
}

/// Reads a response into the form listeners receive
async fn intercept(response: Response) -> std::result::Result<InterceptedResponse, reqwest::Error> {
    let url = response.url().to_string();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response.bytes().await?.to_vec();

    Ok(InterceptedResponse {
        url,
        content_type,
        body,
    })
}

fn navigation_error(url: &str, error: &reqwest::Error) -> ScrapeError {
    let message = if error.is_timeout() {
        "request timeout".to_string()
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        error.to_string()
    };

    ScrapeError::Navigation {
        url: url.to_string(),
        message,
    }
}

#[async_trait]
impl Navigator for HttpNavigator {
    fn events(&self) -> &EventHub {
        &self.events
    }

    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.page = None;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| navigation_error(url, &e))?;

        // A browser renders error pages too
        let status = response.status();
        if !status.is_success() {
            tracing::warn!("{} answered with HTTP {}", url, status.as_u16());
        }

        let document = intercept(response)
            .await
            .map_err(|e| navigation_error(url, &e))?;
        let page_url = Url::parse(&document.url).map_err(|e| ScrapeError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        let html = String::from_utf8_lossy(&document.body).into_owned();

        self.events.publish(PageEvent::Response(document));
        self.events.publish(PageEvent::ContentReady);

        let images = extract_image_urls(&html, &page_url);
        tracing::debug!("{} loads {} images", page_url, images.len());
        for image in images {
            publish_resource(&self.client, &self.events, image).await;
        }

        self.page = Some(LoadedPage {
            url: page_url,
            html,
        });
        Ok(())
    }

    async fn main_content_html(&mut self, selector: &str) -> Result<Option<String>> {
        let parsed = parse_selector(selector).map_err(|e| {
            ConfigError::Validation(format!("invalid main-content selector '{}': {}", selector, e))
        })?;
        let page = self.page()?;
        Ok(select_inner_html(&page.html, &parsed))
    }

    async fn anchor_hrefs(&mut self) -> Result<Vec<String>> {
        let page = self.page()?;
        Ok(extract_anchor_hrefs(&page.html, &page.url))
    }
}
