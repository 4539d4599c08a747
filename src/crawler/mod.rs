//! Crawler module for site traversal
//!
//! This module contains the core crawling logic, including:
//! - The navigation seam and its scoped event subscriptions
//! - The HTTP navigator and DOM queries
//! - The WebDriver navigator for script-driven sites
//! - Image acceptance and download
//! - Depth-first traversal coordination

mod browser;
mod coordinator;
mod fetcher;
mod images;
mod navigator;
mod parser;

pub use browser::{session_capabilities, WebDriverNavigator, QUIET_PERIOD};
pub use coordinator::{run_output_root, Coordinator, CrawlOutcome};
pub use fetcher::{build_http_client, HttpNavigator};
pub use images::{
    accept_image, image_file_name, save_image, DiscardReason, ImageDecision, ImageKind,
    MIN_IMAGE_BYTES,
};
pub use navigator::{EventHub, InterceptedResponse, Navigator, PageEvent, Subscription};
pub use parser::{extract_anchor_hrefs, extract_image_urls, parse_selector, select_inner_html};

use crate::config::{Config, NavigatorBackend};
use crate::Result;

/// Runs a complete crawl
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the navigator selected by `navigation.backend`
/// 2. Traverse the site depth-first from the root URL
/// 3. Write `content.md` and images for every visited page
/// 4. Write the `log.json` manifest
///
/// # Arguments
///
/// * `config` - The scraper configuration
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - Crawl completed and the manifest was written
/// * `Err(ScrapeError)` - Crawl aborted
pub async fn crawl(config: Config) -> Result<CrawlOutcome> {
    match config.navigation.backend {
        NavigatorBackend::Http => {
            let navigator = HttpNavigator::from_config(&config.navigation)?;
            Coordinator::new(config, navigator).run().await
        }
        NavigatorBackend::WebDriver => {
            let navigator = WebDriverNavigator::connect(&config.navigation).await?;
            Coordinator::new(config, navigator).run().await
        }
    }
}
