//! Crawler coordinator - depth-first traversal of one site
//!
//! The coordinator owns the crawl state and a single navigator. Pages are
//! processed strictly one at a time. Traversal uses an explicit stack of
//! frames, one per page on the current branch, so a branch is exhausted
//! before the next sibling link of its parent is even classified.

use crate::config::Config;
use crate::content::transform_content;
use crate::crawler::images::save_image;
use crate::crawler::navigator::{Navigator, PageEvent};
use crate::output::{write_manifest, CrawlStatistics, CONTENT_FILE_NAME};
use crate::state::{CrawlState, PageState};
use crate::url::{classify_link, output_path_for, LinkClass, SiteScope};
use crate::{Result, ScrapeError};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Output root of a run started at `started`: `<directory>/<epoch millis>`
pub fn run_output_root(directory: &str, started: DateTime<Utc>) -> PathBuf {
    Path::new(directory).join(started.timestamp_millis().to_string())
}

/// Result of a completed crawl
#[derive(Debug)]
pub struct CrawlOutcome {
    /// Final crawl state, as written to the manifest
    pub state: CrawlState,
    /// Path of the written `log.json`
    pub manifest_path: PathBuf,
    pub statistics: CrawlStatistics,
}

/// A page on the current branch and its not yet classified links
struct Frame {
    url: String,
    links: std::vec::IntoIter<String>,
    state: PageState,
}

/// Checks a page lifecycle step
fn advance(from: PageState, to: PageState) -> Result<PageState> {
    if from.can_transition_to(to) {
        Ok(to)
    } else {
        Err(ScrapeError::InvalidTransition { from, to })
    }
}

/// Main crawler coordinator structure
pub struct Coordinator<N: Navigator> {
    config: Config,
    navigator: N,
    scope: SiteScope,
    state: CrawlState,
    output_root: PathBuf,
}

impl<N: Navigator> Coordinator<N> {
    /// Creates a coordinator whose output root is named after the current time
    pub fn new(config: Config, navigator: N) -> Self {
        let output_root = run_output_root(&config.output.directory, Utc::now());
        Self::with_output_root(config, navigator, output_root)
    }

    /// Creates a coordinator writing into an explicit output root
    pub fn with_output_root(config: Config, navigator: N, output_root: PathBuf) -> Self {
        let scope = SiteScope::from_site(&config.site);
        Self {
            config,
            navigator,
            scope,
            state: CrawlState::new(),
            output_root,
        }
    }

    /// Crawls the whole site and writes the manifest
    ///
    /// Any error aborts the crawl immediately. Files written up to that point
    /// stay on disk and no manifest is written. The navigator is shut down
    /// either way.
    pub async fn run(mut self) -> Result<CrawlOutcome> {
        let start_time = Instant::now();
        tracing::info!(
            "Crawling {} into {}",
            self.config.site.root_url,
            self.output_root.display()
        );

        let traversal = self.traverse().await;
        self.navigator.shutdown().await;
        traversal?;

        let manifest_path = write_manifest(&self.state, &self.output_root).await?;
        let statistics =
            CrawlStatistics::from_state(&self.state, start_time.elapsed(), self.output_root);

        tracing::info!(
            "done: {} pages visited, {} links skipped in {:?}",
            statistics.pages_visited,
            statistics.links_skipped,
            statistics.duration
        );

        Ok(CrawlOutcome {
            state: self.state,
            manifest_path,
            statistics,
        })
    }

    async fn traverse(&mut self) -> Result<()> {
        let root_url = self.config.site.root_url.clone();
        let mut stack = vec![self.visit_page(&root_url).await?];

        while let Some(frame) = stack.last_mut() {
            let Some(link) = frame.links.next() else {
                if let Some(mut finished) = stack.pop() {
                    finished.state = advance(finished.state, PageState::BranchComplete)?;
                    tracing::info!("End of branch from {}", finished.url);
                }
                continue;
            };

            // Classified only now, after earlier siblings' branches are done
            match classify_link(&link, &self.scope, &self.state) {
                LinkClass::Accept => {
                    tracing::info!("next: {}", link);
                    let child = self.visit_page(&link).await?;
                    stack.push(child);
                }
                LinkClass::SkipDomain => {
                    if self.state.record_skipped(&link) {
                        tracing::info!("skipping: {}", link);
                    }
                }
                LinkClass::SkipAlreadyHandled | LinkClass::SkipEmpty => {}
            }
        }

        Ok(())
    }

    /// Loads one page, writes its artifacts and returns its frame
    async fn visit_page(&mut self, url: &str) -> Result<Frame> {
        let page_dir = output_path_for(url, &self.config.site.root_url, &self.output_root);
        tokio::fs::create_dir_all(&page_dir)
            .await
            .map_err(|e| ScrapeError::write(&page_dir, e))?;

        let mut page_state = PageState::NavigateStart;

        // Dropped on every exit path, including failed navigation
        let mut subscription = self.navigator.subscribe();
        self.navigator.navigate(url).await?;
        self.state.mark_visited(url);

        for event in subscription.drain() {
            match event {
                PageEvent::ContentReady => {
                    if page_state == PageState::NavigateStart {
                        page_state = self.write_content(url, &page_dir, page_state).await?;
                    }
                }
                PageEvent::Response(response) => {
                    if let Some(path) = save_image(&response, &page_dir, &mut self.state).await? {
                        tracing::debug!("Saved {} as {}", response.url, path.display());
                    }
                }
            }
        }

        // The DOM is queryable once navigation has settled
        if page_state == PageState::NavigateStart {
            tracing::debug!("No content-ready notification for {}", url);
            page_state = self.write_content(url, &page_dir, page_state).await?;
        }

        page_state = advance(page_state, PageState::ImagesCollected)?;
        drop(subscription);

        let links = self.navigator.anchor_hrefs().await?;
        page_state = advance(page_state, PageState::LinksEnumerated)?;
        tracing::debug!("{} links on {}", links.len(), url);

        Ok(Frame {
            url: url.to_string(),
            links: links.into_iter(),
            state: page_state,
        })
    }

    /// Extracts the main content, converts it and writes `content.md`
    async fn write_content(
        &mut self,
        url: &str,
        page_dir: &Path,
        page_state: PageState,
    ) -> Result<PageState> {
        let selector = &self.config.site.main_content_selector;
        let Some(html) = self.navigator.main_content_html(selector).await? else {
            advance(page_state, PageState::ExtractionFailed)?;
            return Err(ScrapeError::Extraction {
                url: url.to_string(),
                selector: selector.clone(),
            });
        };

        let markdown = transform_content(&html);
        tracing::trace!("{}:\n{}", url, markdown);

        let path = page_dir.join(CONTENT_FILE_NAME);
        tokio::fs::write(&path, markdown)
            .await
            .map_err(|e| ScrapeError::write(&path, e))?;

        advance(page_state, PageState::ContentExtracted)
    }
}
