//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: visited pages, skipped links and image write counts for one run
//! - `PageState`: the lifecycle of a single page inside the traversal

mod crawl_state;
mod page_state;

// Re-export main types
pub use crawl_state::CrawlState;
pub use page_state::PageState;
