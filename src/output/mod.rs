//! Output module for crawl artifacts
//!
//! This module handles:
//! - Filesystem-safe naming of downloaded files
//! - The end-of-run manifest (`log.json`)
//! - Run statistics

mod filename;
mod manifest;
pub mod stats;

pub use filename::sanitize_file_name;
pub use manifest::{write_manifest, ImageRecord, Manifest, MANIFEST_FILE_NAME};
pub use stats::{print_statistics, CrawlStatistics};

/// File name of the markdown document written for every visited page
pub const CONTENT_FILE_NAME: &str = "content.md";
