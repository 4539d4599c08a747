//! Run statistics derived from the final crawl state

use crate::state::CrawlState;
use std::path::PathBuf;
use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlStatistics {
    /// Number of pages visited
    pub pages_visited: usize,

    /// Number of distinct links skipped
    pub links_skipped: usize,

    /// Number of distinct image file names written
    pub image_files: usize,

    /// Total number of image writes, counting overwrites
    pub image_writes: u64,

    /// Wall-clock duration of the crawl
    pub duration: Duration,

    /// Directory holding the run's output
    pub output_root: PathBuf,
}

impl CrawlStatistics {
    /// Computes statistics from a completed crawl
    pub fn from_state(state: &CrawlState, duration: Duration, output_root: PathBuf) -> Self {
        Self {
            pages_visited: state.visited().len(),
            links_skipped: state.skipped().len(),
            image_files: state.images().count(),
            image_writes: state.total_image_writes(),
            duration,
            output_root,
        }
    }

    /// Image writes that replaced a file written earlier in the run
    pub fn image_overwrites(&self) -> u64 {
        self.image_writes.saturating_sub(self.image_files as u64)
    }

    /// Pages visited per second
    pub fn pages_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.pages_visited as f64 / secs
        } else {
            0.0
        }
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Output: {}", stats.output_root.display());
    println!();

    println!("Overview:");
    println!("  Pages visited: {}", stats.pages_visited);
    println!("  Links skipped: {}", stats.links_skipped);
    println!("  Image files: {}", stats.image_files);
    println!(
        "  Image writes: {} ({} overwrites)",
        stats.image_writes,
        stats.image_overwrites()
    );
    println!();

    println!(
        "Duration: {:.1}s ({:.2} pages/sec)",
        stats.duration.as_secs_f64(),
        stats.pages_per_second()
    );
}
