use std::collections::{HashMap, HashSet};

/// Mutable record of one crawl run
///
/// Tracks visited pages, skipped links and how many times each image file
/// name has been written. Created empty at crawl start, owned by the crawl
/// coordinator, and handed to the manifest writer once the traversal ends.
///
/// Every collection keeps first-insertion order so the manifest lists entries
/// in the order they were discovered.
#[derive(Debug, Clone, Default)]
pub struct CrawlState {
    visited: Vec<String>,
    visited_index: HashSet<String>,
    skipped: Vec<String>,
    skipped_index: HashSet<String>,
    image_names: Vec<String>,
    image_counts: HashMap<String, u64>,
}

impl CrawlState {
    /// Creates an empty crawl state
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the URL has been visited in this run
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited_index.contains(url)
    }

    /// Marks a URL as visited
    ///
    /// Returns false if it was already present; the visited list never
    /// contains duplicates.
    pub fn mark_visited(&mut self, url: &str) -> bool {
        if !self.visited_index.insert(url.to_string()) {
            return false;
        }
        self.visited.push(url.to_string());
        true
    }

    /// Records a skipped link
    ///
    /// Returns true only the first time a given link is recorded.
    pub fn record_skipped(&mut self, link: &str) -> bool {
        if !self.skipped_index.insert(link.to_string()) {
            return false;
        }
        self.skipped.push(link.to_string());
        true
    }

    /// Counts one write of an image file and returns the new count
    pub fn record_image(&mut self, file_name: &str) -> u64 {
        let count = self.image_counts.entry(file_name.to_string()).or_insert(0);
        if *count == 0 {
            self.image_names.push(file_name.to_string());
        }
        *count += 1;
        *count
    }

    /// Number of recorded writes for an image file name
    pub fn image_count(&self, file_name: &str) -> u64 {
        self.image_counts.get(file_name).copied().unwrap_or(0)
    }

    /// Visited URLs in visit order
    pub fn visited(&self) -> &[String] {
        &self.visited
    }

    /// Skipped links in discovery order
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    /// Image file names and their write counts, in first-write order
    pub fn images(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.image_names
            .iter()
            .map(|name| (name.as_str(), self.image_count(name)))
    }

    /// Total image writes across all file names
    pub fn total_image_writes(&self) -> u64 {
        self.image_counts.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_empty() {
        let state = CrawlState::new();
        assert!(state.visited().is_empty());
        assert!(state.skipped().is_empty());
        assert_eq!(state.images().count(), 0);
        assert_eq!(state.total_image_writes(), 0);
    }

    #[test]
    fn test_mark_visited_once() {
        let mut state = CrawlState::new();
        assert!(state.mark_visited("https://open-ephys.org/"));
        assert!(!state.mark_visited("https://open-ephys.org/"));
        assert!(state.is_visited("https://open-ephys.org/"));
        assert_eq!(state.visited(), ["https://open-ephys.org/".to_string()]);
    }

    #[test]
    fn test_visited_keeps_order() {
        let mut state = CrawlState::new();
        state.mark_visited("c");
        state.mark_visited("a");
        state.mark_visited("b");
        assert_eq!(state.visited(), ["c", "a", "b"]);
    }

    #[test]
    fn test_record_skipped_once() {
        let mut state = CrawlState::new();
        assert!(state.record_skipped("https://external.com/b"));
        assert!(!state.record_skipped("https://external.com/b"));
        assert_eq!(state.skipped(), ["https://external.com/b"]);
    }

    #[test]
    fn test_record_image_counts_collisions() {
        let mut state = CrawlState::new();
        assert_eq!(state.record_image("photo_jpg.jpg"), 1);
        assert_eq!(state.record_image("logo_png.png"), 1);
        assert_eq!(state.record_image("photo_jpg.jpg"), 2);

        assert_eq!(state.image_count("photo_jpg.jpg"), 2);
        assert_eq!(state.image_count("missing.gif"), 0);
        assert_eq!(state.total_image_writes(), 3);

        let images: Vec<_> = state.images().collect();
        assert_eq!(images, vec![("photo_jpg.jpg", 2), ("logo_png.png", 1)]);
    }
}
