//! End-of-run manifest (`log.json`)
//!
//! The manifest is written once, after the whole traversal has completed. A
//! crawl that aborts never reaches this point, so a missing `log.json` marks
//! an incomplete run.

use crate::state::CrawlState;
use crate::ScrapeError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the manifest inside the output root
pub const MANIFEST_FILE_NAME: &str = "log.json";

/// Serialized summary of one crawl run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Visited page URLs in visit order
    pub visited: Vec<String>,
    /// Skipped links in discovery order
    pub skipped: Vec<String>,
    /// Image file names with the number of times each was written
    pub images: Vec<ImageRecord>,
}

/// Write count for one image file name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    #[serde(rename = "fileName")]
    pub file_name: String,
    pub number: u64,
}

impl Manifest {
    /// Builds the manifest from the final crawl state
    pub fn from_state(state: &CrawlState) -> Self {
        Self {
            visited: state.visited().to_vec(),
            skipped: state.skipped().to_vec(),
            images: state
                .images()
                .map(|(file_name, number)| ImageRecord {
                    file_name: file_name.to_string(),
                    number,
                })
                .collect(),
        }
    }
}

/// Writes `log.json` into the output root
///
/// The output root is (re)created first so a run that wrote no pages still
/// gets a manifest.
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written manifest
/// * `Err(ScrapeError)` - Serialization or filesystem failure
pub async fn write_manifest(state: &CrawlState, output_root: &Path) -> Result<PathBuf, ScrapeError> {
    let manifest = Manifest::from_state(state);
    let json = serde_json::to_vec(&manifest)?;

    tokio::fs::create_dir_all(output_root)
        .await
        .map_err(|e| ScrapeError::write(output_root, e))?;

    let path = output_root.join(MANIFEST_FILE_NAME);
    tokio::fs::write(&path, json)
        .await
        .map_err(|e| ScrapeError::write(&path, e))?;

    tracing::debug!(
        "Wrote manifest with {} visited, {} skipped, {} image names to {}",
        manifest.visited.len(),
        manifest.skipped.len(),
        manifest.images.len(),
        path.display()
    );

    Ok(path)
}
