//! Image acceptance and download
//!
//! Every network response of a page load is offered to [`save_image`]. Only
//! reasonably sized GIF, PNG and JPEG payloads that do not look like icons are
//! kept; they are written next to the page's `content.md`.

use crate::crawler::navigator::InterceptedResponse;
use crate::output::sanitize_file_name;
use crate::state::CrawlState;
use crate::{Result, ScrapeError};
use std::path::{Path, PathBuf};

/// Payloads smaller than this are treated as tracking pixels or placeholders
pub const MIN_IMAGE_BYTES: usize = 2000;

/// Image formats that are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Gif,
    Png,
    Jpeg,
}

impl ImageKind {
    /// Maps an exact `Content-Type` header value to a kept format
    ///
    /// Parameters such as `; charset=...` make the value unknown.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        match content_type {
            "image/gif" => Some(Self::Gif),
            "image/png" => Some(Self::Png),
            "image/jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    /// File extension written for this format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Gif => "gif",
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

/// Why a response was not saved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// Missing or non-image content type
    NotAnImage,
    /// URL contains `ico`
    IconUrl,
    /// Payload below [`MIN_IMAGE_BYTES`]
    TooSmall,
    /// URL ends with `/`
    NoFileName,
}

/// Outcome of offering a response to the acceptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageDecision {
    /// Save under this file name
    Keep(String),
    Discard(DiscardReason),
}

/// Decides whether a response is kept and under which file name
///
/// # Examples
///
/// ```
/// use ephys_scraper::crawler::{accept_image, DiscardReason, ImageDecision};
///
/// assert_eq!(
///     accept_image("https://open-ephys.org/img/photo.jpg", Some("image/jpeg"), 5000),
///     ImageDecision::Keep("photo_jpg.jpg".to_string())
/// );
/// assert_eq!(
///     accept_image("https://open-ephys.org/favicon.png", Some("image/png"), 5000),
///     ImageDecision::Discard(DiscardReason::IconUrl)
/// );
/// ```
pub fn accept_image(url: &str, content_type: Option<&str>, body_len: usize) -> ImageDecision {
    let Some(kind) = content_type.and_then(ImageKind::from_content_type) else {
        return ImageDecision::Discard(DiscardReason::NotAnImage);
    };

    if url.contains("ico") {
        return ImageDecision::Discard(DiscardReason::IconUrl);
    }

    if body_len < MIN_IMAGE_BYTES {
        return ImageDecision::Discard(DiscardReason::TooSmall);
    }

    match image_file_name(url, kind) {
        Some(file_name) => ImageDecision::Keep(file_name),
        None => ImageDecision::Discard(DiscardReason::NoFileName),
    }
}

/// Derives the file name from the last `/` segment of `url`
///
/// Any query string stays part of the name. The segment is sanitized before
/// the extension is stripped, so the original `.ext` has already become
/// `_ext` and survives in front of the appended extension.
pub fn image_file_name(url: &str, kind: ImageKind) -> Option<String> {
    let segment = url.rsplit('/').next().unwrap_or_default();
    if segment.is_empty() {
        return None;
    }

    let extension = kind.extension();
    let base = sanitize_file_name(segment).replacen(&format!(".{}", extension), "", 1);
    Some(format!("{}.{}", base, extension))
}

/// Saves an accepted image into `page_dir` and counts the write
///
/// Returns the written path, or `None` when the response was discarded.
/// Writing a name that already exists overwrites the file and still counts.
pub async fn save_image(
    response: &InterceptedResponse,
    page_dir: &Path,
    state: &mut CrawlState,
) -> Result<Option<PathBuf>> {
    let decision = accept_image(
        &response.url,
        response.content_type.as_deref(),
        response.body.len(),
    );

    let file_name = match decision {
        ImageDecision::Keep(file_name) => file_name,
        ImageDecision::Discard(reason) => {
            tracing::trace!("Discarding response {}: {:?}", response.url, reason);
            return Ok(None);
        }
    };

    let path = page_dir.join(&file_name);
    tokio::fs::write(&path, &response.body)
        .await
        .map_err(|e| ScrapeError::write(&path, e))?;

    let count = state.record_image(&file_name);
    if count > 1 {
        tracing::debug!("Image {} written {} times", file_name, count);
    }

    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(url: &str, content_type: &str, len: usize) -> InterceptedResponse {
        InterceptedResponse {
            url: url.to_string(),
            content_type: Some(content_type.to_string()),
            body: vec![1; len],
        }
    }

    #[test]
    fn test_image_kind() {
        assert_eq!(ImageKind::from_content_type("image/gif"), Some(ImageKind::Gif));
        assert_eq!(ImageKind::from_content_type("image/png"), Some(ImageKind::Png));
        assert_eq!(ImageKind::from_content_type("image/jpeg"), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_content_type("image/webp"), None);
        assert_eq!(ImageKind::from_content_type("image/svg+xml"), None);
        assert_eq!(ImageKind::from_content_type("text/html"), None);
        assert_eq!(ImageKind::Jpeg.extension(), "jpg");
    }

    #[test]
    fn test_content_type_must_match_exactly() {
        assert_eq!(
            accept_image("https://open-ephys.org/a.png", Some("image/png; q=1"), 5000),
            ImageDecision::Discard(DiscardReason::NotAnImage)
        );
        assert_eq!(
            accept_image("https://open-ephys.org/a.png", None, 5000),
            ImageDecision::Discard(DiscardReason::NotAnImage)
        );
    }

    #[test]
    fn test_icon_heuristic() {
        assert_eq!(
            accept_image("https://open-ephys.org/icons/logo.png", Some("image/png"), 5000),
            ImageDecision::Discard(DiscardReason::IconUrl)
        );
        // Any occurrence counts
        assert_eq!(
            accept_image("https://open-ephys.org/img/silicon.png", Some("image/png"), 5000),
            ImageDecision::Discard(DiscardReason::IconUrl)
        );
    }

    #[test]
    fn test_size_threshold() {
        let url = "https://open-ephys.org/img/photo.jpg";
        assert_eq!(
            accept_image(url, Some("image/jpeg"), MIN_IMAGE_BYTES - 1),
            ImageDecision::Discard(DiscardReason::TooSmall)
        );
        assert_eq!(
            accept_image(url, Some("image/jpeg"), MIN_IMAGE_BYTES),
            ImageDecision::Keep("photo_jpg.jpg".to_string())
        );
    }

    #[test]
    fn test_file_names() {
        assert_eq!(
            image_file_name("https://open-ephys.org/a/diagram.png", ImageKind::Png),
            Some("diagram_png.png".to_string())
        );
        assert_eq!(
            image_file_name("https://open-ephys.org/a/anim.gif?v=2", ImageKind::Gif),
            Some("anim_gif_v_2.gif".to_string())
        );
        assert_eq!(
            image_file_name("https://open-ephys.org/render", ImageKind::Jpeg),
            Some("render.jpg".to_string())
        );
        assert_eq!(
            image_file_name("https://open-ephys.org/a/", ImageKind::Png),
            None
        );
    }

    #[test]
    fn test_extension_follows_content_type() {
        assert_eq!(
            image_file_name("https://open-ephys.org/photo.png", ImageKind::Jpeg),
            Some("photo_png.jpg".to_string())
        );
    }

    #[tokio::test]
    async fn test_save_writes_and_counts() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = CrawlState::new();
        let image = response("https://open-ephys.org/img/photo.jpg", "image/jpeg", 5000);

        let path = save_image(&image, dir.path(), &mut state).await.unwrap();
        let path = path.expect("image should be kept");

        assert_eq!(path, dir.path().join("photo_jpg.jpg"));
        assert_eq!(std::fs::read(&path).unwrap().len(), 5000);
        assert_eq!(state.image_count("photo_jpg.jpg"), 1);
    }

    #[tokio::test]
    async fn test_collision_overwrites_and_increments() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = CrawlState::new();

        let first = response("https://open-ephys.org/a/photo.jpg", "image/jpeg", 5000);
        let second = response("https://open-ephys.org/b/photo.jpg", "image/jpeg", 3000);

        save_image(&first, dir.path(), &mut state).await.unwrap();
        save_image(&second, dir.path(), &mut state).await.unwrap();

        assert_eq!(state.image_count("photo_jpg.jpg"), 2);
        let written = std::fs::read(dir.path().join("photo_jpg.jpg")).unwrap();
        assert_eq!(written.len(), 3000);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_discarded_leaves_no_trace() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = CrawlState::new();

        let discarded = [
            response("https://open-ephys.org/", "text/html", 5000),
            response("https://open-ephys.org/img/pixel.gif", "image/gif", 43),
            response("https://open-ephys.org/favicon.png", "image/png", 5000),
            response("https://open-ephys.org/img/vector.svg", "image/svg+xml", 5000),
        ];
        for item in &discarded {
            assert_eq!(save_image(item, dir.path(), &mut state).await.unwrap(), None);
        }

        assert_eq!(state.images().count(), 0);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = CrawlState::new();
        let image = response("https://open-ephys.org/img/photo.jpg", "image/jpeg", 5000);

        let result = save_image(&image, &dir.path().join("missing"), &mut state).await;
        assert!(matches!(result, Err(ScrapeError::Write { .. })));
        assert_eq!(state.image_count("photo_jpg.jpg"), 0);
    }
}
