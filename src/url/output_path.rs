use std::path::{Path, PathBuf};

/// Maps a page URL onto the directory its artifacts are written to
///
/// The root URL maps to `output_root` itself. Any other URL has the first
/// occurrence of the root prefix removed and its remaining `/`-separated
/// segments appended as nested directories. Empty, `.` and `..` segments are
/// dropped so every page stays inside the output root.
///
/// No normalization is applied: `/a` and `/a/` share a directory, while `/A`
/// and `/a` do not (on case-sensitive filesystems).
///
/// # Examples
///
/// ```
/// use ephys_scraper::url::output_path_for;
/// use std::path::Path;
///
/// let root = Path::new("/out/1700000000000");
/// assert_eq!(
///     output_path_for("https://open-ephys.org/", "https://open-ephys.org/", root),
///     root.to_path_buf()
/// );
/// assert_eq!(
///     output_path_for("https://open-ephys.org/docs/intro", "https://open-ephys.org/", root),
///     root.join("docs").join("intro")
/// );
/// ```
pub fn output_path_for(url: &str, root_url: &str, output_root: &Path) -> PathBuf {
    if url == root_url {
        return output_root.to_path_buf();
    }

    let relative = url.replacen(root_url, "", 1);

    relative
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
        .fold(output_root.to_path_buf(), |path, segment| path.join(segment))
}
