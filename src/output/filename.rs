//! Filesystem-safe names for downloaded files.

/// Characters replaced by `_` when building a file name.
const UNSAFE_CHARS: &[char] = &[
    ':', '\\', '/', '<', '>', '"', '|', '?', '*', '=', '+', '%', '&', '.', '~',
];

/// Sanitizes a string for use as a single path segment.
///
/// Every character from [`UNSAFE_CHARS`] becomes `_`, then runs of `_` are
/// collapsed into one. No length limit and no case change. Applying it twice
/// gives the same result as applying it once.
///
/// ```
/// use ephys_scraper::output::sanitize_file_name;
///
/// assert_eq!(sanitize_file_name("photo.jpg"), "photo_jpg");
/// assert_eq!(sanitize_file_name("a.png?w=100&h=50"), "a_png_w_100_h_50");
/// ```
pub fn sanitize_file_name(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut last_was_underscore = false;

    for c in input.chars() {
        let c = if UNSAFE_CHARS.contains(&c) { '_' } else { c };
        if c == '_' {
            if last_was_underscore {
                continue;
            }
            last_was_underscore = true;
        } else {
            last_was_underscore = false;
        }
        result.push(c);
    }

    result
}
