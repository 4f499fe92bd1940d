//! Filename extraction from URL path.

/// Extracts the last non-empty path segment from a URL, percent-decoded.
///
/// Returns `None` if the URL cannot be parsed or the path is empty/root.
pub fn filename_from_url_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path().rsplit('/').find(|s| !s.is_empty())?;
    let decoded = urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| String::from_utf8_lossy(&urlencoding::decode_binary(segment.as_bytes())).into_owned());
    Some(decoded)
}
