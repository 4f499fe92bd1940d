//! URL modeling: filename derivation and log-safe redaction.
//!
//! Derives local filenames from the URL path (percent-decoded, made safe for a
//! single path component) and masks credentials in query strings before URLs
//! reach a log line.

mod path;
mod redact;
mod sanitize;

pub use path::filename_from_url_path;
pub use redact::{redact_url, SENSITIVE_QUERY_KEYS};
pub use sanitize::sanitize_path_component;

use sha2::{Digest, Sha256};

/// Derives the filename used to save `url`.
///
/// Uses the last path segment, percent-decoded. When the URL has no usable
/// segment, falls back to `download_<8 hex chars of SHA-256(url)>` so the name
/// is stable across runs.
///
/// # Examples
///
/// - `derive_filename("https://example.com/eurofxref.zip")` → `"eurofxref.zip"`
/// - `derive_filename("https://example.com/my%20file.csv")` → `"my file.csv"`
pub fn derive_filename(url: &str) -> String {
    filename_from_url_path(url)
        .map(|raw| sanitize_path_component(&raw))
        .filter(|name| !name.is_empty() && name != "." && name != "..")
        .unwrap_or_else(|| hashed_filename(url))
}

fn hashed_filename(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    format!("download_{}", &hex::encode(digest)[..8])
}
