//! Mask credentials carried in query strings before a URL is logged.

/// Query parameter names whose values are masked (compared case-insensitively).
pub const SENSITIVE_QUERY_KEYS: &[&str] = &["license_key", "key", "token", "auth"];

const MASK: &str = "***";

/// Returns `url` with the values of sensitive query parameters replaced by `***`.
///
/// Only the query is touched; scheme, host, path, other parameters and the
/// fragment are kept byte-for-byte. The caller keeps using the original URL
/// for the request itself.
pub fn redact_url(url: &str) -> String {
    let Some((base, rest)) = url.split_once('?') else {
        return url.to_string();
    };
    let (query, fragment) = match rest.split_once('#') {
        Some((q, f)) => (q, Some(f)),
        None => (rest, None),
    };

    let masked: Vec<String> = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((name, _)) if is_sensitive(name) => format!("{name}={MASK}"),
            _ => pair.to_string(),
        })
        .collect();

    let mut out = format!("{base}?{}", masked.join("&"));
    if let Some(f) = fragment {
        out.push('#');
        out.push_str(f);
    }
    out
}

fn is_sensitive(name: &str) -> bool {
    let decoded = urlencoding::decode(name)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| name.to_string());
    SENSITIVE_QUERY_KEYS
        .iter()
        .any(|k| k.eq_ignore_ascii_case(&decoded))
}
