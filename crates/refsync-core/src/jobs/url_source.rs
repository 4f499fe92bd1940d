//! Resolve a job's URL list: literal, or read from a side file with secret substitution.

use crate::config::{Secret, SyncConfig, ENV_LICENSE_KEY};
use crate::error::SyncError;
use std::path::PathBuf;

/// Placeholder in side files replaced by the MaxMind license key at load time.
pub const LICENSE_KEY_PLACEHOLDER: &str = "YOUR_LICENSE_KEY";

#[derive(Debug, Clone, Copy)]
pub enum UrlSource {
    Static(&'static [&'static str]),
    /// Newline-delimited file under the configured URLs directory.
    SideFile {
        file_name: &'static str,
        needs_license_key: bool,
    },
}

/// Everything URL resolution may need from the configuration.
#[derive(Debug, Clone)]
pub struct UrlContext {
    pub urls_dir: PathBuf,
    pub license_key: Option<Secret>,
}

impl UrlContext {
    pub fn from_config(cfg: &SyncConfig) -> Self {
        Self {
            urls_dir: cfg.urls_dir.clone(),
            license_key: cfg.maxmind_license_key.clone(),
        }
    }
}

impl UrlSource {
    /// Resolve the URL list without touching the network.
    ///
    /// Checks the license key before reading the file, then fails with
    /// `NotFound` for a missing file and `EmptyConfiguration` when it lists nothing.
    pub fn resolve(&self, ctx: &UrlContext) -> Result<Vec<String>, SyncError> {
        match *self {
            UrlSource::Static(urls) => Ok(urls.iter().map(|u| u.to_string()).collect()),
            UrlSource::SideFile {
                file_name,
                needs_license_key,
            } => {
                let key = if needs_license_key {
                    let key = ctx.license_key.as_ref().ok_or_else(|| {
                        SyncError::Configuration(format!(
                            "MaxMind license key not configured ({ENV_LICENSE_KEY})"
                        ))
                    })?;
                    Some(key)
                } else {
                    None
                };

                let path = ctx.urls_dir.join(file_name);
                if !path.is_file() {
                    return Err(SyncError::NotFound(path));
                }
                let text = std::fs::read_to_string(&path).map_err(|e| SyncError::io(&path, e))?;
                let urls = parse_url_list(&text);
                if urls.is_empty() {
                    return Err(SyncError::EmptyConfiguration(path));
                }
                tracing::info!("loaded {} URLs from {}", urls.len(), file_name);

                Ok(match key {
                    Some(key) => urls
                        .into_iter()
                        .map(|u| u.replace(LICENSE_KEY_PLACEHOLDER, key.expose()))
                        .collect(),
                    None => urls,
                })
            }
        }
    }
}

/// One URL per line; blank lines and `#` comments are ignored.
pub fn parse_url_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIDE: UrlSource = UrlSource::SideFile {
        file_name: "list.txt",
        needs_license_key: false,
    };
    const SECRET_SIDE: UrlSource = UrlSource::SideFile {
        file_name: "maxmind-urls.txt",
        needs_license_key: true,
    };

    fn ctx(dir: &std::path::Path, key: Option<&str>) -> UrlContext {
        UrlContext {
            urls_dir: dir.to_path_buf(),
            license_key: key.map(Secret::new),
        }
    }

    #[test]
    fn parse_skips_blanks_and_comments() {
        let text = "\n  https://a/x.zip  \n# comment\n\nhttps://b/y.txt\r\n   \n";
        assert_eq!(parse_url_list(text), vec!["https://a/x.zip", "https://b/y.txt"]);
    }

    #[test]
    fn static_list_is_returned_verbatim() {
        let src = UrlSource::Static(&["https://a/1", "https://a/2"]);
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            src.resolve(&ctx(dir.path(), None)).unwrap(),
            vec!["https://a/1", "https://a/2"]
        );
    }

    #[test]
    fn side_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = SIDE.resolve(&ctx(dir.path(), None)).unwrap_err();
        assert!(matches!(err, SyncError::NotFound(p) if p.ends_with("list.txt")));
    }

    #[test]
    fn side_file_without_entries() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("list.txt"), "\n   \n# nothing here\n").unwrap();
        let err = SIDE.resolve(&ctx(dir.path(), None)).unwrap_err();
        assert!(matches!(err, SyncError::EmptyConfiguration(_)));
    }

    #[test]
    fn side_file_loaded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("list.txt"), "https://a/1.zip\nhttps://a/2.zip\n").unwrap();
        assert_eq!(
            SIDE.resolve(&ctx(dir.path(), None)).unwrap(),
            vec!["https://a/1.zip", "https://a/2.zip"]
        );
    }

    #[test]
    fn license_key_checked_before_file() {
        let dir = tempfile::tempdir().unwrap();
        // No file either: the key check must win.
        let err = SECRET_SIDE.resolve(&ctx(dir.path(), None)).unwrap_err();
        assert!(matches!(err, SyncError::Configuration(m) if m.contains(ENV_LICENSE_KEY)));
    }

    #[test]
    fn license_key_substituted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("maxmind-urls.txt"),
            "https://download.maxmind.com/app/geoip_download?edition_id=GeoLite2-City&license_key=YOUR_LICENSE_KEY&suffix=tar.gz\n",
        )
        .unwrap();
        let urls = SECRET_SIDE.resolve(&ctx(dir.path(), Some("SECRET123"))).unwrap();
        assert_eq!(urls.len(), 1);
        assert!(urls[0].contains("license_key=SECRET123"));
        assert!(!urls[0].contains(LICENSE_KEY_PLACEHOLDER));
    }
}
