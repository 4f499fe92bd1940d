//! Process configuration: environment variables plus an optional TOML tuning file.
//!
//! Built once at startup and passed by reference to the components that need it.

use crate::error::SyncError;
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_PROJECT_ID: &str = "CRON_GCP_PROJECT_ID";
pub const ENV_BUCKET: &str = "CRON_GCS_BUCKET";
pub const ENV_LICENSE_KEY: &str = "CRON_MAXMIND_LICENSE_KEY";
pub const ENV_TEMP_DIR: &str = "CRON_TEMP_DIR";
pub const ENV_URLS_DIR: &str = "CRON_URLS_DIR";
pub const ENV_LOCAL_STORAGE_DIR: &str = "CRON_LOCAL_STORAGE_DIR";
pub const ENV_CONFIG_FILE: &str = "CRON_CONFIG_FILE";

const DEFAULT_TEMP_DIR: &str = "/tmp";
/// Side files in the source checkout, used when nothing is installed next to the binary.
const SOURCE_URLS_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../urls");

/// A secret string that never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Retry policy parameters (optional `[retry]` section in the tuning file).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per download or upload (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff.
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 2.0,
            max_delay_secs: 10,
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: Duration::from_secs_f64(self.base_delay_secs.max(0.0)),
            max_delay: Duration::from_secs(self.max_delay_secs),
        }
    }
}

/// Tunables read from `config.toml`. Every field has a default so the file is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Overall per-request timeout for downloads.
    pub http_timeout_secs: u64,
    /// Connection establishment timeout for downloads.
    pub connect_timeout_secs: u64,
    /// Concurrency used by jobs that do not ask for a specific limit.
    pub default_max_concurrent: usize,
    pub retry: RetryConfig,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            http_timeout_secs: 300,
            connect_timeout_secs: 30,
            default_max_concurrent: 4,
            retry: RetryConfig::default(),
        }
    }
}

/// Where uploads go: the real bucket, or a local directory mirroring it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageTarget {
    Gcs,
    Local(PathBuf),
}

/// Immutable process configuration.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub gcp_project_id: String,
    pub gcs_bucket: String,
    pub maxmind_license_key: Option<Secret>,
    /// Root under which each job gets its own work directory.
    pub temp_dir: PathBuf,
    /// Directory holding the per-job URL side files.
    pub urls_dir: PathBuf,
    pub storage: StorageTarget,
    pub tuning: Tuning,
}

impl SyncConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, SyncError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SyncError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |key: &str| {
            get(key).ok_or_else(|| SyncError::Configuration(format!("{key} is not set")))
        };

        let gcp_project_id = require(ENV_PROJECT_ID)?;
        let gcs_bucket = require(ENV_BUCKET)?;
        let maxmind_license_key = get(ENV_LICENSE_KEY).map(Secret::new);
        let temp_dir = PathBuf::from(get(ENV_TEMP_DIR).unwrap_or_else(|| DEFAULT_TEMP_DIR.into()));
        let urls_dir = get(ENV_URLS_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(default_urls_dir);
        let storage = match get(ENV_LOCAL_STORAGE_DIR) {
            Some(dir) => StorageTarget::Local(PathBuf::from(dir)),
            None => StorageTarget::Gcs,
        };

        let tuning = match get(ENV_CONFIG_FILE) {
            Some(path) => load_tuning(Path::new(&path))?,
            None => match default_tuning_path() {
                Some(path) if path.exists() => load_tuning(&path)?,
                _ => Tuning::default(),
            },
        };

        Ok(Self {
            gcp_project_id,
            gcs_bucket,
            maxmind_license_key,
            temp_dir,
            urls_dir,
            storage,
            tuning,
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.tuning.retry.to_policy()
    }
}

/// Side-file directory when `CRON_URLS_DIR` is unset: installed next to the
/// running binary if present, else the source checkout's `urls/`.
pub fn default_urls_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| installed_urls_dir(&exe))
        .unwrap_or_else(|| PathBuf::from(SOURCE_URLS_DIR))
}

/// `<bin>/urls` or `<prefix>/share/refsync/urls` for a binary at `<prefix>/bin/refsync`.
fn installed_urls_dir(exe: &Path) -> Option<PathBuf> {
    let bin_dir = exe.parent()?;
    let mut candidates = vec![bin_dir.join("urls")];
    if let Some(prefix) = bin_dir.parent() {
        candidates.push(prefix.join("share").join("refsync").join("urls"));
    }
    candidates.into_iter().find(|dir| dir.is_dir())
}

/// `$XDG_CONFIG_HOME/refsync/config.toml`, if the XDG base dirs can be resolved.
pub fn default_tuning_path() -> Option<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("refsync").ok()?;
    Some(xdg_dirs.get_config_home().join("refsync").join("config.toml"))
}

/// Parse a tuning file. A missing file is an error here; callers decide whether it is optional.
pub fn load_tuning(path: &Path) -> Result<Tuning, SyncError> {
    let data = fs::read_to_string(path).map_err(|e| {
        SyncError::Configuration(format!("cannot read {}: {}", path.display(), e))
    })?;
    toml::from_str(&data)
        .map_err(|e| SyncError::Configuration(format!("invalid {}: {}", path.display(), e)))
}
