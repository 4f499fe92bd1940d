//! Concurrent batch downloader.
//!
//! Takes a list of URLs and a destination directory, runs at most
//! `max_concurrent` HTTP GETs at once on a fixed worker pool, retries
//! transient failures with backoff, and resolves filename collisions so no two
//! URLs in a batch (or a file already on disk) share a destination.
//! Per-URL failures become [`DownloadResult::Failure`] records; the batch
//! itself only fails if the destination directory cannot be created.

mod naming;
mod part_file;
mod transfer;

pub use naming::NameReserver;
pub use part_file::part_path;

use crate::config::Tuning;
use crate::error::SyncError;
use crate::retry::{classify, run_with_retry, ErrorKind, RetryPolicy};
use crate::url_model::{derive_filename, redact_url};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Concurrency used when a caller has no preference.
pub const DEFAULT_MAX_CONCURRENT: usize = 4;

/// Transport settings for every request in a batch.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    pub retry: RetryPolicy,
    /// Overall per-request timeout (connect + transfer).
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub max_redirections: u32,
    pub user_agent: String,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            timeout: Duration::from_secs(300),
            connect_timeout: Duration::from_secs(30),
            max_redirections: 10,
            user_agent: concat!("refsync/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl DownloadOptions {
    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self {
            retry: tuning.retry.to_policy(),
            timeout: Duration::from_secs(tuning.http_timeout_secs),
            connect_timeout: Duration::from_secs(tuning.connect_timeout_secs),
            ..Self::default()
        }
    }
}

/// Outcome for one input URL. Exactly one is produced per URL, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadResult {
    Success {
        url: String,
        path: PathBuf,
        bytes: u64,
    },
    Failure {
        url: String,
        kind: ErrorKind,
        message: String,
    },
}

impl DownloadResult {
    pub fn url(&self) -> &str {
        match self {
            DownloadResult::Success { url, .. } | DownloadResult::Failure { url, .. } => url,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DownloadResult::Success { .. })
    }

    /// Local path for successful downloads.
    pub fn path(&self) -> Option<&Path> {
        match self {
            DownloadResult::Success { path, .. } => Some(path),
            DownloadResult::Failure { .. } => None,
        }
    }
}

/// Work shared by the pool: pending URLs plus the name reservations made so far.
/// Popping a URL and reserving its filename happen under one lock, in input order,
/// so collision suffixes are deterministic while transfers run unlocked.
struct WorkQueue {
    pending: VecDeque<(usize, String)>,
    names: NameReserver,
}

impl WorkQueue {
    fn next(&mut self) -> Option<(usize, String, PathBuf)> {
        let (index, url) = self.pending.pop_front()?;
        let dest = self.names.reserve(&derive_filename(&url));
        Some((index, url, dest))
    }
}

#[derive(Debug, Clone, Default)]
pub struct FileDownloader {
    options: DownloadOptions,
}

impl FileDownloader {
    pub fn new(options: DownloadOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DownloadOptions {
        &self.options
    }

    /// Downloads one URL to `dest`, retrying transient failures.
    /// Returns the byte count; on failure no file is left at `dest` or its `.part` path.
    pub fn download_file(&self, url: &str, dest: &Path) -> Result<u64, crate::retry::TransferError> {
        let shown = redact_url(url);
        tracing::info!("downloading {}", shown);
        let res = run_with_retry(&self.options.retry, classify, |attempt| {
            if attempt > 1 {
                tracing::debug!("attempt {} for {}", attempt, shown);
            }
            transfer::fetch_to_path(url, dest, &self.options)
        });
        match res {
            Ok(bytes) => {
                tracing::info!(
                    "downloaded {} ({} bytes)",
                    dest.file_name().map(|n| n.to_string_lossy()).unwrap_or_default(),
                    bytes
                );
                Ok(bytes)
            }
            Err(e) => {
                part_file::discard(&part_path(dest));
                Err(e)
            }
        }
    }

    /// Downloads every URL into `dest_dir` with at most `max_concurrent` transfers in flight.
    ///
    /// Creates `dest_dir` (and parents) first. Returns one result per URL in input order;
    /// individual failures are logged and recorded, never raised.
    pub fn download_many(
        &self,
        urls: &[String],
        dest_dir: &Path,
        max_concurrent: usize,
    ) -> Result<Vec<DownloadResult>, SyncError> {
        std::fs::create_dir_all(dest_dir).map_err(|e| SyncError::io(dest_dir, e))?;

        let count = urls.len();
        if count == 0 {
            tracing::info!("downloaded 0/0 files successfully");
            return Ok(Vec::new());
        }

        let queue = Arc::new(Mutex::new(WorkQueue {
            pending: urls.iter().cloned().enumerate().collect(),
            names: NameReserver::new(dest_dir),
        }));
        let (tx, rx) = mpsc::channel();
        let num_workers = max_concurrent.max(1).min(count);
        let mut handles = Vec::with_capacity(num_workers);
        for _ in 0..num_workers {
            let queue = Arc::clone(&queue);
            let tx = tx.clone();
            let downloader = self.clone();
            handles.push(std::thread::spawn(move || loop {
                let next = queue.lock().expect("download queue lock poisoned").next();
                let Some((index, url, dest)) = next else {
                    break;
                };
                let result = match downloader.download_file(&url, &dest) {
                    Ok(bytes) => DownloadResult::Success {
                        url,
                        path: dest,
                        bytes,
                    },
                    Err(e) => DownloadResult::Failure {
                        kind: classify(&e),
                        message: e.to_string(),
                        url,
                    },
                };
                if tx.send((index, result)).is_err() {
                    break;
                }
            }));
        }
        drop(tx);

        let mut slots: Vec<Option<DownloadResult>> = vec![None; count];
        for (index, result) in rx {
            slots[index] = Some(result);
        }
        for h in handles {
            if h.join().is_err() {
                tracing::error!("download worker panicked");
            }
        }

        let results: Vec<DownloadResult> = slots
            .into_iter()
            .zip(urls)
            .map(|(slot, url)| {
                slot.unwrap_or_else(|| DownloadResult::Failure {
                    url: url.clone(),
                    kind: ErrorKind::Other,
                    message: "download worker exited before finishing".to_string(),
                })
            })
            .collect();

        let mut succeeded = 0usize;
        for r in &results {
            match r {
                DownloadResult::Success { .. } => succeeded += 1,
                DownloadResult::Failure { url, kind, message } => {
                    tracing::error!(
                        "download failed for {} ({}): {}",
                        redact_url(url),
                        kind.label(),
                        message
                    );
                }
            }
        }
        tracing::info!("downloaded {}/{} files successfully", succeeded, count);
        Ok(results)
    }
}
