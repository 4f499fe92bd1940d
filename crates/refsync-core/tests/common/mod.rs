#![allow(dead_code)]

pub mod dataset_server;

use refsync_core::downloader::{DownloadOptions, FileDownloader};
use refsync_core::retry::RetryPolicy;
use std::time::Duration;

/// Millisecond-scale backoff so retry paths stay fast under test.
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(40),
    }
}

pub fn fast_downloader() -> FileDownloader {
    FileDownloader::new(DownloadOptions {
        retry: fast_retry(),
        timeout: Duration::from_secs(10),
        connect_timeout: Duration::from_secs(2),
        ..DownloadOptions::default()
    })
}

/// Regular file names in `dir`, sorted.
pub fn file_names(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .flatten()
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
