//! The one orchestration every registered job shares: resolve URLs, download
//! them into the work directory, upload whatever landed there.

use super::registry::JobDefinition;
use super::url_source::UrlContext;
use super::{Job, JobReport};
use crate::config::SyncConfig;
use crate::downloader::{DownloadOptions, DownloadResult, FileDownloader};
use crate::error::SyncError;
use crate::store::{UploadResult, Uploader};
use crate::url_model::redact_url;
use anyhow::Context;
use async_trait::async_trait;
use std::path::Path;

/// How a job reacts to a file that fails to upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadPolicy {
    /// Upload the remaining files and record the failure in the report.
    #[default]
    ContinueOnError,
    /// Stop at the first failed upload and fail the job.
    AbortOnError,
}

/// A registered dataset job bound to a configuration and a store.
#[derive(Debug, Clone)]
pub struct DatasetJob {
    definition: &'static JobDefinition,
    urls: UrlContext,
    downloader: FileDownloader,
    uploader: Uploader,
    max_concurrent: usize,
    upload_policy: UploadPolicy,
}

impl DatasetJob {
    pub fn new(definition: &'static JobDefinition, cfg: &SyncConfig, uploader: Uploader) -> Self {
        Self {
            definition,
            urls: UrlContext::from_config(cfg),
            downloader: FileDownloader::new(DownloadOptions::from_tuning(&cfg.tuning)),
            uploader,
            max_concurrent: definition
                .max_concurrent
                .unwrap_or(cfg.tuning.default_max_concurrent),
            upload_policy: UploadPolicy::default(),
        }
    }

    pub fn with_upload_policy(mut self, policy: UploadPolicy) -> Self {
        self.upload_policy = policy;
        self
    }

    pub fn with_downloader(mut self, downloader: FileDownloader) -> Self {
        self.downloader = downloader;
        self
    }

    pub fn definition(&self) -> &'static JobDefinition {
        self.definition
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }
}

#[async_trait]
impl Job for DatasetJob {
    fn name(&self) -> &str {
        self.definition.name
    }

    fn destination_prefix(&self) -> &str {
        self.definition.prefix
    }

    fn resolve_urls(&self) -> Result<Vec<String>, SyncError> {
        self.definition.url_source.resolve(&self.urls)
    }

    async fn execute(&self, work_dir: &Path) -> anyhow::Result<JobReport> {
        let urls = self.resolve_urls()?;
        tracing::info!(
            "fetching {} URLs with up to {} concurrent downloads",
            urls.len(),
            self.max_concurrent
        );

        let downloader = self.downloader.clone();
        let dir = work_dir.to_path_buf();
        let max_concurrent = self.max_concurrent;
        let downloads =
            tokio::task::spawn_blocking(move || downloader.download_many(&urls, &dir, max_concurrent))
                .await
                .context("download pool stopped unexpectedly")??;

        let mut report = JobReport::default();
        for result in &downloads {
            match result {
                DownloadResult::Success { path, .. } => {
                    report.downloaded += 1;
                    if let Some(name) = path.file_name() {
                        report.files.push(name.to_string_lossy().into_owned());
                    }
                }
                DownloadResult::Failure { url, message, .. } => {
                    report.errors.push(format!("{}: {}", redact_url(url), message));
                }
            }
        }

        let prefix = self.destination_prefix();
        match self.upload_policy {
            UploadPolicy::ContinueOnError => {
                for result in self.uploader.upload_each(work_dir, prefix).await? {
                    match result {
                        UploadResult::Success { .. } => report.uploaded += 1,
                        UploadResult::Failure {
                            local_path,
                            message,
                            ..
                        } => {
                            let name = local_path
                                .file_name()
                                .map(|n| n.to_string_lossy().into_owned())
                                .unwrap_or_else(|| local_path.display().to_string());
                            report.errors.push(format!("{}: {}", name, message));
                        }
                    }
                }
            }
            UploadPolicy::AbortOnError => {
                let written = self
                    .uploader
                    .upload_directory(work_dir, prefix)
                    .await
                    .with_context(|| format!("uploading to {}/{}", self.uploader.root(), prefix))?;
                report.uploaded = written.len();
            }
        }

        Ok(report)
    }
}
