//! Dataset sync jobs.
//!
//! A job binds one dataset's URL list to a destination prefix in the bucket.
//! Jobs are a closed set described by [`registry::REGISTRY`]; every entry runs
//! through the same [`DatasetJob`] orchestration (download → upload), and
//! [`runner::run`] wraps any [`Job`] with work-directory setup, cleanup and a
//! uniform [`JobOutcome`].

mod dataset;
mod registry;
mod runner;
mod url_source;

pub use dataset::{DatasetJob, UploadPolicy};
pub use registry::{lookup, names, JobDefinition, REGISTRY};
pub use runner::{run, JobOutcome, JobStatus};
pub use url_source::{parse_url_list, UrlContext, UrlSource, LICENSE_KEY_PLACEHOLDER};

use crate::error::SyncError;
use async_trait::async_trait;
use std::path::Path;

/// What a job's `execute` reports back to the runner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobReport {
    pub downloaded: usize,
    pub uploaded: usize,
    /// Local names of the files that were downloaded.
    pub files: Vec<String>,
    /// One line per failed URL or file; URLs are redacted.
    pub errors: Vec<String>,
}

/// Capabilities shared by every job.
#[async_trait]
pub trait Job: Send + Sync {
    fn name(&self) -> &str;

    /// Path segment under which this job's objects land in the bucket.
    fn destination_prefix(&self) -> &str;

    /// The URLs this run will fetch. Must not touch the network.
    fn resolve_urls(&self) -> Result<Vec<String>, SyncError>;

    /// Do the work inside `work_dir`, which the runner created and will remove.
    async fn execute(&self, work_dir: &Path) -> anyhow::Result<JobReport>;
}
