//! Job lifecycle: work directory in, [`JobOutcome`] out, work directory gone.

use super::{Job, JobReport};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::Instrument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Success,
    Error,
}

/// Summary of one run. Per-URL failures only show up in `errors`;
/// `status` is `Error` only when the job as a whole could not complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobOutcome {
    pub job: String,
    pub status: JobStatus,
    pub downloaded: usize,
    pub uploaded: usize,
    pub files: Vec<String>,
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobOutcome {
    fn success(job: &str, report: JobReport) -> Self {
        Self {
            job: job.to_string(),
            status: JobStatus::Success,
            downloaded: report.downloaded,
            uploaded: report.uploaded,
            files: report.files,
            errors: report.errors,
            error: None,
        }
    }

    fn failure(job: &str, message: String) -> Self {
        Self {
            job: job.to_string(),
            status: JobStatus::Error,
            downloaded: 0,
            uploaded: 0,
            files: Vec::new(),
            errors: Vec::new(),
            error: Some(message),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == JobStatus::Success
    }
}

/// Removes the work directory when dropped, whatever happened in between.
struct WorkDirGuard {
    path: PathBuf,
}

impl WorkDirGuard {
    /// Create a fresh `root/name`, clearing anything an earlier crashed run left behind.
    fn create(root: &Path, name: &str) -> std::io::Result<Self> {
        let path = root.join(name);
        if path.exists() {
            tracing::warn!("removing stale work directory {}", path.display());
            std::fs::remove_dir_all(&path)?;
        }
        std::fs::create_dir_all(&path)?;
        Ok(Self { path })
    }
}

impl Drop for WorkDirGuard {
    fn drop(&mut self) {
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => tracing::debug!("removed work directory {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                "failed to remove work directory {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

/// Run `job` in `temp_root/<name>` and always come back with an outcome.
///
/// Errors from `execute` become `status: error` with the message (and its causes)
/// in `error`. The work directory is removed on every path; failing to remove it
/// is logged and does not change the outcome.
pub async fn run(job: &dyn Job, temp_root: &Path) -> JobOutcome {
    let name = job.name().to_string();
    let span = tracing::info_span!("job", name = %name);
    async move {
        tracing::info!("starting job");
        let guard = match WorkDirGuard::create(temp_root, &name) {
            Ok(guard) => guard,
            Err(e) => {
                let message = format!(
                    "cannot create work directory {}: {}",
                    temp_root.join(&name).display(),
                    e
                );
                tracing::error!("{}", message);
                return JobOutcome::failure(&name, message);
            }
        };

        let outcome = match job.execute(&guard.path).await {
            Ok(report) => {
                tracing::info!(
                    "job finished: {} downloaded, {} uploaded, {} errors",
                    report.downloaded,
                    report.uploaded,
                    report.errors.len()
                );
                JobOutcome::success(&name, report)
            }
            Err(e) => {
                let message = format!("{:#}", e);
                tracing::error!("job failed: {}", message);
                JobOutcome::failure(&name, message)
            }
        };
        drop(guard);
        outcome
    }
    .instrument(span)
    .await
}
