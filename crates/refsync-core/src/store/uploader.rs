//! Upload local files to the object store with retry.

use super::factory::StoreHandle;
use crate::error::SyncError;
use crate::retry::{classify_store_error, run_with_retry_async, ErrorKind, RetryPolicy};
use bytes::Bytes;
use object_store::path::Path as ObjectPath;
use object_store::WriteMultipart;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

/// Files above this size stream through a multipart upload instead of one `put`.
const MULTIPART_THRESHOLD: u64 = 8 * 1024 * 1024;
const PART_SIZE: usize = 8 * 1024 * 1024;
const MAX_PARTS_IN_FLIGHT: usize = 2;

/// Outcome for one file of a directory upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadResult {
    Success {
        remote_path: String,
    },
    Failure {
        local_path: PathBuf,
        kind: ErrorKind,
        message: String,
    },
}

impl UploadResult {
    pub fn is_success(&self) -> bool {
        matches!(self, UploadResult::Success { .. })
    }
}

/// `{prefix}/{name}` without doubled or leading separators.
pub fn object_path(prefix: &str, name: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let name = name.trim_start_matches('/');
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}

/// Regular files directly inside `dir`, sorted by name. Subdirectories are skipped.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>, SyncError> {
    if !dir.is_dir() {
        return Err(SyncError::NotADirectory(dir.to_path_buf()));
    }
    let entries = std::fs::read_dir(dir).map_err(|e| SyncError::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| SyncError::io(dir, e))?;
        let file_type = entry.file_type().map_err(|e| SyncError::io(entry.path(), e))?;
        if file_type.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn classify_sync_error(e: &SyncError) -> ErrorKind {
    match e {
        SyncError::Store { source, .. } => classify_store_error(source),
        _ => ErrorKind::Other,
    }
}

#[derive(Debug, Clone)]
pub struct Uploader {
    handle: StoreHandle,
    retry: RetryPolicy,
}

impl Uploader {
    pub fn new(handle: StoreHandle, retry: RetryPolicy) -> Self {
        Self { handle, retry }
    }

    pub fn root(&self) -> &str {
        &self.handle.root
    }

    /// Upload one file to `remote_path` (a leading `/` is ignored).
    ///
    /// Fails with `NotFound` when `local_path` does not exist. Transient store
    /// errors are retried; the last error is returned as-is.
    pub async fn upload_file(&self, local_path: &Path, remote_path: &str) -> Result<(), SyncError> {
        if !local_path.exists() {
            return Err(SyncError::NotFound(local_path.to_path_buf()));
        }
        let remote_path = remote_path.trim_start_matches('/');
        let location = ObjectPath::parse(remote_path).map_err(|source| SyncError::Store {
            path: remote_path.to_string(),
            source: object_store::Error::InvalidPath { source },
        })?;

        run_with_retry_async(&self.retry, classify_sync_error, |_| {
            self.put_once(local_path, &location)
        })
        .await?;

        tracing::info!(
            "uploaded {} to {}/{}",
            file_name(local_path),
            self.handle.root,
            remote_path
        );
        Ok(())
    }

    /// Upload every regular file directly in `local_dir` to `{prefix}/{name}`, one at a time.
    ///
    /// Stops at the first failure and returns it. Returns the object paths written.
    pub async fn upload_directory(
        &self,
        local_dir: &Path,
        prefix: &str,
    ) -> Result<Vec<String>, SyncError> {
        let mut uploaded = Vec::new();
        for path in list_files(local_dir)? {
            let remote = object_path(prefix, &file_name(&path));
            self.upload_file(&path, &remote).await?;
            uploaded.push(remote);
        }
        tracing::info!(
            "uploaded {} files to {}/{}",
            uploaded.len(),
            self.handle.root,
            prefix.trim_end_matches('/')
        );
        Ok(uploaded)
    }

    /// Like [`Self::upload_directory`] but keeps going past failures, reporting one result per file.
    pub async fn upload_each(
        &self,
        local_dir: &Path,
        prefix: &str,
    ) -> Result<Vec<UploadResult>, SyncError> {
        let mut results = Vec::new();
        for path in list_files(local_dir)? {
            let remote = object_path(prefix, &file_name(&path));
            match self.upload_file(&path, &remote).await {
                Ok(()) => results.push(UploadResult::Success { remote_path: remote }),
                Err(e) => {
                    let kind = classify_sync_error(&e);
                    tracing::error!(
                        "upload failed for {} ({}): {}",
                        path.display(),
                        kind.label(),
                        e
                    );
                    results.push(UploadResult::Failure {
                        kind,
                        message: e.to_string(),
                        local_path: path,
                    });
                }
            }
        }
        let ok = results.iter().filter(|r| r.is_success()).count();
        tracing::info!(
            "uploaded {}/{} files to {}/{}",
            ok,
            results.len(),
            self.handle.root,
            prefix.trim_end_matches('/')
        );
        Ok(results)
    }

    async fn put_once(&self, local_path: &Path, location: &ObjectPath) -> Result<(), SyncError> {
        let store_err = |source: object_store::Error| SyncError::Store {
            path: location.to_string(),
            source,
        };
        let len = tokio::fs::metadata(local_path)
            .await
            .map_err(|e| SyncError::io(local_path, e))?
            .len();

        if len <= MULTIPART_THRESHOLD {
            let data = tokio::fs::read(local_path)
                .await
                .map_err(|e| SyncError::io(local_path, e))?;
            self.handle
                .store
                .put(location, Bytes::from(data).into())
                .await
                .map_err(store_err)?;
            return Ok(());
        }

        let upload = self
            .handle
            .store
            .put_multipart(location)
            .await
            .map_err(store_err)?;
        let mut writer = WriteMultipart::new_with_chunk_size(upload, PART_SIZE);
        let mut file = tokio::fs::File::open(local_path)
            .await
            .map_err(|e| SyncError::io(local_path, e))?;
        let mut buf = vec![0u8; PART_SIZE];
        loop {
            let n = match file.read(&mut buf).await {
                Ok(n) => n,
                Err(e) => {
                    let _ = writer.abort().await;
                    return Err(SyncError::io(local_path, e));
                }
            };
            if n == 0 {
                break;
            }
            if let Err(e) = writer.wait_for_capacity(MAX_PARTS_IN_FLIGHT).await {
                let _ = writer.abort().await;
                return Err(store_err(e));
            }
            writer.write(&buf[..n]);
        }
        writer.finish().await.map_err(store_err)?;
        Ok(())
    }
}
