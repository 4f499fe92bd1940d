//! Build the object store for the configured target.

use crate::config::{StorageTarget, SyncConfig};
use crate::error::SyncError;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::local::LocalFileSystem;
use object_store::{ClientOptions, ObjectStore};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// A store plus a human-readable root (`gs://bucket` or `file:///dir/bucket`) for log lines.
#[derive(Clone)]
pub struct StoreHandle {
    pub store: Arc<dyn ObjectStore>,
    pub root: String,
}

impl std::fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreHandle").field("root", &self.root).finish()
    }
}

impl StoreHandle {
    /// Local directory store; creates `root` if needed.
    pub fn local(root: &Path) -> Result<Self, SyncError> {
        std::fs::create_dir_all(root).map_err(|e| SyncError::io(root, e))?;
        let absolute = root.canonicalize().map_err(|e| SyncError::io(root, e))?;
        let fs = LocalFileSystem::new_with_prefix(&absolute).map_err(|source| SyncError::Store {
            path: absolute.display().to_string(),
            source,
        })?;
        Ok(Self {
            store: Arc::new(fs),
            root: format!("file://{}", absolute.display()),
        })
    }
}

/// Build the store for `cfg.storage`.
///
/// GCS credentials come from the environment (service account key or
/// application default credentials). Local mode writes under
/// `{dir}/{bucket}` so object paths mirror the remote layout.
pub fn build_object_store(cfg: &SyncConfig) -> Result<StoreHandle, SyncError> {
    match &cfg.storage {
        StorageTarget::Local(dir) => {
            let handle = StoreHandle::local(&dir.join(&cfg.gcs_bucket))?;
            tracing::info!("local storage mode: uploads go to {}", handle.root);
            Ok(handle)
        }
        StorageTarget::Gcs => {
            let client_options = ClientOptions::new()
                .with_timeout(Duration::from_secs(cfg.tuning.http_timeout_secs))
                .with_connect_timeout(Duration::from_secs(cfg.tuning.connect_timeout_secs));
            let store = GoogleCloudStorageBuilder::from_env()
                .with_bucket_name(&cfg.gcs_bucket)
                .with_client_options(client_options)
                .build()
                .map_err(|e| SyncError::Configuration(format!("GCS: {e}")))?;
            tracing::debug!(
                project = %cfg.gcp_project_id,
                bucket = %cfg.gcs_bucket,
                "GCS client ready"
            );
            Ok(StoreHandle {
                store: Arc::new(store),
                root: format!("gs://{}", cfg.gcs_bucket),
            })
        }
    }
}
