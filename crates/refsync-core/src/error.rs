//! Job-level error taxonomy.
//!
//! Per-URL transfer failures live in [`crate::retry::TransferError`]; this type
//! covers configuration, side files, local directories and the object store.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Missing or invalid setting (env var, secret, tuning file).
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    /// A side file exists but lists no usable URLs.
    #[error("no URLs found in {}", .0.display())]
    EmptyConfiguration(PathBuf),

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("object store error for {path}: {source}")]
    Store {
        path: String,
        #[source]
        source: object_store::Error,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::Io {
            path: path.into(),
            source,
        }
    }

    /// Transient store failures are worth another attempt; everything else is final.
    pub fn is_transient(&self) -> bool {
        match self {
            SyncError::Store { source, .. } => crate::retry::is_transient_store_error(source),
            _ => false,
        }
    }
}
