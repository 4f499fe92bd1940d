//! Periodic reference-dataset sync: download a job's URLs concurrently,
//! upload the results to object storage, report a uniform outcome.

pub mod config;
pub mod downloader;
pub mod error;
pub mod jobs;
pub mod logging;
pub mod retry;
pub mod store;
pub mod url_model;

pub use config::SyncConfig;
pub use error::SyncError;
