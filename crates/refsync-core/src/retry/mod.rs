//! Retry and backoff policy.
//!
//! Error classification (timeouts, throttling, connection failures, store
//! hiccups) and exponential backoff decisions shared by the downloader and the
//! uploader, so both paths follow the same schedule.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{
    classify, classify_curl_error, classify_http_status, classify_store_error,
    is_transient_store_error,
};
pub use error::TransferError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::{run_with_retry, run_with_retry_async};
