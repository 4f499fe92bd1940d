//! Retry loops: run an operation until success or the policy says stop.

use super::policy::{ErrorKind, RetryDecision, RetryPolicy};
use std::future::Future;

/// Blocking retry loop used by the download workers.
/// On retryable failure, sleeps for the backoff duration then tries again;
/// the last error is returned unchanged.
pub fn run_with_retry<T, E, F, C>(policy: &RetryPolicy, classify: C, mut f: F) -> Result<T, E>
where
    F: FnMut(u32) -> Result<T, E>,
    C: Fn(&E) -> ErrorKind,
    E: std::fmt::Display,
{
    let mut attempt = 1u32;
    loop {
        match f(attempt) {
            Ok(v) => return Ok(v),
            Err(e) => match policy.decide(attempt, classify(&e)) {
                RetryDecision::NoRetry => return Err(e),
                RetryDecision::RetryAfter(d) => {
                    tracing::warn!("attempt {} failed: {}; retrying in {:?}", attempt, e, d);
                    std::thread::sleep(d);
                    attempt += 1;
                }
            },
        }
    }
}

/// Async counterpart used by the uploader; backoff sleeps yield to the runtime.
pub async fn run_with_retry_async<T, E, F, Fut, C>(
    policy: &RetryPolicy,
    classify: C,
    mut f: F,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: Fn(&E) -> ErrorKind,
    E: std::fmt::Display,
{
    let mut attempt = 1u32;
    loop {
        match f(attempt).await {
            Ok(v) => return Ok(v),
            Err(e) => match policy.decide(attempt, classify(&e)) {
                RetryDecision::NoRetry => return Err(e),
                RetryDecision::RetryAfter(d) => {
                    tracing::warn!("attempt {} failed: {}; retrying in {:?}", attempt, e, d);
                    tokio::time::sleep(d).await;
                    attempt += 1;
                }
            },
        }
    }
}
