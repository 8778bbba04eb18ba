//! Polling helpers for state that changes in the background.

use std::future::Future;
use std::time::Duration;

/// Poll `check` every `interval` until it returns true or `timeout` elapses.
///
/// Returns whether the condition was met.
pub async fn wait_until<F, Fut>(timeout: Duration, interval: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if check().await {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(interval).await;
    }
}

/// Like [`wait_until`], but panics with `description` on timeout.
pub async fn assert_eventually<F, Fut>(timeout: Duration, description: &str, check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let met = wait_until(timeout, Duration::from_millis(10), check).await;
    assert!(met, "condition not met within {:?}: {}", timeout, description);
}
