//! Waiting between attempts.

use async_trait::async_trait;
use std::time::Duration;

/// Suspends the current invocation between attempts.
///
/// The invoker sleeps through this seam so tests can observe the sampled
/// delays without waiting for them.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Wait for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Non-blocking sleep on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
