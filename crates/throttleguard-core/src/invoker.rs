//! The resilient invoker.
//!
//! Runs a unit of work, retrying only throttling failures. Each attempt
//! folds into one of three outcomes:
//!
//! - success: returned as-is
//! - non-transient failure, or transient failure with no budget left:
//!   returned as-is, without waiting
//! - transient failure with budget left: wait a full-jitter delay, try again

use crate::cancel::CancelSignal;
use crate::classify::{Classification, ErrorShape, classify};
use crate::config::RetryConfig;
use crate::error::InvokeError;
use crate::retry::{BackoffStrategy, FullJitterBackoff};
use crate::sleep::{Sleeper, TokioSleeper};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Wraps remote calls with throttling-aware retries.
///
/// The invoker holds only configuration; every call to [`invoke`](Self::invoke)
/// starts with a fresh attempt counter, and nothing is shared between calls.
///
/// # Examples
///
/// ```rust
/// use throttleguard_core::prelude::*;
/// use throttleguard_core::testing::ScriptedError;
/// use std::sync::atomic::{AtomicU32, Ordering};
///
/// # async fn example() -> Result<(), ScriptedError> {
/// let invoker = ResilientInvoker::new(RetryConfig::default());
/// let calls = AtomicU32::new(0);
///
/// let body = invoker
///     .invoke(|| async {
///         if calls.fetch_add(1, Ordering::SeqCst) == 0 {
///             Err(ScriptedError::throttling())
///         } else {
///             Ok("generated text")
///         }
///     })
///     .await?;
/// assert_eq!(body, "generated text");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ResilientInvoker {
    backoff: Arc<dyn BackoffStrategy>,
    sleeper: Arc<dyn Sleeper>,
}

impl fmt::Debug for ResilientInvoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResilientInvoker")
            .field("max_retries", &self.backoff.max_retries())
            .finish_non_exhaustive()
    }
}

impl Default for ResilientInvoker {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

/// What to do after a failed attempt.
enum Next<E> {
    Fail(E),
    Retry(Duration),
}

impl ResilientInvoker {
    /// Invoker with full-jitter backoff and tokio sleeps.
    pub fn new(config: RetryConfig) -> Self {
        Self {
            backoff: Arc::new(FullJitterBackoff::from_config(&config)),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Replace the backoff strategy.
    pub fn with_backoff<B>(mut self, backoff: B) -> Self
    where
        B: BackoffStrategy + 'static,
    {
        self.backoff = Arc::new(backoff);
        self
    }

    /// Replace the sleeper used between attempts.
    pub fn with_sleeper<S>(mut self, sleeper: S) -> Self
    where
        S: Sleeper + 'static,
    {
        self.sleeper = Arc::new(sleeper);
        self
    }

    /// Maximum number of retries after the first attempt.
    pub fn max_retries(&self) -> u32 {
        self.backoff.max_retries()
    }

    /// Run `operation` until it succeeds, fails non-transiently, or the
    /// retry budget is spent.
    ///
    /// The returned error is the one produced by the last attempt,
    /// unchanged.
    pub async fn invoke<F, Fut, T, E>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: ErrorShape,
    {
        let mut attempt = 0;
        loop {
            let err = match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            match self.next(err, attempt) {
                Next::Fail(err) => return Err(err),
                Next::Retry(delay) => self.sleeper.sleep(delay).await,
            }
            attempt += 1;
        }
    }

    /// Like [`invoke`](Self::invoke), but a fired `cancel` signal aborts the
    /// wait between attempts and yields [`InvokeError::Cancelled`].
    ///
    /// An attempt already in flight is never interrupted.
    pub async fn invoke_with_cancel<F, Fut, T, E>(
        &self,
        mut operation: F,
        cancel: &CancelSignal,
    ) -> Result<T, InvokeError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: ErrorShape,
    {
        let mut attempt = 0;
        loop {
            let err = match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            let delay = match self.next(err, attempt) {
                Next::Fail(err) => return Err(InvokeError::Remote(err)),
                Next::Retry(delay) => delay,
            };
            if cancel.is_cancelled() {
                debug!(attempt, "Cancelled before retry wait");
                return Err(InvokeError::Cancelled);
            }
            tokio::select! {
                _ = self.sleeper.sleep(delay) => {}
                _ = cancel.cancelled() => {
                    debug!(attempt, "Cancelled during retry wait");
                    return Err(InvokeError::Cancelled);
                }
            }
            attempt += 1;
        }
    }

    /// Blocking variant of [`invoke`](Self::invoke).
    ///
    /// Suspends the calling thread between attempts with
    /// `std::thread::sleep`; the configured sleeper is not used.
    #[cfg(feature = "blocking")]
    pub fn invoke_blocking<F, T, E>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
        E: ErrorShape,
    {
        let mut attempt = 0;
        loop {
            let err = match operation() {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            match self.next(err, attempt) {
                Next::Fail(err) => return Err(err),
                Next::Retry(delay) => std::thread::sleep(delay),
            }
            attempt += 1;
        }
    }

    fn next<E: ErrorShape>(&self, err: E, attempt: u32) -> Next<E> {
        if classify(&err) == Classification::NonTransient {
            debug!(attempt, error = %err.text(), "Non-transient failure, not retrying");
            return Next::Fail(err);
        }

        let max_retries = self.backoff.max_retries();
        match self.backoff.next_delay(attempt) {
            Some(delay) if attempt < max_retries => {
                warn!(
                    attempt = attempt + 1,
                    max_retries,
                    sleep_secs = delay.as_secs_f64(),
                    "Request throttled. Attempt {} of {}. Retrying in {:.2} seconds...",
                    attempt + 1,
                    max_retries,
                    delay.as_secs_f64(),
                );
                Next::Retry(delay)
            }
            _ => {
                debug!(attempt, max_retries, "Throttled and out of retries");
                Next::Fail(err)
            }
        }
    }
}
