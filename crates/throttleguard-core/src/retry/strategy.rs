//! The backoff strategy seam used by the invoker.

use std::time::Duration;

/// A strategy for spacing out retries of a throttled operation.
///
/// The invoker asks the strategy for a delay only after an attempt failed
/// transiently and retry budget remains, so `next_delay(0)` is the wait
/// before the second attempt.
pub trait BackoffStrategy: Send + Sync {
    /// Maximum number of retries after the initial attempt.
    ///
    /// With `max_retries() == 3` the operation runs at most 4 times.
    fn max_retries(&self) -> u32;

    /// Upper bound of the wait before retry `attempt` (0-indexed).
    ///
    /// Non-decreasing in `attempt`.
    fn window(&self, attempt: u32) -> Duration;

    /// The actual wait before retry `attempt`.
    ///
    /// Returns `None` once `attempt` is outside the retry budget. Every
    /// returned delay lies within `[0, window(attempt)]`.
    fn next_delay(&self, attempt: u32) -> Option<Duration>;
}
