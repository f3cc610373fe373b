#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Throttling-resilient invocation of remote calls.
//!
//! This crate wraps a caller-supplied unit of work (typically a call to a
//! rate-limited generative-AI service) with retry semantics tuned for
//! throttling errors:
//!
//! - **Error classification** via the [`ErrorShape`](classify::ErrorShape) view
//!   and [`classify`](classify::classify)
//! - **Full-jitter exponential backoff** via [`FullJitterBackoff`](retry::FullJitterBackoff)
//! - **A single invoker** that retries transient failures and returns every
//!   other failure unchanged, via [`ResilientInvoker`](invoker::ResilientInvoker)
//! - **Optional cancellation** of the wait between attempts via
//!   [`CancelSignal`](cancel::CancelSignal)
//!
//! All retry state lives inside one invocation. There is no shared token
//! bucket and no circuit breaker across calls.
//!
//! # Examples
//!
//! ```rust
//! use throttleguard_core::prelude::*;
//!
//! # async fn example() -> Result<(), std::io::Error> {
//! let invoker = ResilientInvoker::new(RetryConfig::default());
//!
//! let answer = invoker
//!     .invoke(|| async { Ok::<_, std::io::Error>(42) })
//!     .await?;
//! assert_eq!(answer, 42);
//! # Ok(())
//! # }
//! ```

pub mod cancel;
pub mod classify;
pub mod config;
pub mod error;
pub mod invoker;
pub mod retry;
pub mod sleep;
pub mod testing;

/// Convenient re-exports of commonly used items.
///
/// ```rust
/// use throttleguard_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::cancel::{CancelHandle, CancelSignal};
    pub use crate::classify::{Classification, ErrorShape, classify};
    pub use crate::config::{RetryConfig, RetryConfigBuilder};
    pub use crate::error::{ConfigError, InvokeError};
    pub use crate::invoker::ResilientInvoker;
    pub use crate::retry::{BackoffStrategy, FullJitterBackoff};
    pub use crate::sleep::{Sleeper, TokioSleeper};
}
