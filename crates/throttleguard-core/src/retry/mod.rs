//! Backoff strategies.
//!
//! # Key Types
//!
//! - [`BackoffStrategy`] - How long to wait before each retry, and how many retries
//! - [`FullJitterBackoff`] - Exponential window with a uniform sample from `[0, window]`
//!
//! # Examples
//!
//! ```rust
//! use throttleguard_core::retry::{BackoffStrategy, FullJitterBackoff};
//! use std::time::Duration;
//!
//! let backoff = FullJitterBackoff::builder()
//!     .max_retries(3)
//!     .initial_backoff(Duration::from_secs(1))
//!     .max_backoff(Duration::from_secs(20))
//!     .build();
//!
//! assert_eq!(backoff.window(2), Duration::from_secs(4));
//! assert!(backoff.next_delay(2).unwrap() <= Duration::from_secs(4));
//! ```

mod full_jitter;
mod strategy;

pub use full_jitter::{FullJitterBackoff, FullJitterBackoffBuilder};
pub use strategy::BackoffStrategy;
