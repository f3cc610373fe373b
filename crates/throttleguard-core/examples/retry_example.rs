//! Example: retrying a throttled API with full-jitter backoff
//!
//! This example demonstrates:
//! 1. Throttling errors retried until the call succeeds
//! 2. Non-throttling errors returned immediately
//! 3. The spread of full-jitter delays (run it a few times to see variance)
//!
//! Run with:
//! ```bash
//! cargo run -p throttleguard-core --example retry_example
//! ```

use std::error::Error;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};
use throttleguard_core::prelude::*;
use throttleguard_core::testing::ScriptedError;

/// A simulated API that throttles the first few calls
struct ThrottledApi {
    attempts: AtomicU32,
    throttle_count: u32,
}

impl ThrottledApi {
    fn new(throttle_count: u32) -> Self {
        Self {
            attempts: AtomicU32::new(0),
            throttle_count,
        }
    }

    async fn call(&self) -> Result<String, ScriptedError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);

        if attempt < self.throttle_count {
            println!("  Attempt {}: THROTTLED", attempt + 1);
            Err(ScriptedError::throttling())
        } else {
            println!("  Attempt {}: SUCCESS", attempt + 1);
            Ok("model response".to_string())
        }
    }

    fn total_attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

fn fast_config() -> Result<RetryConfig, ConfigError> {
    RetryConfig::builder()
        .max_retries(3)
        .initial_backoff(Duration::from_millis(100))
        .max_backoff(Duration::from_secs(2))
        .build()
}

/// Example 1: throttled twice, then success
async fn example_throttled_then_success() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 1: Throttled, Then Success ===\n");

    let invoker = ResilientInvoker::new(fast_config()?);
    let api = ThrottledApi::new(2);

    let start = Instant::now();
    let result = invoker.invoke(|| api.call()).await?;

    println!("\nResult: {}", result);
    println!("Total attempts: {}", api.total_attempts());
    println!("Total time: {:?} (at most 100ms + 200ms)", start.elapsed());

    Ok(())
}

/// Example 2: validation errors are never retried
async fn example_non_transient() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 2: Non-Transient Error ===\n");

    let invoker = ResilientInvoker::new(fast_config()?);
    let attempts = AtomicU32::new(0);

    let result = invoker
        .invoke(|| async {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(ScriptedError::coded(
                "ValidationException",
                "Malformed input request",
            ))
        })
        .await;

    println!("Error: {}", result.unwrap_err());
    println!("Total attempts: {}", attempts.load(Ordering::SeqCst));

    Ok(())
}

/// Example 3: sampled delays for each retry window
fn example_jitter_spread() {
    println!("\n=== Example 3: Full-Jitter Spread ===\n");

    let backoff = FullJitterBackoff::builder()
        .max_retries(5)
        .initial_backoff(Duration::from_secs(1))
        .max_backoff(Duration::from_secs(20))
        .build();

    for attempt in 0..5 {
        let samples: Vec<String> = (0..5)
            .filter_map(|_| backoff.next_delay(attempt))
            .map(|delay| format!("{:.2}s", delay.as_secs_f64()))
            .collect();
        println!(
            "  Retry {} (window {:?}): {}",
            attempt + 1,
            backoff.window(attempt),
            samples.join(", ")
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    example_throttled_then_success().await?;
    example_non_transient().await?;
    example_jitter_spread();
    Ok(())
}
