//! Testing utilities.
//!
//! Provides a sleeper that records instead of waiting, and a scripted
//! remote error, so invoker behavior can be asserted without real delays
//! or a real service.

use crate::classify::ErrorShape;
use crate::sleep::Sleeper;
use async_trait::async_trait;
use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Sleeper that records every requested duration and returns immediately.
///
/// Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    calls: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Durations requested so far, in order.
    pub fn calls(&self) -> Vec<Duration> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Number of sleeps requested so far.
    pub fn count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(duration);
        }
    }
}

/// A remote error with an optional code, for scripting failures in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedError {
    /// Structured code, if any
    pub code: Option<String>,
    /// Human-readable message
    pub message: String,
}

impl ScriptedError {
    /// Error carrying a structured code.
    pub fn coded(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    /// Error with only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    /// `ThrottlingException: Rate exceeded`.
    pub fn throttling() -> Self {
        Self::coded("ThrottlingException", "Rate exceeded")
    }
}

impl fmt::Display for ScriptedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{}: {}", code, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ScriptedError {}

impl ErrorShape for ScriptedError {
    fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    fn text(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }
}
