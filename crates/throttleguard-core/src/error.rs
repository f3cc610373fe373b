//! Error types for invocation and configuration.

use thiserror::Error;

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Failure of a cancellable invocation.
///
/// Remote failures are carried unchanged in [`InvokeError::Remote`]; the
/// wrapper adds no context so the caller can inspect the original code and
/// message.
#[derive(Debug, Error)]
pub enum InvokeError<E> {
    /// The unit of work failed and was not (or no longer) retried.
    #[error(transparent)]
    Remote(E),

    /// The cancellation signal fired while waiting between attempts.
    #[error("invocation cancelled while waiting to retry")]
    Cancelled,
}

impl<E> InvokeError<E> {
    /// Whether the invocation was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// The original remote error, if this is not a cancellation.
    pub fn into_remote(self) -> Option<E> {
        match self {
            Self::Remote(err) => Some(err),
            Self::Cancelled => None,
        }
    }
}

/// Invalid retry configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A backoff bound was zero, negative or not finite.
    #[error("{field} must be a positive number of seconds, got {value}")]
    InvalidBackoff {
        /// Name of the offending field
        field: &'static str,
        /// Value that was rejected
        value: f64,
    },

    /// `max_backoff` was smaller than `initial_backoff`.
    #[error("max_backoff ({max:?}) must be >= initial_backoff ({initial:?})")]
    BackoffOrder {
        /// Configured initial backoff
        initial: std::time::Duration,
        /// Configured maximum backoff
        max: std::time::Duration,
    },

    /// The configuration document could not be parsed.
    #[error("failed to parse retry configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_is_transparent() {
        let err: InvokeError<std::io::Error> =
            InvokeError::Remote(std::io::Error::other("ThrottlingException: slow down"));
        assert_eq!(err.to_string(), "ThrottlingException: slow down");
        assert!(!err.is_cancelled());
        assert!(err.into_remote().is_some());
    }

    #[test]
    fn test_cancelled_has_no_remote() {
        let err: InvokeError<std::io::Error> = InvokeError::Cancelled;
        assert!(err.is_cancelled());
        assert!(err.into_remote().is_none());
    }
}
