//! Error types for the guarded service clients

use std::borrow::Cow;
use thiserror::Error;
use throttleguard_core::classify::ErrorShape;

/// Result type for service calls
pub type Result<T> = std::result::Result<T, BedrockError>;

/// Errors returned by a service client
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BedrockError {
    /// Structured service error (e.g. `ThrottlingException`, `ValidationException`)
    #[error("{code}: {message}")]
    Service {
        /// Service error code
        code: String,
        /// Service error message
        message: String,
    },

    /// Failure below the service layer, without a structured code
    #[error("Transport error: {0}")]
    Transport(String),

    /// Local fault while preparing or reading a call
    #[error("Local error: {0}")]
    Local(String),
}

impl BedrockError {
    /// Build a structured service error
    pub fn service(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Service {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Service error code, if this is a structured service error
    pub fn service_code(&self) -> Option<&str> {
        match self {
            Self::Service { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Whether this is a service error with the given code (case-insensitive)
    pub fn is_code(&self, expected: &str) -> bool {
        self.service_code()
            .is_some_and(|code| code.eq_ignore_ascii_case(expected))
    }
}

impl ErrorShape for BedrockError {
    fn code(&self) -> Option<&str> {
        self.service_code()
    }

    fn text(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }
}

impl From<serde_json::Error> for BedrockError {
    fn from(err: serde_json::Error) -> Self {
        Self::Local(err.to_string())
    }
}

/// Errors loading or using a [`ServiceContext`](crate::ServiceContext)
#[derive(Debug, Error)]
pub enum ContextError {
    /// Reading the configuration file failed
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that could not be read
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The configuration document is invalid
    #[error("invalid service configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A resource identifier required by the call is not configured
    #[error("{0} is not configured")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use throttleguard_core::classify::{Classification, classify};

    #[test]
    fn test_service_error_display() {
        let err = BedrockError::service("ThrottlingException", "Rate exceeded");
        assert_eq!(err.to_string(), "ThrottlingException: Rate exceeded");
    }

    #[test]
    fn test_is_code_ignores_case() {
        let err = BedrockError::service("ResourceNotFoundException", "no agent");
        assert!(err.is_code("resourcenotfoundexception"));
        assert!(!err.is_code("ValidationException"));
        assert!(!BedrockError::Transport("reset".into()).is_code("ResourceNotFoundException"));
    }

    #[test]
    fn test_serde_error_is_local() {
        let err: BedrockError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, BedrockError::Local(_)));
    }

    #[test]
    fn test_classification() {
        assert_eq!(
            classify(&BedrockError::service("throttlingexception", "slow down")),
            Classification::Transient
        );
        assert_eq!(
            classify(&BedrockError::Transport("Throttling by upstream proxy".into())),
            Classification::Transient
        );
        assert_eq!(
            classify(&BedrockError::service("ValidationException", "bad input")),
            Classification::NonTransient
        );
        assert_eq!(
            classify(&BedrockError::Local("body was not JSON".into())),
            Classification::NonTransient
        );
    }
}
