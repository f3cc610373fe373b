//! Retry configuration.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default initial backoff window.
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Default cap on the backoff window.
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(20);

/// Retry budget and backoff bounds for one invoker.
///
/// `max_retries` counts retries, not attempts: with `max_retries == 3` the
/// unit of work runs at most four times.
///
/// # Examples
///
/// ```rust
/// use throttleguard_core::config::RetryConfig;
/// use std::time::Duration;
///
/// let config = RetryConfig::builder()
///     .max_retries(5)
///     .initial_backoff(Duration::from_millis(500))
///     .max_backoff(Duration::from_secs(10))
///     .build()
///     .unwrap();
/// assert_eq!(config.max_retries(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRetryConfig", into = "RawRetryConfig")]
pub struct RetryConfig {
    max_retries: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl Default for RetryConfig {
    /// `max_retries = 3`, `initial_backoff = 1s`, `max_backoff = 20s`.
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
            max_backoff: DEFAULT_MAX_BACKOFF,
        }
    }
}

impl RetryConfig {
    /// Create a builder starting from the defaults.
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::default()
    }

    /// Parse and validate a TOML document.
    ///
    /// Missing keys fall back to the defaults.
    ///
    /// ```rust
    /// use throttleguard_core::config::RetryConfig;
    ///
    /// let config = RetryConfig::from_toml_str("max_retries = 5\nmax_backoff_secs = 30.0").unwrap();
    /// assert_eq!(config.max_retries(), 5);
    /// ```
    pub fn from_toml_str(input: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(input)?)
    }

    /// Maximum number of retries after the first attempt.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Backoff window before the first retry.
    pub fn initial_backoff(&self) -> Duration {
        self.initial_backoff
    }

    /// Upper bound on any backoff window.
    pub fn max_backoff(&self) -> Duration {
        self.max_backoff
    }

    /// Check the backoff bounds.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.initial_backoff.is_zero() {
            return Err(ConfigError::InvalidBackoff {
                field: "initial_backoff",
                value: 0.0,
            });
        }
        if self.max_backoff.is_zero() {
            return Err(ConfigError::InvalidBackoff {
                field: "max_backoff",
                value: 0.0,
            });
        }
        if self.max_backoff < self.initial_backoff {
            return Err(ConfigError::BackoffOrder {
                initial: self.initial_backoff,
                max: self.max_backoff,
            });
        }
        Ok(())
    }
}

/// Builder for [`RetryConfig`].
#[derive(Debug, Default)]
pub struct RetryConfigBuilder {
    max_retries: Option<u32>,
    initial_backoff: Option<Duration>,
    max_backoff: Option<Duration>,
}

impl RetryConfigBuilder {
    /// Set the maximum number of retries.
    ///
    /// Default: 3
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Set the initial backoff window.
    ///
    /// Default: 1s
    pub fn initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = Some(backoff);
        self
    }

    /// Set the maximum backoff window.
    ///
    /// Default: 20s
    pub fn max_backoff(mut self, backoff: Duration) -> Self {
        self.max_backoff = Some(backoff);
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> ConfigResult<RetryConfig> {
        let config = RetryConfig {
            max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            initial_backoff: self.initial_backoff.unwrap_or(DEFAULT_INITIAL_BACKOFF),
            max_backoff: self.max_backoff.unwrap_or(DEFAULT_MAX_BACKOFF),
        };
        config.validate()?;
        Ok(config)
    }
}

/// On-disk form: durations as fractional seconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawRetryConfig {
    max_retries: u32,
    initial_backoff_secs: f64,
    max_backoff_secs: f64,
}

impl Default for RawRetryConfig {
    fn default() -> Self {
        RetryConfig::default().into()
    }
}

impl From<RetryConfig> for RawRetryConfig {
    fn from(config: RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_backoff_secs: config.initial_backoff.as_secs_f64(),
            max_backoff_secs: config.max_backoff.as_secs_f64(),
        }
    }
}

impl TryFrom<RawRetryConfig> for RetryConfig {
    type Error = ConfigError;

    fn try_from(raw: RawRetryConfig) -> ConfigResult<Self> {
        let config = RetryConfig {
            max_retries: raw.max_retries,
            initial_backoff: seconds("initial_backoff", raw.initial_backoff_secs)?,
            max_backoff: seconds("max_backoff", raw.max_backoff_secs)?,
        };
        config.validate()?;
        Ok(config)
    }
}

fn seconds(field: &'static str, value: f64) -> ConfigResult<Duration> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::InvalidBackoff { field, value });
    }
    Duration::try_from_secs_f64(value).map_err(|_| ConfigError::InvalidBackoff { field, value })
}
