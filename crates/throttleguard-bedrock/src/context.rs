//! Service context
//!
//! Names the resources a caller talks to and the retry budget to use. The
//! caller's entry point builds one context and hands it to each guarded
//! client.

use crate::error::ContextError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use throttleguard_core::config::RetryConfig;
use throttleguard_core::invoker::ResilientInvoker;

/// Default region for all clients
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default foundation model
pub const DEFAULT_MODEL_ID: &str = "amazon.nova-pro-v1:0";

/// Default number of passages retrieved per knowledge-base query
pub const DEFAULT_NUMBER_OF_RESULTS: u32 = 5;

/// Resources and retry settings shared by the guarded clients
///
/// # Example
///
/// ```rust
/// use throttleguard_bedrock::ServiceContext;
///
/// let context = ServiceContext::from_toml_str(r#"
///     knowledge_base_id = "KB123"
///
///     [retry]
///     max_retries = 5
/// "#).unwrap();
///
/// assert_eq!(context.region, "us-east-1");
/// assert_eq!(context.retry.max_retries(), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceContext {
    /// Service region
    pub region: String,

    /// Foundation model used for direct invocation
    pub model_id: String,

    /// Knowledge base queried for retrieval
    pub knowledge_base_id: Option<String>,

    /// Passages retrieved per query
    pub number_of_results: u32,

    /// Agent used for insight generation
    pub agent_id: Option<String>,

    /// Alias of the agent
    pub agent_alias_id: Option<String>,

    /// Conversation session passed to the agent
    pub session_id: Option<String>,

    /// Retry budget for every guarded call
    pub retry: RetryConfig,
}

impl Default for ServiceContext {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            knowledge_base_id: None,
            number_of_results: DEFAULT_NUMBER_OF_RESULTS,
            agent_id: None,
            agent_alias_id: None,
            session_id: None,
            retry: RetryConfig::default(),
        }
    }
}

impl ServiceContext {
    /// Parse a TOML document; missing keys use the defaults
    pub fn from_toml_str(input: &str) -> Result<Self, ContextError> {
        Ok(toml::from_str(input)?)
    }

    /// Read and parse a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ContextError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ContextError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Foundation-model ARN for `model_id` in `region`
    pub fn model_arn(&self) -> String {
        format!(
            "arn:aws:bedrock:{}::foundation-model/{}",
            self.region, self.model_id
        )
    }

    /// Invoker configured with this context's retry budget
    pub fn invoker(&self) -> ResilientInvoker {
        ResilientInvoker::new(self.retry)
    }

    /// The knowledge base id, or an error naming the missing key
    pub fn require_knowledge_base(&self) -> Result<&str, ContextError> {
        self.knowledge_base_id
            .as_deref()
            .ok_or(ContextError::Missing("knowledge_base_id"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn test_defaults_from_empty_document() {
        let context = ServiceContext::from_toml_str("").unwrap();
        assert_eq!(context, ServiceContext::default());
        assert_eq!(context.number_of_results, 5);
        assert_eq!(context.retry, RetryConfig::default());
    }

    #[test]
    fn test_full_document() {
        let context = ServiceContext::from_toml_str(
            r#"
            region = "eu-west-1"
            model_id = "anthropic.claude-3-haiku-20240307-v1:0"
            knowledge_base_id = "KB42"
            number_of_results = 8
            agent_id = "AGENT"
            agent_alias_id = "ALIAS"
            session_id = "session-1"

            [retry]
            max_retries = 4
            initial_backoff_secs = 0.5
            max_backoff_secs = 10.0
            "#,
        )
        .unwrap();

        assert_eq!(context.region, "eu-west-1");
        assert_eq!(context.require_knowledge_base().unwrap(), "KB42");
        assert_eq!(context.number_of_results, 8);
        assert_eq!(context.agent_alias_id.as_deref(), Some("ALIAS"));
        assert_eq!(context.retry.max_retries(), 4);
        assert_eq!(context.retry.initial_backoff(), Duration::from_millis(500));
        assert_eq!(context.invoker().max_retries(), 4);
    }

    #[test]
    fn test_invalid_retry_section_is_rejected() {
        let err = ServiceContext::from_toml_str(
            "[retry]\ninitial_backoff_secs = 5.0\nmax_backoff_secs = 1.0",
        )
        .unwrap_err();
        assert!(matches!(err, ContextError::Parse(_)));
    }

    #[test]
    fn test_misspelled_key_is_rejected() {
        let err = ServiceContext::from_toml_str("knowledge_base = \"KB\"").unwrap_err();
        assert!(matches!(err, ContextError::Parse(_)));
        assert!(err.to_string().contains("knowledge_base"));
    }

    #[test]
    fn test_model_arn() {
        let context = ServiceContext::default();
        assert_eq!(
            context.model_arn(),
            "arn:aws:bedrock:us-east-1::foundation-model/amazon.nova-pro-v1:0"
        );
    }

    #[test]
    fn test_missing_knowledge_base() {
        let err = ServiceContext::default()
            .require_knowledge_base()
            .unwrap_err();
        assert_eq!(err.to_string(), "knowledge_base_id is not configured");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "knowledge_base_id = \"KB-FILE\"").unwrap();

        let context = ServiceContext::load(file.path()).unwrap();
        assert_eq!(context.knowledge_base_id.as_deref(), Some("KB-FILE"));

        let missing = ServiceContext::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(missing, ContextError::Io { .. }));
    }
}
