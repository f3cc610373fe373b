//! Model and agent invocation
//!
//! Direct model inference takes a JSON body and returns a JSON body. Agent
//! invocation streams back byte chunks that together form the completion.

use crate::context::ServiceContext;
use crate::error::Result;
use crate::knowledge_base::RetrievedPassage;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use throttleguard_core::invoker::ResilientInvoker;
use tracing::{debug, error};

/// Error code the service uses for an unknown agent
const RESOURCE_NOT_FOUND: &str = "ResourceNotFoundException";

/// A direct model invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeModelRequest {
    /// Foundation model to call
    pub model_id: String,
    /// Model-specific request body
    pub body: JsonValue,
}

/// A single agent invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeAgentRequest {
    /// Agent to call
    pub agent_id: String,
    /// Agent alias
    pub agent_alias_id: String,
    /// Conversation session
    pub session_id: String,
    /// Input text for the agent
    pub input_text: String,
}

/// One streamed piece of an agent completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentChunk {
    /// Raw UTF-8 bytes
    pub bytes: Vec<u8>,
}

impl AgentChunk {
    /// Chunk holding `text`
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            bytes: text.into().into_bytes(),
        }
    }
}

/// A client able to run foundation models
#[async_trait]
pub trait ModelRuntime: Send + Sync {
    /// Invoke a model and return its decoded response body
    async fn invoke_model(&self, request: &InvokeModelRequest) -> Result<JsonValue>;
}

/// A client able to run agents
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    /// Invoke an agent and collect its completion chunks
    async fn invoke_agent(&self, request: &InvokeAgentRequest) -> Result<Vec<AgentChunk>>;
}

/// Outcome of asking an agent for insights
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentInsights {
    /// The agent's completion, trimmed
    Completed(String),
    /// The configured agent does not exist
    AgentNotFound,
    /// Any other failure, as text
    Failed(String),
}

/// Runtime client whose calls are retried on throttling
#[derive(Debug)]
pub struct GuardedRuntime<R> {
    runtime: R,
    model_id: String,
    agent: Option<(String, String, String)>,
    invoker: ResilientInvoker,
}

impl<R> GuardedRuntime<R> {
    /// Wrap `runtime` using the model, agent and retry budget from `context`
    pub fn new(runtime: R, context: &ServiceContext) -> Self {
        let agent = match (
            &context.agent_id,
            &context.agent_alias_id,
            &context.session_id,
        ) {
            (Some(agent), Some(alias), Some(session)) => {
                Some((agent.clone(), alias.clone(), session.clone()))
            }
            _ => None,
        };

        Self {
            runtime,
            model_id: context.model_id.clone(),
            agent,
            invoker: context.invoker(),
        }
    }

    /// Replace the invoker (e.g. to use a custom sleeper)
    pub fn with_invoker(mut self, invoker: ResilientInvoker) -> Self {
        self.invoker = invoker;
        self
    }

    /// The wrapped runtime
    pub fn runtime(&self) -> &R {
        &self.runtime
    }
}

impl<R: ModelRuntime> GuardedRuntime<R> {
    /// Invoke the configured model with `body`
    pub async fn invoke_model(&self, body: JsonValue) -> Result<JsonValue> {
        let request = InvokeModelRequest {
            model_id: self.model_id.clone(),
            body,
        };
        debug!(model_id = %request.model_id, "Invoking model");

        self.invoker
            .invoke(|| self.runtime.invoke_model(&request))
            .await
    }

    /// Invoke the configured model and extract its text
    pub async fn invoke_model_text(&self, body: JsonValue) -> Result<String> {
        let response = self.invoke_model(body).await?;
        Ok(completion_text(&response))
    }
}

impl<R: AgentRuntime> GuardedRuntime<R> {
    /// Agent input combining `prompt`, retrieved passages and `query`
    pub fn agent_input(query: &str, passages: &[RetrievedPassage], prompt: &str) -> String {
        let context: String = passages
            .iter()
            .map(|passage| format!("\n{}", passage.content))
            .collect();
        format!("{prompt}\n\nKnowledge Base Context:\n{context}\n\nQuery Context: {query}")
    }

    /// Ask the configured agent for insights on `query`
    pub async fn agent_insights(
        &self,
        query: &str,
        passages: &[RetrievedPassage],
        prompt: &str,
    ) -> AgentInsights {
        let Some((agent_id, agent_alias_id, session_id)) = &self.agent else {
            return AgentInsights::Failed(
                "agent_id, agent_alias_id and session_id must be configured".to_string(),
            );
        };

        let request = InvokeAgentRequest {
            agent_id: agent_id.clone(),
            agent_alias_id: agent_alias_id.clone(),
            session_id: session_id.clone(),
            input_text: Self::agent_input(query, passages, prompt),
        };
        debug!(agent_id = %request.agent_id, "Invoking agent");

        match self
            .invoker
            .invoke(|| self.runtime.invoke_agent(&request))
            .await
        {
            Ok(chunks) => AgentInsights::Completed(collect_completion(&chunks)),
            Err(err) if err.is_code(RESOURCE_NOT_FOUND) => AgentInsights::AgentNotFound,
            Err(err) => {
                error!(error = %err, "Error getting agent insights");
                AgentInsights::Failed(err.to_string())
            }
        }
    }
}

/// Concatenate agent chunks into a trimmed completion
pub fn collect_completion(chunks: &[AgentChunk]) -> String {
    let bytes: Vec<u8> = chunks
        .iter()
        .flat_map(|chunk| chunk.bytes.iter().copied())
        .collect();
    String::from_utf8_lossy(&bytes).trim().to_string()
}

/// Text of a model response body
///
/// Understands, in order: `content` as a string or as an array of text
/// blocks, `output.message.content` blocks, and a `completion` string.
/// Returns an empty string for anything else.
pub fn completion_text(body: &JsonValue) -> String {
    if let Some(content) = body.get("content") {
        return blocks_text(content);
    }
    if let Some(content) = body.pointer("/output/message/content") {
        return blocks_text(content);
    }
    body.get("completion")
        .and_then(JsonValue::as_str)
        .unwrap_or_default()
        .to_string()
}

fn blocks_text(content: &JsonValue) -> String {
    match content {
        JsonValue::String(text) => text.clone(),
        JsonValue::Array(blocks) => blocks
            .iter()
            .filter_map(|block| block.get("text").and_then(JsonValue::as_str))
            .collect::<Vec<_>>()
            .join(""),
        _ => String::new(),
    }
}
