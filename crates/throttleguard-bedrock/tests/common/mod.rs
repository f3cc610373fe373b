//! Scripted service clients for testing guarded calls without a network
//!
//! Each client pops one queued outcome per call and records every request
//! it receives, so tests can assert both the retry count and the request
//! shape.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::VecDeque;
use std::sync::Mutex;
use throttleguard_bedrock::{
    AgentChunk, AgentRuntime, BedrockError, InvokeAgentRequest, InvokeModelRequest, KnowledgeBase,
    ModelRuntime, Result, RetrieveRequest, RetrieveResponse, RetrievedPassage, ServiceContext,
};
use throttleguard_core::invoker::ResilientInvoker;
use throttleguard_core::testing::RecordingSleeper;

/// Context naming every resource, with the standard 3 / 1s / 20s budget
pub fn full_context() -> ServiceContext {
    ServiceContext {
        knowledge_base_id: Some("KB-TEST".to_string()),
        agent_id: Some("AGENT".to_string()),
        agent_alias_id: Some("ALIAS".to_string()),
        session_id: Some("SESSION".to_string()),
        ..ServiceContext::default()
    }
}

/// Invoker for `context` that records sleeps instead of waiting
pub fn recording_invoker(context: &ServiceContext) -> (ResilientInvoker, RecordingSleeper) {
    let sleeper = RecordingSleeper::new();
    let invoker = context.invoker().with_sleeper(sleeper.clone());
    (invoker, sleeper)
}

pub fn throttled() -> BedrockError {
    BedrockError::service("ThrottlingException", "Rate exceeded")
}

pub fn passage(content: &str, score: f64) -> RetrievedPassage {
    RetrievedPassage {
        content: content.to_string(),
        score,
        location: serde_json::json!({"type": "S3"}),
    }
}

fn pop<T>(queue: &Mutex<VecDeque<Result<T>>>) -> Result<T> {
    queue
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Err(BedrockError::Local("no scripted outcome left".to_string())))
}

#[derive(Debug, Default)]
pub struct ScriptedKnowledgeBase {
    outcomes: Mutex<VecDeque<Result<RetrieveResponse>>>,
    requests: Mutex<Vec<RetrieveRequest>>,
}

impl ScriptedKnowledgeBase {
    pub fn new(outcomes: Vec<Result<RetrieveResponse>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<RetrieveRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl KnowledgeBase for ScriptedKnowledgeBase {
    async fn retrieve(&self, request: &RetrieveRequest) -> Result<RetrieveResponse> {
        self.requests.lock().unwrap().push(request.clone());
        pop(&self.outcomes)
    }
}

#[derive(Debug, Default)]
pub struct ScriptedRuntime {
    model_outcomes: Mutex<VecDeque<Result<JsonValue>>>,
    agent_outcomes: Mutex<VecDeque<Result<Vec<AgentChunk>>>>,
    model_requests: Mutex<Vec<InvokeModelRequest>>,
    agent_requests: Mutex<Vec<InvokeAgentRequest>>,
}

impl ScriptedRuntime {
    pub fn models(outcomes: Vec<Result<JsonValue>>) -> Self {
        Self {
            model_outcomes: Mutex::new(outcomes.into()),
            ..Self::default()
        }
    }

    pub fn agents(outcomes: Vec<Result<Vec<AgentChunk>>>) -> Self {
        Self {
            agent_outcomes: Mutex::new(outcomes.into()),
            ..Self::default()
        }
    }

    pub fn model_requests(&self) -> Vec<InvokeModelRequest> {
        self.model_requests.lock().unwrap().clone()
    }

    pub fn agent_requests(&self) -> Vec<InvokeAgentRequest> {
        self.agent_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelRuntime for ScriptedRuntime {
    async fn invoke_model(&self, request: &InvokeModelRequest) -> Result<JsonValue> {
        self.model_requests.lock().unwrap().push(request.clone());
        pop(&self.model_outcomes)
    }
}

#[async_trait]
impl AgentRuntime for ScriptedRuntime {
    async fn invoke_agent(&self, request: &InvokeAgentRequest) -> Result<Vec<AgentChunk>> {
        self.agent_requests.lock().unwrap().push(request.clone());
        pop(&self.agent_outcomes)
    }
}
