#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Throttling-guarded clients for a managed generative-AI service.
//!
//! The service exposes two call shapes: retrieval from a knowledge base and
//! model (or agent) invocation. This crate describes both as traits so the
//! caller can plug in whichever SDK client it owns, and routes every call
//! through [`ResilientInvoker`](throttleguard_core::invoker::ResilientInvoker).
//!
//! ## Example
//!
//! ```rust,no_run
//! use throttleguard_bedrock::{GuardedKnowledgeBase, KnowledgeBase, ServiceContext};
//!
//! # async fn example<K: KnowledgeBase>(client: K) -> Result<(), Box<dyn std::error::Error>> {
//! let context = ServiceContext::load("throttleguard.toml")?;
//! let kb = GuardedKnowledgeBase::new(client, &context)?;
//!
//! // Empty on failure; the error is logged.
//! let passages = kb.query("Q4 performance", "Summarize the plan").await;
//! println!("{} passages", passages.len());
//! # Ok(())
//! # }
//! ```
//!
//! Session and credential setup stay with the caller: the context object
//! only names the resources to call.

pub mod context;
pub mod error;
pub mod knowledge_base;
pub mod runtime;

pub use context::ServiceContext;
pub use error::{BedrockError, ContextError, Result};
pub use knowledge_base::{
    GuardedKnowledgeBase, KnowledgeBase, RetrieveRequest, RetrieveResponse, RetrievedPassage,
};
pub use runtime::{
    AgentChunk, AgentInsights, AgentRuntime, GuardedRuntime, InvokeAgentRequest,
    InvokeModelRequest, ModelRuntime, collect_completion, completion_text,
};
