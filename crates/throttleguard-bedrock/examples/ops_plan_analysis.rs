//! Operations-plan analysis against simulated, rate-limited clients
//!
//! This example demonstrates:
//! 1. Building a `ServiceContext` once at the entry point
//! 2. Knowledge-base retrieval that survives throttling
//! 3. Agent insights built on the retrieved passages
//!
//! Run with:
//! ```bash
//! RUST_LOG=throttleguard_core=warn cargo run -p throttleguard-bedrock --example ops_plan_analysis
//! ```

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use throttleguard_bedrock::{
    AgentChunk, AgentInsights, AgentRuntime, BedrockError, GuardedKnowledgeBase, GuardedRuntime,
    InvokeAgentRequest, KnowledgeBase, Result, RetrieveRequest, RetrieveResponse,
    RetrievedPassage, ServiceContext,
};
use tracing_subscriber::EnvFilter;

/// Rejects the first `throttle_first` calls with `ThrottlingException`
struct RateLimitedService {
    calls: AtomicU32,
    throttle_first: u32,
}

impl RateLimitedService {
    fn new(throttle_first: u32) -> Self {
        Self {
            calls: AtomicU32::new(0),
            throttle_first,
        }
    }

    fn admit(&self) -> Result<()> {
        if self.calls.fetch_add(1, Ordering::SeqCst) < self.throttle_first {
            Err(BedrockError::service("ThrottlingException", "Rate exceeded"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl KnowledgeBase for RateLimitedService {
    async fn retrieve(&self, request: &RetrieveRequest) -> Result<RetrieveResponse> {
        self.admit()?;
        let results = ["Grow deposits 4% through digital onboarding", "Consolidate two regional branches"]
            .iter()
            .take(request.number_of_results as usize)
            .enumerate()
            .map(|(i, text)| RetrievedPassage {
                content: text.to_string(),
                score: 0.9 - i as f64 * 0.1,
                location: serde_json::json!({"type": "S3", "uri": format!("s3://plans/ops-{i}.pdf")}),
            })
            .collect();
        Ok(RetrieveResponse { results })
    }
}

#[async_trait]
impl AgentRuntime for RateLimitedService {
    async fn invoke_agent(&self, request: &InvokeAgentRequest) -> Result<Vec<AgentChunk>> {
        self.admit()?;
        Ok(vec![
            AgentChunk::text("Received "),
            AgentChunk::text(format!("{} characters of context.", request.input_text.len())),
        ])
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let context = ServiceContext::from_toml_str(
        r#"
        knowledge_base_id = "KB-DEMO"
        agent_id = "AGENT-DEMO"
        agent_alias_id = "ALIAS-DEMO"
        session_id = "session-demo"

        [retry]
        max_retries = 3
        initial_backoff_secs = 0.2
        max_backoff_secs = 2.0
        "#,
    )?;

    let kb = GuardedKnowledgeBase::new(RateLimitedService::new(2), &context)?;
    let passages = kb
        .query("FY25 operations plan", "Summarize the strategic priorities")
        .await;
    println!("Retrieved {} passages", passages.len());
    for passage in &passages {
        println!("  [{:.2}] {}", passage.score, passage.content);
    }

    let runtime = GuardedRuntime::new(RateLimitedService::new(1), &context);
    match runtime
        .agent_insights("FY25 operations plan", &passages, "Identify risks")
        .await
    {
        AgentInsights::Completed(text) => println!("Insights: {text}"),
        AgentInsights::AgentNotFound => println!("Agent not found. Please verify the agent ID."),
        AgentInsights::Failed(reason) => println!("Error getting agent insights: {reason}"),
    }

    Ok(())
}
