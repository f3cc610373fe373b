//! Knowledge-base retrieval

use crate::context::ServiceContext;
use crate::error::{ContextError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use throttleguard_core::invoker::ResilientInvoker;
use tracing::{debug, error};

/// A vector-search retrieval request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrieveRequest {
    /// Knowledge base to search
    pub knowledge_base_id: String,
    /// Retrieval query text
    pub text: String,
    /// Maximum passages to return
    pub number_of_results: u32,
}

/// One passage returned by retrieval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedPassage {
    /// Passage text
    #[serde(default)]
    pub content: String,
    /// Relevance score
    #[serde(default)]
    pub score: f64,
    /// Source location, as reported by the service
    #[serde(default)]
    pub location: JsonValue,
}

/// Retrieval response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrieveResponse {
    /// Passages ordered by relevance
    #[serde(default, rename = "retrievalResults")]
    pub results: Vec<RetrievedPassage>,
}

/// A client able to query a knowledge base
#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    /// Run one retrieval call
    async fn retrieve(&self, request: &RetrieveRequest) -> Result<RetrieveResponse>;
}

/// Knowledge-base client whose calls are retried on throttling
#[derive(Debug)]
pub struct GuardedKnowledgeBase<K> {
    client: K,
    knowledge_base_id: String,
    number_of_results: u32,
    invoker: ResilientInvoker,
}

impl<K: KnowledgeBase> GuardedKnowledgeBase<K> {
    /// Wrap `client` using the knowledge base and retry budget from `context`
    pub fn new(client: K, context: &ServiceContext) -> std::result::Result<Self, ContextError> {
        Ok(Self {
            client,
            knowledge_base_id: context.require_knowledge_base()?.to_string(),
            number_of_results: context.number_of_results,
            invoker: context.invoker(),
        })
    }

    /// Replace the invoker (e.g. to use a custom sleeper)
    pub fn with_invoker(mut self, invoker: ResilientInvoker) -> Self {
        self.invoker = invoker;
        self
    }

    /// The wrapped client
    pub fn client(&self) -> &K {
        &self.client
    }

    /// Query text sent to the knowledge base for `query` under `prompt`
    pub fn request_text(query: &str, prompt: &str) -> String {
        format!("{prompt}\n\nContext: {query}")
    }

    /// Retrieve passages, returning the final error if retries do not help
    pub async fn try_query(&self, query: &str, prompt: &str) -> Result<Vec<RetrievedPassage>> {
        let request = RetrieveRequest {
            knowledge_base_id: self.knowledge_base_id.clone(),
            text: Self::request_text(query, prompt),
            number_of_results: self.number_of_results,
        };
        debug!(knowledge_base_id = %request.knowledge_base_id, "Querying knowledge base");

        let response = self
            .invoker
            .invoke(|| self.client.retrieve(&request))
            .await?;
        Ok(response.results)
    }

    /// Retrieve passages, falling back to no passages on failure
    pub async fn query(&self, query: &str, prompt: &str) -> Vec<RetrievedPassage> {
        match self.try_query(query, prompt).await {
            Ok(results) => results,
            Err(err) => {
                error!(error = %err, "Error querying knowledge base");
                Vec::new()
            }
        }
    }
}
