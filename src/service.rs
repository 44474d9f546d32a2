//! Shared handle over a [`NexusAgent`].
//!
//! Every mutating operation takes the write lock, so context counters and graph
//! inserts are serialized. Queries take the read lock and may overlap with each
//! other, never with a write.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use crate::agent::{GrokResult, NexusAgent};
use crate::causal::{FactsSnapshot, GraphReport};
use crate::command::{NexusCommand, NexusReport};
use crate::config::Config;
use crate::context::{Context, ContextListing};
use crate::error::Result;
use crate::graph::ChainStep;

#[derive(Clone)]
pub struct SharedNexus {
    inner: Arc<RwLock<NexusAgent>>,
}

impl SharedNexus {
    pub fn new(agent: NexusAgent) -> Self {
        Self {
            inner: Arc::new(RwLock::new(agent)),
        }
    }

    pub fn from_config(config: Config) -> Self {
        Self::new(NexusAgent::new(config))
    }

    pub async fn process(&self, command: &str, context_id: Option<&str>) -> Vec<String> {
        let mut agent = self.inner.write().await;
        let context_id = agent.resolve_context(context_id).to_string();
        agent.orchestrator.process(command, &context_id)
    }

    pub async fn grok(&self, command: &str, context_id: Option<&str>) -> GrokResult {
        self.inner.write().await.grok(command, context_id)
    }

    pub async fn build_graph(&self, command: &str) -> GraphReport {
        self.inner.write().await.causal.build_graph(command)
    }

    pub async fn integrate_facts(&self, facts: &Value) -> Result<Vec<String>> {
        self.inner.write().await.causal.integrate_facts(facts)
    }

    pub async fn clear_context(&self, context_id: &str) -> bool {
        self.inner.write().await.orchestrator.clear_context(context_id)
    }

    /// Dispatch a command envelope. Counts toward metrics, so it writes.
    pub async fn handle(&self, cmd: &NexusCommand) -> NexusReport {
        self.inner.write().await.handle_command(cmd)
    }

    pub async fn get_facts(&self) -> Result<FactsSnapshot> {
        self.inner.read().await.causal.get_facts()
    }

    pub async fn causal_chain(&self, start: &str, max_depth: Option<usize>) -> Vec<Vec<ChainStep>> {
        let agent = self.inner.read().await;
        let depth = max_depth.unwrap_or(agent.config.max_chain_depth);
        agent.causal.causal_chain(start, depth)
    }

    pub async fn get_context(&self, context_id: &str) -> Option<Context> {
        self.inner
            .read()
            .await
            .orchestrator
            .get_context(context_id)
            .cloned()
    }

    pub async fn list_contexts(&self) -> ContextListing {
        self.inner.read().await.orchestrator.list_contexts()
    }
}
