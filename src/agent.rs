use serde::{Deserialize, Serialize};
use tracing::info;

use crate::causal::CausalAgent;
use crate::classifier::CommandKind;
use crate::config::Config;
use crate::facts::seed_facts;
use crate::graph::FactGraphStore;
use crate::metrics::Metrics;
use crate::orchestrator::Orchestrator;

/// Combined decomposition + graph result for one command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrokResult {
    pub output: Vec<String>,
    pub kind: CommandKind,
    pub context_id: String,
    pub context_coherence: f64,
    pub coherence: f64,
    pub attribution: String,
}

/// Owner of all nexus state: contexts, the fact graph and command metrics.
pub struct NexusAgent {
    pub config: Config,
    pub orchestrator: Orchestrator,
    pub causal: CausalAgent,
    pub metrics: Metrics,
}

impl NexusAgent {
    /// Create a new agent
    pub fn new(config: Config) -> Self {
        let store = if config.seed_facts {
            FactGraphStore::with_facts(seed_facts())
        } else {
            FactGraphStore::new()
        };
        let causal = CausalAgent::with_store(store, config.attribution.clone());

        info!(
            agent_id = %config.agent_id,
            nodes = causal.store().node_count(),
            "nexus agent initialized"
        );

        Self {
            config,
            orchestrator: Orchestrator::new(),
            causal,
            metrics: Metrics::new(),
        }
    }

    /// `context_id`, or the configured default when absent.
    pub fn resolve_context<'a>(&'a self, context_id: Option<&'a str>) -> &'a str {
        context_id.unwrap_or(&self.config.default_context_id)
    }

    /// Decompose the command under its context, then link it into the graph.
    pub fn grok(&mut self, command: &str, context_id: Option<&str>) -> GrokResult {
        let context_id = self.resolve_context(context_id).to_string();
        let decomposition = self.orchestrator.process_detailed(command, &context_id);
        let graph = self.causal.build_graph(command);

        let context_coherence = self
            .orchestrator
            .get_context(&context_id)
            .map(|ctx| ctx.coherence_score)
            .unwrap_or_default();
        self.metrics.set_custom("graph_coherence", graph.coherence);

        GrokResult {
            output: decomposition.items,
            kind: decomposition.kind,
            context_id,
            context_coherence,
            coherence: graph.coherence,
            attribution: self.config.attribution.clone(),
        }
    }
}
