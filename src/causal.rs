use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{NexusError, Result};
use crate::facts::{seed_facts, Fact, FactInput, DEFAULT_ATTRIBUTION};
use crate::graph::{ChainStep, FactGraphStore, GraphStats};

/// Chain depth used when a caller does not give one
pub const DEFAULT_CHAIN_DEPTH: usize = 3;

/// Result of linking one command into the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphReport {
    pub coherence: f64,
    pub nodes: usize,
    pub edges: usize,
    pub graph_hash: String,
}

/// Full registry snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactsSnapshot {
    pub facts: serde_json::Map<String, Value>,
    pub graph_stats: GraphStats,
    pub timestamp: DateTime<Utc>,
}

/// Builds the causal fact graph out of incoming commands and integrated facts.
pub struct CausalAgent {
    store: FactGraphStore,
    attribution: String,
}

impl Default for CausalAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl CausalAgent {
    /// Agent over a graph holding the three seed facts.
    pub fn new() -> Self {
        Self::with_store(FactGraphStore::with_facts(seed_facts()), DEFAULT_ATTRIBUTION)
    }

    pub fn with_store(store: FactGraphStore, attribution: impl Into<String>) -> Self {
        Self {
            store,
            attribution: attribution.into(),
        }
    }

    pub fn store(&self) -> &FactGraphStore {
        &self.store
    }

    /// Add the command as a node, link it to the facts it mentions and report
    /// the resulting graph shape.
    pub fn build_graph(&mut self, command: &str) -> GraphReport {
        let node_id = self.store.add_command_node(command, &self.attribution);
        let links = self.store.link_command(&node_id, command);
        let report = GraphReport {
            coherence: self.store.coherence(),
            nodes: self.store.node_count(),
            edges: self.store.edge_count(),
            graph_hash: self.store.graph_hash(),
        };
        debug!(
            node_id = %node_id,
            links = links.len(),
            nodes = report.nodes,
            edges = report.edges,
            coherence = report.coherence,
            "command linked into graph"
        );
        report
    }

    /// Integrate a JSON object of `id -> content | record`. The whole payload
    /// is validated before anything is written. Existing ids are overwritten.
    pub fn integrate_facts(&mut self, payload: &Value) -> Result<Vec<String>> {
        let entries = payload.as_object().ok_or_else(|| {
            NexusError::InvalidInput("facts payload must be a JSON object".to_string())
        })?;

        let inputs = entries
            .iter()
            .map(|(id, value)| -> Result<(String, FactInput)> {
                Ok((id.clone(), FactInput::from_value(id, value)?))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(self.integrate(inputs))
    }

    /// Integrate already-validated inputs, returning their ids in input order.
    pub fn integrate(&mut self, inputs: Vec<(String, FactInput)>) -> Vec<String> {
        let now = Utc::now();
        let mut accepted = Vec::with_capacity(inputs.len());
        for (id, input) in inputs {
            if self.store.contains(&id) {
                debug!(fact_id = %id, "overwriting existing fact");
            }
            self.store.upsert(input.into_fact(&id, now, &self.attribution));
            accepted.push(id);
        }
        info!(count = accepted.len(), "facts integrated");
        accepted
    }

    /// Every node keyed by id, in insertion order.
    pub fn get_facts(&self) -> Result<FactsSnapshot> {
        let facts = self
            .store
            .nodes()
            .map(|fact| -> Result<(String, Value)> {
                Ok((fact.id.clone(), serde_json::to_value(fact)?))
            })
            .collect::<Result<serde_json::Map<_, _>>>()?;
        Ok(FactsSnapshot {
            facts,
            graph_stats: self.store.stats(),
            timestamp: Utc::now(),
        })
    }

    pub fn fact(&self, id: &str) -> Option<&Fact> {
        self.store.node(id)
    }

    pub fn causal_chain(&self, start: &str, max_depth: usize) -> Vec<Vec<ChainStep>> {
        self.store.causal_chain(start, max_depth)
    }

    pub fn coherence(&self) -> f64 {
        self.store.coherence()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relation::Relation;
    use serde_json::json;

    #[test]
    fn test_fresh_agent() {
        let agent = CausalAgent::new();
        let stats = agent.store().stats();
        assert_eq!(stats.nodes, 3);
        assert_eq!(stats.edges, 0);
        assert_eq!(stats.coherence, 0.0);
    }

    #[test]
    fn test_build_graph_without_keywords() {
        let mut agent = CausalAgent::new();
        let report = agent.build_graph("hello");
        assert_eq!(report.nodes, 4);
        assert_eq!(report.edges, 0);
        assert_eq!(report.coherence, 0.0);
        assert_eq!(report.graph_hash.len(), 8);
    }

    #[test]
    fn test_build_graph_plan_sf_move() {
        let mut agent = CausalAgent::new();
        let report = agent.build_graph("plan SF move");
        assert_eq!(report.nodes, 4);
        assert_eq!(report.edges, 1);
        assert_eq!(report.coherence, 0.25);

        let node_id = crate::graph::command_node_id("plan SF move");
        assert_eq!(
            agent.store().relation(&node_id, "gym_move"),
            Some(Relation::Action)
        );
    }

    #[test]
    fn test_build_graph_repeat_is_stable() {
        let mut agent = CausalAgent::new();
        let first = agent.build_graph("bind the ecosystem");
        let second = agent.build_graph("bind the ecosystem");
        assert_eq!(first, second);
    }

    #[test]
    fn test_integrate_and_get_facts() {
        let mut agent = CausalAgent::new();
        let ids = agent.integrate_facts(&json!({"x": "hello"})).unwrap();
        assert_eq!(ids, vec!["x"]);

        let snapshot = agent.get_facts().unwrap();
        assert_eq!(snapshot.facts["x"]["content"], "hello");
        assert_eq!(snapshot.facts["x"]["attribution"], DEFAULT_ATTRIBUTION);
        assert_eq!(snapshot.graph_stats.nodes, 4);
    }

    #[test]
    fn test_integrate_preserves_input_order() {
        let mut agent = CausalAgent::new();
        let ids = agent
            .integrate_facts(&json!({"zeta": "z", "alpha": {"content": "a"}, "mid": "m"}))
            .unwrap();
        assert_eq!(ids, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_integrate_overwrites_seed_fact() {
        let mut agent = CausalAgent::new();
        agent
            .integrate_facts(&json!({"gym_move": {"content": "Gym moved to Oakland", "type": "action"}}))
            .unwrap();
        let fact = agent.fact("gym_move").unwrap();
        assert_eq!(fact.content, "Gym moved to Oakland");
        assert_eq!(fact.attribution, DEFAULT_ATTRIBUTION);
        assert!(fact.timestamp > seed_facts()[1].timestamp);
        assert_eq!(agent.store().node_count(), 3);
    }

    #[test]
    fn test_integrate_text_restamps_existing_fact() {
        let mut agent = CausalAgent::new();
        let seeded_at = agent.fact("gym_move").unwrap().timestamp;
        let before = Utc::now();
        agent.integrate_facts(&json!({"gym_move": "moved"})).unwrap();

        let fact = agent.fact("gym_move").unwrap();
        assert_eq!(fact.content, "moved");
        assert_ne!(fact.timestamp, seeded_at);
        assert!(fact.timestamp >= Some(before));
    }

    #[test]
    fn test_get_facts_includes_command_nodes() {
        let mut agent = CausalAgent::new();
        agent.build_graph("plan SF move");
        let node_id = crate::graph::command_node_id("plan SF move");

        let snapshot = agent.get_facts().unwrap();
        assert_eq!(snapshot.facts.len(), snapshot.graph_stats.nodes);
        assert_eq!(snapshot.facts[&node_id]["type"], "command");
        let ids: Vec<&String> = snapshot.facts.keys().collect();
        assert_eq!(ids.last().map(|id| id.as_str()), Some(node_id.as_str()));
    }

    #[test]
    fn test_integrate_rejects_without_mutation() {
        let mut agent = CausalAgent::new();
        assert!(matches!(
            agent.integrate_facts(&json!(["not", "a", "mapping"])),
            Err(NexusError::InvalidInput(_))
        ));
        // second entry is bad, first must not land
        assert!(agent
            .integrate_facts(&json!({"good": "fine", "bad": 7}))
            .is_err());
        assert!(agent.fact("good").is_none());
        assert_eq!(agent.store().node_count(), 3);
    }

    #[test]
    fn test_causal_chain_from_command() {
        let mut agent = CausalAgent::new();
        agent.build_graph("plan the birthday");
        let node_id = crate::graph::command_node_id("plan the birthday");

        let chains = agent.causal_chain(&node_id, DEFAULT_CHAIN_DEPTH);
        assert_eq!(chains.len(), 3);
        assert_eq!(chains[0].len(), 1);
        assert_eq!(chains[0][0].outgoing_relations.len(), 2);
        assert!(chains.iter().skip(1).all(|path| path.len() == 2));

        assert!(agent.causal_chain("missing", DEFAULT_CHAIN_DEPTH).is_empty());
    }
}
