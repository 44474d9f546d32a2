//! In-memory fact graph.
//!
//! Nodes are facts keyed by id and kept in insertion order; edges are keyed by
//! the ordered `(source, target)` pair, so re-linking a pair overwrites its
//! relation instead of adding a parallel edge. Nothing is ever evicted.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::facts::{Fact, FactType};
use crate::relation::{classify_relations, Relation};

/// Number of hex chars kept from a SHA-256 digest for node ids and graph hashes.
/// Only 32 bits of id space: colliding command texts overwrite each other.
pub const SHORT_HASH_LEN: usize = 8;

/// First [`SHORT_HASH_LEN`] hex chars of SHA-256 over `data`.
pub fn short_hash(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    let mut encoded = hex::encode(digest);
    encoded.truncate(SHORT_HASH_LEN);
    encoded
}

/// Content-addressed id for a command node.
pub fn command_node_id(command: &str) -> String {
    short_hash(command.as_bytes())
}

/// Node/edge counts plus coherence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    pub coherence: f64,
}

/// One outgoing edge as seen from its source node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingRelation {
    pub target: String,
    pub relation: Relation,
}

/// One step of a causal chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainStep {
    pub node: String,
    pub data: Fact,
    pub outgoing_relations: Vec<OutgoingRelation>,
}

#[derive(Debug, Clone, Default)]
pub struct FactGraphStore {
    nodes: HashMap<String, Fact>,
    order: Vec<String>,
    edges: BTreeMap<(String, String), Relation>,
}

impl FactGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-loaded with the given facts.
    pub fn with_facts(facts: impl IntoIterator<Item = Fact>) -> Self {
        let mut store = Self::new();
        for fact in facts {
            store.upsert(fact);
        }
        store
    }

    /// Insert or overwrite a node. An overwritten node keeps its position.
    pub fn upsert(&mut self, fact: Fact) {
        if !self.nodes.contains_key(&fact.id) {
            self.order.push(fact.id.clone());
        }
        self.nodes.insert(fact.id.clone(), fact);
    }

    /// Add the command as a `command` node, returning its content-addressed id.
    pub fn add_command_node(&mut self, command: &str, attribution: &str) -> String {
        let node_id = command_node_id(command);
        self.upsert(Fact {
            id: node_id.clone(),
            content: command.to_string(),
            timestamp: Some(Utc::now()),
            kind: Some(FactType::Command),
            attribution: attribution.to_string(),
            extra: Default::default(),
        });
        node_id
    }

    /// Add or relabel the `source -> target` edge. Unknown endpoints are
    /// materialized as placeholder nodes.
    pub fn add_edge(&mut self, source: &str, target: &str, relation: Relation) {
        for id in [source, target] {
            if !self.nodes.contains_key(id) {
                debug!(node = %id, "materializing placeholder node");
                self.upsert(Fact::placeholder(id));
            }
        }
        self.edges
            .insert((source.to_string(), target.to_string()), relation);
    }

    /// Link a command node to the facts its text refers to. Returns the links made.
    pub fn link_command(&mut self, node_id: &str, command: &str) -> Vec<(&'static str, Relation)> {
        let links = classify_relations(command);
        for (target, relation) in &links {
            self.add_edge(node_id, target, *relation);
        }
        links
    }

    /// `min(edges / nodes, 1.0)`, or `0.0` below two nodes.
    pub fn coherence(&self) -> f64 {
        let nodes = self.nodes.len();
        if nodes < 2 {
            return 0.0;
        }
        (self.edges.len() as f64 / nodes as f64).min(1.0)
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            nodes: self.node_count(),
            edges: self.edge_count(),
            coherence: self.coherence(),
        }
    }

    /// Short hash of the node-id set in insertion order.
    pub fn graph_hash(&self) -> String {
        short_hash(self.order.join(",").as_bytes())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&Fact> {
        self.nodes.get(id)
    }

    pub fn relation(&self, source: &str, target: &str) -> Option<Relation> {
        self.edges
            .get(&(source.to_string(), target.to_string()))
            .copied()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Fact> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Outgoing edges of `id`, ordered by target id.
    pub fn outgoing(&self, id: &str) -> Vec<OutgoingRelation> {
        self.edges
            .range((id.to_string(), String::new())..)
            .take_while(|((source, _), _)| source == id)
            .map(|((_, target), relation)| OutgoingRelation {
                target: target.clone(),
                relation: *relation,
            })
            .collect()
    }

    /// Shortest path from `start` to every node within `max_depth` hops,
    /// `start` itself included. Empty when `start` is not in the graph.
    pub fn causal_chain(&self, start: &str, max_depth: usize) -> Vec<Vec<ChainStep>> {
        if !self.contains(start) {
            return Vec::new();
        }

        let mut paths: Vec<Vec<String>> = vec![vec![start.to_string()]];
        let mut seen: HashSet<String> = HashSet::from([start.to_string()]);
        let mut queue: VecDeque<usize> = VecDeque::from([0]);

        while let Some(idx) = queue.pop_front() {
            if paths[idx].len() > max_depth {
                continue;
            }
            let tail = paths[idx][paths[idx].len() - 1].clone();
            for edge in self.outgoing(&tail) {
                if seen.insert(edge.target.clone()) {
                    let mut path = paths[idx].clone();
                    path.push(edge.target);
                    paths.push(path);
                    queue.push_back(paths.len() - 1);
                }
            }
        }

        paths
            .into_iter()
            .map(|path| {
                path.into_iter()
                    .filter_map(|id| {
                        let data = self.nodes.get(&id)?.clone();
                        let outgoing_relations = self.outgoing(&id);
                        Some(ChainStep {
                            node: id,
                            data,
                            outgoing_relations,
                        })
                    })
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::{seed_facts, DEFAULT_ATTRIBUTION};

    fn seeded() -> FactGraphStore {
        FactGraphStore::with_facts(seed_facts())
    }

    #[test]
    fn test_coherence_small_graphs() {
        let mut store = FactGraphStore::new();
        assert_eq!(store.coherence(), 0.0);
        store.upsert(Fact::placeholder("only"));
        assert_eq!(store.coherence(), 0.0);
    }

    #[test]
    fn test_coherence_capped_at_one() {
        let mut store = FactGraphStore::new();
        store.add_edge("a", "b", Relation::Action);
        store.add_edge("b", "a", Relation::Action);
        store.add_edge("a", "a", Relation::System);
        assert_eq!(store.node_count(), 2);
        assert_eq!(store.edge_count(), 3);
        assert_eq!(store.coherence(), 1.0);
    }

    #[test]
    fn test_command_node_id_is_sha256_prefix() {
        // sha256("hello") = 2cf24dba5fb0a30e...
        assert_eq!(command_node_id("hello"), "2cf24dba");
        assert_eq!(command_node_id("hello").len(), SHORT_HASH_LEN);
    }

    #[test]
    fn test_add_command_node_idempotent() {
        let mut store = seeded();
        let first = store.add_command_node("plan SF move", DEFAULT_ATTRIBUTION);
        let count = store.node_count();
        let second = store.add_command_node("plan SF move", DEFAULT_ATTRIBUTION);
        assert_eq!(first, second);
        assert_eq!(store.node_count(), count);
        assert_eq!(store.node(&first).unwrap().kind, Some(FactType::Command));
    }

    #[test]
    fn test_edge_overwrite_keeps_single_edge() {
        let mut store = seeded();
        store.add_edge("gym_move", "mom_birthday", Relation::Action);
        store.add_edge("gym_move", "mom_birthday", Relation::Temporal);
        assert_eq!(store.edge_count(), 1);
        assert_eq!(
            store.relation("gym_move", "mom_birthday"),
            Some(Relation::Temporal)
        );
    }

    #[test]
    fn test_dangling_target_is_materialized() {
        let mut store = FactGraphStore::new();
        let id = store.add_command_node("plan a trip", DEFAULT_ATTRIBUTION);
        store.link_command(&id, "plan a trip");
        let target = store.node("gym_move").unwrap();
        assert!(target.is_placeholder());
        assert_eq!(store.node_count(), 2);
        assert_eq!(store.edge_count(), 1);
    }

    #[test]
    fn test_link_plan_sf_move() {
        let mut store = seeded();
        let id = store.add_command_node("plan SF move", DEFAULT_ATTRIBUTION);
        let links = store.link_command(&id, "plan SF move");
        assert_eq!(links, vec![("gym_move", Relation::Action)]);
        assert_eq!(store.relation(&id, "gym_move"), Some(Relation::Action));
        assert_eq!(store.coherence(), 0.25);
    }

    #[test]
    fn test_graph_hash_tracks_node_set() {
        let mut store = seeded();
        let before = store.graph_hash();
        assert_eq!(before.len(), SHORT_HASH_LEN);
        assert!(before.chars().all(|c| c.is_ascii_hexdigit()));

        // overwriting an existing node leaves the id set unchanged
        store.upsert(seed_facts().remove(0));
        assert_eq!(store.graph_hash(), before);

        store.add_command_node("hello", DEFAULT_ATTRIBUTION);
        assert_ne!(store.graph_hash(), before);
    }

    #[test]
    fn test_nodes_keep_insertion_order() {
        let mut store = seeded();
        store.upsert(Fact::placeholder("gym_move"));
        let ids: Vec<&str> = store.nodes().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["mom_birthday", "gym_move", "ecosystem_bind"]);
    }

    #[test]
    fn test_causal_chain_unknown_start() {
        assert!(seeded().causal_chain("nope", 3).is_empty());
    }

    #[test]
    fn test_causal_chain_depth_limit() {
        let mut store = FactGraphStore::new();
        store.add_edge("a", "b", Relation::Action);
        store.add_edge("b", "c", Relation::Temporal);
        store.add_edge("c", "d", Relation::System);

        let chains = store.causal_chain("a", 2);
        let ends: Vec<&str> = chains
            .iter()
            .map(|p| p.last().unwrap().node.as_str())
            .collect();
        assert_eq!(ends, vec!["a", "b", "c"]);
        assert_eq!(chains[2].len(), 3);
        assert_eq!(
            chains[0][0].outgoing_relations,
            vec![OutgoingRelation {
                target: "b".into(),
                relation: Relation::Action
            }]
        );

        assert_eq!(store.causal_chain("a", 0).len(), 1);
        assert_eq!(store.causal_chain("a", 3).len(), 4);
    }

    #[test]
    fn test_causal_chain_shortest_paths_and_cycles() {
        let mut store = FactGraphStore::new();
        store.add_edge("a", "b", Relation::Action);
        store.add_edge("b", "c", Relation::Action);
        store.add_edge("a", "c", Relation::System);
        store.add_edge("c", "a", Relation::Temporal);

        let chains = store.causal_chain("a", 3);
        assert_eq!(chains.len(), 3);
        let to_c = chains
            .iter()
            .find(|p| p.last().unwrap().node == "c")
            .unwrap();
        assert_eq!(to_c.len(), 2);
    }

    #[test]
    fn test_outgoing_only_lists_own_edges() {
        let mut store = FactGraphStore::new();
        store.add_edge("ab", "x", Relation::Action);
        store.add_edge("a", "z", Relation::System);
        store.add_edge("a", "y", Relation::Temporal);
        let targets: Vec<String> = store.outgoing("a").into_iter().map(|o| o.target).collect();
        assert_eq!(targets, vec!["y", "z"]);
    }
}
