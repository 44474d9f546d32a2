//! Keyword rules linking a command to the seed facts.
//!
//! Every rule is checked against the lower-cased command; all matching rules
//! fire, in table order.

use serde::{Deserialize, Serialize};

/// Relation label carried on an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Temporal,
    Action,
    System,
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Temporal => "temporal",
            Self::Action => "action",
            Self::System => "system",
        }
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `(keywords, target fact, relation)`: fires when any keyword is a substring.
#[derive(Debug, Clone, Copy)]
pub struct RelationRule {
    pub keywords: &'static [&'static str],
    pub target: &'static str,
    pub relation: Relation,
}

impl RelationRule {
    fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k))
    }
}

pub const RELATION_RULES: &[RelationRule] = &[
    RelationRule {
        keywords: &["birthday", "date"],
        target: "mom_birthday",
        relation: Relation::Temporal,
    },
    RelationRule {
        keywords: &["move", "plan", "gym", "sf"],
        target: "gym_move",
        relation: Relation::Action,
    },
    RelationRule {
        keywords: &["ecosystem", "bind", "nexus", "4d"],
        target: "ecosystem_bind",
        relation: Relation::System,
    },
];

/// Classify a command into `(target fact id, relation)` links.
pub fn classify_relations(command: &str) -> Vec<(&'static str, Relation)> {
    let lowered = command.to_lowercase();
    RELATION_RULES
        .iter()
        .filter(|rule| rule.matches(&lowered))
        .map(|rule| (rule.target, rule.relation))
        .collect()
}
