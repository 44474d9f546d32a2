//! Rule-based command decomposition.
//!
//! A classified command starts from its category's base steps, then gains
//! temporal, causal and spatial additions in that order. Each addition rule is
//! independent; every rule whose trigger matches appends its items, duplicates
//! included. Generic commands get templated steps that quote the command.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classifier::{classify_command, CommandKind};

/// Dimension an addition rule expands along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Temporal,
    Causal,
    Spatial,
}

/// `(dimension, triggers, items)`: appends `items` when any trigger is a substring.
#[derive(Debug, Clone, Copy)]
pub struct ExpansionRule {
    pub dimension: Dimension,
    pub triggers: &'static [&'static str],
    pub items: &'static [&'static str],
}

const PLANNING_BASE: &[&str] = &[
    "Break down into actionable steps",
    "Identify dependencies and resources",
    "Create timeline and milestones",
    "Define success criteria",
    "Map potential risks and mitigations",
];

const ANALYSIS_BASE: &[&str] = &[
    "Gather relevant information",
    "Identify key factors and variables",
    "Analyze relationships and patterns",
    "Draw conclusions and insights",
    "Provide recommendations",
];

const INTEGRATION_BASE: &[&str] = &[
    "Map existing ecosystem components",
    "Identify integration points",
    "Define data flow and interfaces",
    "Plan migration strategy",
    "Test integration scenarios",
];

const TEMPORAL_BASE: &[&str] = &[
    "Establish time-based relationships",
    "Create temporal sequences",
    "Map cause-effect chains",
    "Define temporal constraints",
    "Plan scheduling and timing",
];

/// Applied in table order, which is dimension order.
pub const EXPANSION_RULES: &[ExpansionRule] = &[
    ExpansionRule {
        dimension: Dimension::Temporal,
        triggers: &["birthday"],
        items: &["Schedule around 2025-05-27", "Plan celebration activities"],
    },
    ExpansionRule {
        dimension: Dimension::Temporal,
        triggers: &["move", "relocate", "transfer"],
        items: &["Create moving timeline", "Schedule packing and transportation"],
    },
    ExpansionRule {
        dimension: Dimension::Temporal,
        triggers: &["gym"],
        items: &[
            "Research gym membership options",
            "Schedule gym visits and routines",
        ],
    },
    ExpansionRule {
        dimension: Dimension::Causal,
        triggers: &["ecosystem", "bind"],
        items: &[
            "Map current ecosystem state",
            "Identify binding requirements",
            "Establish causal relationships",
            "Test binding integrity",
        ],
    },
    ExpansionRule {
        dimension: Dimension::Causal,
        triggers: &["facts"],
        items: &[
            "Verify fact accuracy",
            "Establish fact relationships",
            "Integrate with existing knowledge",
            "Update causal graph",
        ],
    },
    ExpansionRule {
        dimension: Dimension::Spatial,
        triggers: &["sf", "san francisco"],
        items: &[
            "Research SF neighborhoods",
            "Map commute routes",
            "Locate essential services",
            "Plan area exploration",
        ],
    },
    ExpansionRule {
        dimension: Dimension::Spatial,
        triggers: &["move"],
        items: &[
            "Assess space requirements",
            "Plan furniture placement",
            "Map utility connections",
            "Design room layouts",
        ],
    },
];

/// Classification plus the ordered subtasks it expanded into
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decomposition {
    pub kind: CommandKind,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DecompositionEngine;

impl DecompositionEngine {
    pub fn new() -> Self {
        Self
    }

    /// Fixed five-step base list for a non-generic category.
    pub fn base_rules(kind: CommandKind) -> Option<&'static [&'static str]> {
        match kind {
            CommandKind::Planning => Some(PLANNING_BASE),
            CommandKind::Analysis => Some(ANALYSIS_BASE),
            CommandKind::Integration => Some(INTEGRATION_BASE),
            CommandKind::Temporal => Some(TEMPORAL_BASE),
            CommandKind::Generic => None,
        }
    }

    /// Classify and expand a command. Never returns an empty list.
    pub fn decompose(&self, command: &str) -> Decomposition {
        let kind = classify_command(command);
        let items = match Self::base_rules(kind) {
            Some(base) => {
                let lowered = command.to_lowercase();
                let mut items: Vec<String> = base.iter().map(|s| s.to_string()).collect();
                for rule in EXPANSION_RULES {
                    if rule.triggers.iter().any(|t| lowered.contains(t)) {
                        debug!(dimension = ?rule.dimension, added = rule.items.len(), "expansion rule fired");
                        items.extend(rule.items.iter().map(|s| s.to_string()));
                    }
                }
                items
            }
            None => generic_decomposition(command),
        };
        Decomposition { kind, items }
    }
}

fn generic_decomposition(command: &str) -> Vec<String> {
    vec![
        format!("Analyze: {}", command),
        format!("Break down requirements for: {}", command),
        format!("Identify resources needed for: {}", command),
        format!("Create action plan for: {}", command),
        format!("Define success metrics for: {}", command),
    ]
}
