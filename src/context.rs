use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-session accumulator of command count and latest coherence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub commands_processed: u64,
    pub last_command: String,
    pub last_processed_at: DateTime<Utc>,
    pub coherence_score: f64,
}

impl Context {
    fn new(id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: id.to_string(),
            created_at: now,
            commands_processed: 0,
            last_command: String::new(),
            last_processed_at: now,
            coherence_score: 0.0,
        }
    }

    /// Count one more command against this context.
    pub fn record_command(&mut self, command: &str, now: DateTime<Utc>) {
        self.commands_processed += 1;
        self.last_command = command.to_string();
        self.last_processed_at = now;
    }

    /// `round(min(commands * items / 10, 1.0), 3)`
    pub fn update_coherence(&mut self, items: usize) -> f64 {
        let raw = (self.commands_processed as f64 * items as f64 / 10.0).min(1.0);
        self.coherence_score = (raw * 1000.0).round() / 1000.0;
        self.coherence_score
    }
}

/// All contexts plus a snapshot time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextListing {
    pub contexts: BTreeMap<String, Context>,
    pub total_contexts: usize,
    pub timestamp: DateTime<Utc>,
}

/// Contexts by id. Created on first use, dropped only by `clear`.
#[derive(Debug, Clone, Default)]
pub struct ContextStore {
    contexts: BTreeMap<String, Context>,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing context, or a fresh one registered under `id`.
    pub fn get_or_create(&mut self, id: &str) -> &mut Context {
        self.contexts
            .entry(id.to_string())
            .or_insert_with(|| Context::new(id, Utc::now()))
    }

    pub fn get(&self, id: &str) -> Option<&Context> {
        self.contexts.get(id)
    }

    pub fn list(&self) -> ContextListing {
        ContextListing {
            contexts: self.contexts.clone(),
            total_contexts: self.contexts.len(),
            timestamp: Utc::now(),
        }
    }

    /// Remove a context. Returns whether it existed.
    pub fn clear(&mut self, id: &str) -> bool {
        self.contexts.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}
