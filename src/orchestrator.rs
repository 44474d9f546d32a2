use chrono::Utc;
use tracing::debug;

use crate::context::{Context, ContextListing, ContextStore};
use crate::decompose::{Decomposition, DecompositionEngine};

/// Context used when the caller names none
pub const DEFAULT_CONTEXT_ID: &str = "default";

/// Decomposes commands and tracks per-context progress.
///
/// A context goes from absent to active on its first `process` call, stays
/// active across later calls, and only returns to absent through
/// `clear_context`.
#[derive(Debug, Clone, Default)]
pub struct Orchestrator {
    contexts: ContextStore,
    engine: DecompositionEngine,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decompose `command` under `context_id`, updating that context's
    /// counters and coherence.
    pub fn process(&mut self, command: &str, context_id: &str) -> Vec<String> {
        self.process_detailed(command, context_id).items
    }

    /// Like [`Orchestrator::process`] but also returns the classification.
    pub fn process_detailed(&mut self, command: &str, context_id: &str) -> Decomposition {
        let context = self.contexts.get_or_create(context_id);
        context.record_command(command, Utc::now());

        let decomposition = self.engine.decompose(command);
        let coherence = context.update_coherence(decomposition.items.len());

        debug!(
            context_id = %context_id,
            kind = %decomposition.kind,
            items = decomposition.items.len(),
            commands_processed = context.commands_processed,
            coherence,
            "command decomposed"
        );
        decomposition
    }

    pub fn get_context(&self, context_id: &str) -> Option<&Context> {
        self.contexts.get(context_id)
    }

    pub fn list_contexts(&self) -> ContextListing {
        self.contexts.list()
    }

    pub fn clear_context(&mut self, context_id: &str) -> bool {
        self.contexts.clear(context_id)
    }
}
