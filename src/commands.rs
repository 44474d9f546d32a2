use chrono::Utc;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::agent::NexusAgent;
use crate::command::{NexusCommand, NexusReport, ReportType};
use crate::error::{NexusError, Result};

/// Command handler result
pub type CommandResult = Result<Value>;

impl NexusAgent {
    /// Handle one command and wrap the outcome in a report.
    pub fn handle_command(&mut self, cmd: &NexusCommand) -> NexusReport {
        info!(
            command = %cmd.command,
            request_id = %cmd.request_id,
            "received command"
        );

        let result = match cmd.command.as_str() {
            "ping" => self.handle_ping(cmd),
            "process" => self.handle_process(cmd),
            "grok" => self.handle_grok(cmd),
            "build_graph" => self.handle_build_graph(cmd),
            "integrate_facts" => self.handle_integrate_facts(cmd),
            "get_facts" => self.handle_get_facts(cmd),
            "causal_chain" => self.handle_causal_chain(cmd),
            "get_context" => self.handle_get_context(cmd),
            "list_contexts" => self.handle_list_contexts(cmd),
            "clear_context" => self.handle_clear_context(cmd),
            "health" => self.handle_health(cmd),
            _ => {
                warn!(command = %cmd.command, "unknown command");
                Err(NexusError::UnknownCommand(cmd.command.clone()))
            }
        };

        self.metrics.record(&cmd.command, result.is_ok());
        let (report_type, payload) = match result {
            Ok(response) => (ReportType::Result, response),
            Err(e) => {
                warn!(request_id = %cmd.request_id, error = %e, "command failed");
                (
                    ReportType::Error,
                    json!({
                        "error": e.to_string(),
                        "request_id": cmd.request_id
                    }),
                )
            }
        };

        NexusReport {
            agent_id: self.config.agent_id.clone(),
            request_id: cmd.request_id.clone(),
            report_type,
            payload,
            timestamp: Utc::now(),
        }
    }

    fn handle_ping(&self, _cmd: &NexusCommand) -> CommandResult {
        Ok(json!({"pong": true}))
    }

    fn handle_process(&mut self, cmd: &NexusCommand) -> CommandResult {
        let command = cmd.str_field("command")?;
        let context_id = self.resolve_context(cmd.opt_str_field("context_id")?).to_string();
        let output = self.orchestrator.process(command, &context_id);
        Ok(json!({
            "output": output,
            "context_id": context_id
        }))
    }

    fn handle_grok(&mut self, cmd: &NexusCommand) -> CommandResult {
        let command = cmd.str_field("command")?;
        let context_id = cmd.opt_str_field("context_id")?;
        let result = self.grok(command, context_id);
        Ok(serde_json::to_value(result)?)
    }

    fn handle_build_graph(&mut self, cmd: &NexusCommand) -> CommandResult {
        let command = cmd.str_field("command")?;
        let report = self.causal.build_graph(command);
        self.metrics.set_custom("graph_coherence", report.coherence);
        Ok(serde_json::to_value(report)?)
    }

    fn handle_integrate_facts(&mut self, cmd: &NexusCommand) -> CommandResult {
        let facts = cmd
            .payload
            .get("facts")
            .ok_or_else(|| NexusError::InvalidInput("missing 'facts'".to_string()))?;
        let ids = self.causal.integrate_facts(facts)?;
        Ok(json!({
            "status": "integrated",
            "facts_processed": ids.len(),
            "ids": ids,
            "attribution": self.config.attribution
        }))
    }

    fn handle_get_facts(&self, _cmd: &NexusCommand) -> CommandResult {
        Ok(serde_json::to_value(self.causal.get_facts()?)?)
    }

    fn handle_causal_chain(&self, cmd: &NexusCommand) -> CommandResult {
        let start = cmd.str_field("start")?;
        let max_depth = cmd
            .opt_usize_field("max_depth")?
            .unwrap_or(self.config.max_chain_depth);
        let chains = self.causal.causal_chain(start, max_depth);
        Ok(json!({
            "start": start,
            "max_depth": max_depth,
            "chains": chains
        }))
    }

    fn handle_get_context(&self, cmd: &NexusCommand) -> CommandResult {
        let context_id = cmd.str_field("context_id")?;
        Ok(match self.orchestrator.get_context(context_id) {
            Some(context) => json!({"found": true, "context": context}),
            None => json!({"found": false, "context_id": context_id}),
        })
    }

    fn handle_list_contexts(&self, _cmd: &NexusCommand) -> CommandResult {
        Ok(serde_json::to_value(self.orchestrator.list_contexts())?)
    }

    fn handle_clear_context(&mut self, cmd: &NexusCommand) -> CommandResult {
        let context_id = cmd.str_field("context_id")?;
        let cleared = self.orchestrator.clear_context(context_id);
        if cleared {
            info!(context_id = %context_id, "context cleared");
        }
        Ok(json!({"cleared": cleared, "context_id": context_id}))
    }

    fn handle_health(&self, _cmd: &NexusCommand) -> CommandResult {
        Ok(json!({
            "status": "healthy",
            "agent_id": self.config.agent_id,
            "components": {
                "orchestrator": "active",
                "causal_agent": "active",
                "coherence": self.causal.coherence()
            },
            "metrics": self.metrics,
            "success_rate": self.metrics.success_rate(),
            "timestamp": Utc::now()
        }))
    }
}
