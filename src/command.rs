//! JSON command envelope exchanged with whatever transport sits in front of
//! the agent.
//!
//! ```json
//! {"command": "process", "payload": {"command": "plan SF move", "context_id": "ctxA"}, "request_id": "r1"}
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{NexusError, Result};

/// Request handed to the agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NexusCommand {
    pub command: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(default = "new_request_id")]
    pub request_id: String,
}

fn new_request_id() -> String {
    Uuid::new_v4().to_string()
}

impl NexusCommand {
    pub fn new(command: impl Into<String>, payload: Value) -> Self {
        Self {
            command: command.into(),
            payload,
            request_id: new_request_id(),
        }
    }

    /// Required string field of the payload.
    pub fn str_field(&self, key: &str) -> Result<&str> {
        match self.payload.get(key) {
            Some(Value::String(s)) => Ok(s),
            Some(_) => Err(NexusError::InvalidInput(format!("'{}' must be a string", key))),
            None => Err(NexusError::InvalidInput(format!("missing '{}'", key))),
        }
    }

    /// Optional string field; present but non-string is still an error.
    pub fn opt_str_field(&self, key: &str) -> Result<Option<&str>> {
        match self.payload.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(_) => Err(NexusError::InvalidInput(format!("'{}' must be a string", key))),
        }
    }

    /// Optional non-negative integer field.
    pub fn opt_usize_field(&self, key: &str) -> Result<Option<usize>> {
        match self.payload.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => v
                .as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .map(Some)
                .ok_or_else(|| {
                    NexusError::InvalidInput(format!("'{}' must be a non-negative integer", key))
                }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    Result,
    Error,
}

/// Response to one command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NexusReport {
    pub agent_id: String,
    pub request_id: String,
    pub report_type: ReportType,
    pub payload: Value,
    pub timestamp: DateTime<Utc>,
}

impl NexusReport {
    pub fn is_error(&self) -> bool {
        self.report_type == ReportType::Error
    }
}

/// Parse an incoming message as a NexusCommand
pub fn parse_command(payload: &[u8]) -> Result<NexusCommand> {
    Ok(serde_json::from_slice(payload)?)
}
