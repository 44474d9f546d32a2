use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{NexusError, Result};

/// Attribution stamped on command nodes and on facts that arrive without one.
pub const DEFAULT_ATTRIBUTION: &str = "@AxiomHive @devdollzai";

/// Kind of knowledge a fact carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactType {
    Temporal,
    Action,
    System,
    Command,
}

impl std::fmt::Display for FactType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Temporal => write!(f, "temporal"),
            Self::Action => write!(f, "action"),
            Self::System => write!(f, "system"),
            Self::Command => write!(f, "command"),
        }
    }
}

/// A typed, timestamped unit of knowledge. Every graph node is a `Fact`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<FactType>,
    #[serde(default)]
    pub attribution: String,
    /// Fields an integrated record carried beyond the known ones.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Fact {
    /// Node materialized for an edge target that was never registered.
    pub fn placeholder(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: String::new(),
            timestamp: None,
            kind: None,
            attribution: String::new(),
            extra: Map::new(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.timestamp.is_none() && self.kind.is_none() && self.content.is_empty()
    }
}

/// One entry of an `integrate_facts` payload: bare content or a full record.
#[derive(Debug, Clone, PartialEq)]
pub enum FactInput {
    Text(String),
    Record {
        content: String,
        kind: Option<FactType>,
        attribution: Option<String>,
        extra: Map<String, Value>,
    },
}

impl FactInput {
    /// Validate one payload value. Strings become bare content; objects must
    /// carry string `content`/`attribution` and a known `type` when present.
    pub fn from_value(id: &str, value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(Self::Text(s.clone())),
            Value::Object(map) => {
                let mut extra = map.clone();
                let content = match extra.remove("content") {
                    None => String::new(),
                    Some(Value::String(s)) => s,
                    Some(_) => {
                        return Err(NexusError::InvalidInput(format!(
                            "fact '{}': content must be a string",
                            id
                        )))
                    }
                };
                let attribution = match extra.remove("attribution") {
                    None | Some(Value::Null) => None,
                    Some(Value::String(s)) => Some(s),
                    Some(_) => {
                        return Err(NexusError::InvalidInput(format!(
                            "fact '{}': attribution must be a string",
                            id
                        )))
                    }
                };
                let kind = match extra.remove("type") {
                    None | Some(Value::Null) => None,
                    Some(v) => Some(serde_json::from_value(v).map_err(|_| {
                        NexusError::InvalidInput(format!("fact '{}': unknown type", id))
                    })?),
                };
                // Owned by the registry, never taken from the payload.
                extra.remove("id");
                extra.remove("timestamp");
                Ok(Self::Record {
                    content,
                    kind,
                    attribution,
                    extra,
                })
            }
            _ => Err(NexusError::InvalidInput(format!(
                "fact '{}' must be a string or an object",
                id
            ))),
        }
    }

    /// Normalize into a stored fact stamped with `now`.
    pub fn into_fact(self, id: &str, now: DateTime<Utc>, default_attribution: &str) -> Fact {
        match self {
            Self::Text(content) => Fact {
                id: id.to_string(),
                content,
                timestamp: Some(now),
                kind: None,
                attribution: default_attribution.to_string(),
                extra: Map::new(),
            },
            Self::Record {
                content,
                kind,
                attribution,
                extra,
            } => Fact {
                id: id.to_string(),
                content,
                timestamp: Some(now),
                kind,
                attribution: attribution.unwrap_or_else(|| default_attribution.to_string()),
                extra,
            },
        }
    }
}

/// The three facts every fresh graph starts with.
pub fn seed_facts() -> Vec<Fact> {
    let seeded_at = Utc.with_ymd_and_hms(2025, 9, 20, 0, 0, 0).single();
    let seed = |id: &str, content: &str, kind: FactType, attribution: &str| Fact {
        id: id.to_string(),
        content: content.to_string(),
        timestamp: seeded_at,
        kind: Some(kind),
        attribution: attribution.to_string(),
        extra: Map::new(),
    };

    vec![
        seed(
            "mom_birthday",
            "Mom's birthday is 2025-05-27",
            FactType::Temporal,
            "@AxiomHive",
        ),
        seed(
            "gym_move",
            "Planning gym membership and SF move",
            FactType::Action,
            "@devdollzai",
        ),
        seed(
            "ecosystem_bind",
            "AxiomHive ecosystem binding active",
            FactType::System,
            "@AxiomHive @devdollzai",
        ),
    ]
}
