//! Error type shared by the graph store, the orchestrator and the command layer.

/// Errors surfaced at the nexus boundary.
///
/// Soft misses (unknown context, unknown chain start) are not errors; they come
/// back as `None` or an empty list.
#[derive(Debug, thiserror::Error)]
pub enum NexusError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NexusError>;
