pub mod agent;
pub mod causal;
pub mod classifier;
pub mod command;
pub mod commands;
pub mod config;
pub mod context;
pub mod decompose;
pub mod error;
pub mod facts;
pub mod graph;
pub mod metrics;
pub mod orchestrator;
pub mod relation;
pub mod service;

pub use error::{NexusError, Result};
