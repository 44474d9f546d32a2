use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::causal::DEFAULT_CHAIN_DEPTH;
use crate::error::{NexusError, Result};
use crate::facts::DEFAULT_ATTRIBUTION;
use crate::orchestrator::DEFAULT_CONTEXT_ID;

/// Agent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Unique agent identifier
    pub agent_id: String,

    /// Context used for commands that do not name one
    #[serde(default = "default_context_id")]
    pub default_context_id: String,

    /// Attribution stamped on command nodes and unattributed facts
    #[serde(default = "default_attribution")]
    pub attribution: String,

    /// Start the graph with the three seed facts
    #[serde(default = "default_seed_facts")]
    pub seed_facts: bool,

    /// Hop limit for causal chains when a request gives none
    #[serde(default = "default_max_chain_depth")]
    pub max_chain_depth: usize,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_context_id() -> String {
    DEFAULT_CONTEXT_ID.to_string()
}

fn default_attribution() -> String {
    DEFAULT_ATTRIBUTION.to_string()
}

fn default_seed_facts() -> bool {
    true
}

fn default_max_chain_depth() -> usize {
    DEFAULT_CHAIN_DEPTH
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self::with_agent_id("nexus".to_string())
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| NexusError::Config(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_toml(&content)?;
        info!(agent_id = %config.agent_id, path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Parse and validate a TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| NexusError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Default configuration under the given agent id
    pub fn with_agent_id(agent_id: String) -> Self {
        Self {
            agent_id,
            default_context_id: default_context_id(),
            attribution: default_attribution(),
            seed_facts: default_seed_facts(),
            max_chain_depth: default_max_chain_depth(),
            log_level: default_log_level(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.agent_id.trim().is_empty() {
            return Err(NexusError::Config("agent_id must not be empty".to_string()));
        }
        self.tracing_level()?;
        Ok(())
    }

    /// `log_level` as a tracing level
    pub fn tracing_level(&self) -> Result<tracing::Level> {
        self.log_level
            .parse()
            .map_err(|_| NexusError::Config(format!("unknown log level '{}'", self.log_level)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.default_context_id, "default");
        assert_eq!(config.attribution, DEFAULT_ATTRIBUTION);
        assert!(config.seed_facts);
        assert_eq!(config.max_chain_depth, 3);
        assert_eq!(config.tracing_level().unwrap(), tracing::Level::INFO);
    }

    #[test]
    fn test_minimal_toml_fills_defaults() {
        let config = Config::from_toml("agent_id = \"hive\"\n").unwrap();
        assert_eq!(config.agent_id, "hive");
        assert_eq!(config.default_context_id, "default");
        assert_eq!(config.max_chain_depth, 3);
    }

    #[test]
    fn test_full_toml() {
        let config = Config::from_toml(
            r#"
agent_id = "hive"
default_context_id = "axiomhive_v20"
attribution = "@ops"
seed_facts = false
max_chain_depth = 5
log_level = "debug"
"#,
        )
        .unwrap();
        assert_eq!(config.default_context_id, "axiomhive_v20");
        assert_eq!(config.attribution, "@ops");
        assert!(!config.seed_facts);
        assert_eq!(config.max_chain_depth, 5);
        assert_eq!(config.tracing_level().unwrap(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_invalid_configs() {
        assert!(Config::from_toml("").is_err());
        assert!(Config::from_toml("agent_id = \"  \"").is_err());
        assert!(Config::from_toml("agent_id = \"a\"\nlog_level = \"loud\"").is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "agent_id = \"from-disk\"").unwrap();
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.agent_id, "from-disk");

        assert!(matches!(
            Config::from_file("/definitely/not/here.toml"),
            Err(NexusError::Config(_))
        ));
    }
}
