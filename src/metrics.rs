use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Outcome counts for one command name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandTally {
    pub ok: u64,
    pub failed: u64,
}

/// Dispatch counters reported by `health`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Metrics {
    pub commands_total: u64,
    pub commands_success: u64,
    pub commands_failed: u64,
    /// Keyed by envelope command name, unknown names included.
    pub by_command: BTreeMap<String, CommandTally>,
    /// Last observed gauges, e.g. `graph_coherence`.
    pub custom: HashMap<String, f64>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one dispatched envelope.
    pub fn record(&mut self, command: &str, succeeded: bool) {
        self.commands_total += 1;
        let tally = self.by_command.entry(command.to_string()).or_default();
        if succeeded {
            self.commands_success += 1;
            tally.ok += 1;
        } else {
            self.commands_failed += 1;
            tally.failed += 1;
        }
    }

    pub fn set_custom(&mut self, key: impl Into<String>, value: f64) {
        self.custom.insert(key.into(), value);
    }

    /// Share of dispatched commands that succeeded, in percent. 100 before any.
    pub fn success_rate(&self) -> f64 {
        if self.commands_total == 0 {
            return 100.0;
        }
        (self.commands_success as f64 / self.commands_total as f64) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_mixed() {
        let mut metrics = Metrics::new();
        metrics.record("grok", true);
        metrics.record("grok", true);
        metrics.record("teleport", false);
        metrics.record("ping", true);

        assert_eq!(metrics.commands_total, 4);
        assert_eq!(metrics.commands_success, 3);
        assert_eq!(metrics.commands_failed, 1);
        assert_eq!(metrics.success_rate(), 75.0);
        assert_eq!(metrics.by_command["grok"], CommandTally { ok: 2, failed: 0 });
        assert_eq!(metrics.by_command["teleport"], CommandTally { ok: 0, failed: 1 });
    }

    #[test]
    fn test_success_rate_before_any_command() {
        let metrics = Metrics::new();
        assert_eq!(metrics.success_rate(), 100.0);
        assert!(metrics.by_command.is_empty());
    }

    #[test]
    fn test_gauge_keeps_last_value() {
        let mut metrics = Metrics::new();
        metrics.set_custom("graph_coherence", 0.25);
        metrics.set_custom("graph_coherence", 0.5);

        assert_eq!(metrics.custom.len(), 1);
        assert_eq!(metrics.custom.get("graph_coherence"), Some(&0.5));
    }
}
