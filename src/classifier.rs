use serde::{Deserialize, Serialize};

/// Category a command is decomposed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Planning,
    Analysis,
    Integration,
    Temporal,
    Generic,
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Planning => write!(f, "planning"),
            Self::Analysis => write!(f, "analysis"),
            Self::Integration => write!(f, "integration"),
            Self::Temporal => write!(f, "temporal"),
            Self::Generic => write!(f, "generic"),
        }
    }
}

/// Ordered `(keywords, kind)` table; the first row with a keyword hit wins.
/// "schedule" appears twice and always resolves to planning.
pub const CLASSIFICATION_RULES: &[(&[&str], CommandKind)] = &[
    (&["plan", "move", "schedule", "organize"], CommandKind::Planning),
    (&["analyze", "examine", "study", "review"], CommandKind::Analysis),
    (&["integrate", "combine", "merge", "connect"], CommandKind::Integration),
    (&["when", "time", "date", "schedule"], CommandKind::Temporal),
];

/// Classify a command (case-insensitive substring match).
pub fn classify_command(command: &str) -> CommandKind {
    let lowered = command.to_lowercase();
    CLASSIFICATION_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(_, kind)| *kind)
        .unwrap_or(CommandKind::Generic)
}
