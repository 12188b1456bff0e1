//! Per-agent tension state.

use serde::{Deserialize, Serialize};

use crate::SimTime;

/// Accumulated unresolved friction pressure for one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensionState {
    pub agent_id: String,
    /// Tension level, 0.0 to 1.0
    pub level: f32,
    /// How quickly this agent's tension rises under pressure (> 0)
    pub escalation_rate: f32,
    pub last_updated: SimTime,
}

impl TensionState {
    /// Creates a calm tension state.
    pub fn new(agent_id: impl Into<String>, escalation_rate: f32, now: SimTime) -> Self {
        Self {
            agent_id: agent_id.into(),
            level: 0.0,
            escalation_rate,
            last_updated: now,
        }
    }

    /// Check if tension is above the given mark.
    pub fn is_above(&self, mark: f32) -> bool {
        self.level >= mark
    }
}
