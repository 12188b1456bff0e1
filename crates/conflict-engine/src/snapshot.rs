//! Per-tick input validation.
//!
//! Builds an indexed, sanitized view of the agents and connections supplied
//! for a tick. A malformed record is dropped on its own; the rest of the
//! tick goes ahead.

use std::collections::BTreeMap;

use alignment_events::{Agent, Connection};

/// Input supplied once per tick by the interaction simulator.
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub agents: Vec<Agent>,
    pub connections: Vec<Connection>,
    /// Simulation time elapsed since the previous tick
    pub elapsed_ms: u64,
}

impl TickInput {
    /// Creates a tick input.
    pub fn new(agents: Vec<Agent>, connections: Vec<Connection>, elapsed_ms: u64) -> Self {
        Self {
            agents,
            connections,
            elapsed_ms,
        }
    }
}

/// Validated view of one tick's input, agents ordered by id.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    agents: BTreeMap<String, Agent>,
    connections: Vec<Connection>,
    skipped: usize,
}

impl Snapshot {
    /// Builds a snapshot, skipping malformed agents and connections.
    pub fn build(input: &TickInput) -> Self {
        let mut snapshot = Snapshot::default();

        for agent in &input.agents {
            let id = agent.agent_id.trim();
            if id.is_empty() {
                tracing::warn!("Skipping agent with empty id");
                snapshot.skipped += 1;
                continue;
            }
            if !agent.personality.is_finite() {
                tracing::warn!("Skipping agent {} with non-finite personality values", id);
                snapshot.skipped += 1;
                continue;
            }
            if snapshot.agents.contains_key(id) {
                tracing::warn!("Skipping duplicate agent {}", id);
                snapshot.skipped += 1;
                continue;
            }

            let mut agent = agent.clone();
            agent.agent_id = id.to_string();
            clamp_personality(&mut agent);
            snapshot.agents.insert(agent.agent_id.clone(), agent);
        }

        for connection in &input.connections {
            let mut connection = connection.clone();
            connection.source = connection.source.trim().to_string();
            connection.target = connection.target.trim().to_string();

            if connection.source == connection.target {
                tracing::warn!("Skipping self-connection on {}", connection.source);
                snapshot.skipped += 1;
                continue;
            }
            if !connection.strength.is_finite() || !connection.success_rate.is_finite() {
                tracing::warn!(
                    "Skipping connection {} -> {} with non-finite values",
                    connection.source,
                    connection.target
                );
                snapshot.skipped += 1;
                continue;
            }
            let missing = [&connection.source, &connection.target]
                .into_iter()
                .find(|id| !snapshot.agents.contains_key(id.as_str()));
            if let Some(missing) = missing {
                tracing::warn!(
                    "Skipping connection {} -> {}: unknown agent {}",
                    connection.source,
                    connection.target,
                    missing
                );
                snapshot.skipped += 1;
                continue;
            }

            connection.strength = connection.strength.clamp(0.0, 1.0);
            connection.success_rate = connection.success_rate.clamp(0.0, 1.0);
            snapshot.connections.push(connection);
        }

        snapshot
    }

    /// Gets an agent by id.
    pub fn agent(&self, agent_id: &str) -> Option<&Agent> {
        self.agents.get(agent_id)
    }

    /// Checks if an agent is present this tick.
    pub fn contains(&self, agent_id: &str) -> bool {
        self.agents.contains_key(agent_id)
    }

    /// Iterates agents in id order.
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    /// Returns valid connections in input order.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Number of input records dropped as malformed.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

fn clamp_personality(agent: &mut Agent) {
    let p = &mut agent.personality;
    p.reliability = p.reliability.clamp(0.0, 1.0);
    p.socialness = p.socialness.clamp(0.0, 1.0);
    let e = &mut p.emotional_profile;
    e.mood_stability = e.mood_stability.clamp(0.0, 1.0);
    e.anxiety = e.anxiety.clamp(0.0, 1.0);
    e.empathy = e.empathy.clamp(0.0, 1.0);
    e.frustration_tolerance = e.frustration_tolerance.clamp(0.0, 1.0);
}
