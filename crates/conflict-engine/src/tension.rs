//! Per-agent tension tracking.
//!
//! Tension rises while an agent is party to active conflicts and decays
//! toward zero otherwise. Updates are a pure function of the snapshot, the
//! active conflicts and elapsed time; there is no randomness.

use std::collections::BTreeMap;

use alignment_events::{traits, Conflict, PersonalitySnapshot, SimTime, TensionState};

use crate::config::TensionConfig;
use crate::snapshot::Snapshot;

/// Maintains one tension value per observed agent.
#[derive(Debug, Clone)]
pub struct TensionTracker {
    config: TensionConfig,
    states: BTreeMap<String, TensionState>,
}

impl TensionTracker {
    /// Creates an empty tracker.
    pub fn new(config: TensionConfig) -> Self {
        Self {
            config,
            states: BTreeMap::new(),
        }
    }

    /// Escalation rate for a personality: base plus trait bonuses plus a
    /// penalty for low mood stability.
    pub fn escalation_rate_for(&self, personality: &PersonalitySnapshot) -> f32 {
        let mut rate = self.config.base_escalation_rate;
        if personality.has_trait(traits::ANXIOUS) {
            rate += self.config.anxious_bonus;
        }
        if personality.has_trait(traits::STUBBORN) {
            rate += self.config.stubborn_bonus;
        }
        let instability = 1.0 - personality.emotional_profile.mood_stability.clamp(0.0, 1.0);
        rate += instability * self.config.mood_instability_weight;
        rate
    }

    /// Updates tension for every agent in the snapshot.
    ///
    /// Agents seen for the first time start at zero. Agents missing from the
    /// snapshot are dropped. Returns the states whose level rose this tick.
    pub fn update(
        &mut self,
        snapshot: &Snapshot,
        active_conflicts: &[Conflict],
        elapsed_ms: u64,
        now: SimTime,
    ) -> Vec<TensionState> {
        self.states.retain(|id, _| snapshot.contains(id));

        let pressure = self.conflict_pressure(snapshot, active_conflicts);
        let time_factor = (elapsed_ms as f32 / self.config.nominal_tick_ms as f32)
            .clamp(0.0, self.config.max_time_factor);

        let mut escalated = Vec::new();
        for agent in snapshot.agents() {
            let rate = self.escalation_rate_for(&agent.personality);
            let state = self
                .states
                .entry(agent.agent_id.clone())
                .or_insert_with(|| TensionState::new(&agent.agent_id, rate, now));
            state.escalation_rate = rate;

            let before = state.level;
            let delta = match pressure.get(agent.agent_id.as_str()) {
                Some(&p) => (rate * p * time_factor).min(self.config.max_increase_per_tick),
                None => -self.config.decay_step * time_factor,
            };
            state.level = (before + delta).clamp(0.0, 1.0);
            state.last_updated = now;

            debug_assert!((0.0..=1.0).contains(&state.level));
            if state.level > before {
                escalated.push(state.clone());
            }
        }

        escalated
    }

    /// Sums conflict severity per participating agent.
    fn conflict_pressure<'a>(
        &self,
        snapshot: &Snapshot,
        active_conflicts: &'a [Conflict],
    ) -> BTreeMap<&'a str, f32> {
        let mut pressure: BTreeMap<&str, f32> = BTreeMap::new();
        for conflict in active_conflicts.iter().filter(|c| c.is_active()) {
            for participant in &conflict.participants {
                if !snapshot.contains(participant) {
                    tracing::debug!(
                        "Conflict {} names absent agent {}, skipping",
                        conflict.conflict_id,
                        participant
                    );
                    continue;
                }
                *pressure.entry(participant.as_str()).or_insert(0.0) += conflict.severity;
            }
        }
        pressure
    }

    /// Gets the tension state for an agent.
    pub fn get(&self, agent_id: &str) -> Option<&TensionState> {
        self.states.get(agent_id)
    }

    /// Returns the agent's tension level, zero if unknown.
    pub fn level_of(&self, agent_id: &str) -> f32 {
        self.states.get(agent_id).map(|s| s.level).unwrap_or(0.0)
    }

    /// Returns a copy of every tension state, ordered by agent id.
    pub fn states(&self) -> Vec<TensionState> {
        self.states.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Forgets every agent.
    pub fn clear(&mut self) {
        self.states.clear();
    }
}
