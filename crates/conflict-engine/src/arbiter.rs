//! Resource arbitration.
//!
//! Models each agent's demand for four abstract capacities from its
//! personality and records contention when several agents want the same
//! capacity at once. Competitions are recomputed from scratch every tick, so
//! a transient spike disappears as soon as demand drops. Nothing here
//! actually throttles an agent; the allocation strategy is descriptive.

use std::collections::{BTreeMap, BTreeSet};

use alignment_events::{traits, PersonalitySnapshot, ResourceCompetition, ResourceType};

use crate::config::ResourceConfig;
use crate::snapshot::Snapshot;

/// Competitions formed this tick that didn't exist last tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArbitrationOutcome {
    pub formed: Vec<ResourceType>,
    pub ended: Vec<ResourceType>,
}

/// Tracks at most one competition per resource type.
#[derive(Debug, Clone)]
pub struct ResourceArbiter {
    config: ResourceConfig,
    competitions: BTreeMap<ResourceType, ResourceCompetition>,
}

impl ResourceArbiter {
    pub fn new(config: ResourceConfig) -> Self {
        Self {
            config,
            competitions: BTreeMap::new(),
        }
    }

    /// Modeled demand of a personality for a resource, 0.0 to 1.0.
    pub fn demand(&self, personality: &PersonalitySnapshot, resource: ResourceType) -> f32 {
        let c = &self.config;
        let bonus = |tag: &str, amount: f32| if personality.has_trait(tag) { amount } else { 0.0 };

        let demand = c.base_demand
            + match resource {
                ResourceType::Energy => {
                    bonus(traits::ANXIOUS, c.anxious_energy_bonus)
                        + personality.emotional_profile.anxiety * c.anxiety_energy_weight
                }
                ResourceType::Bandwidth => {
                    bonus(traits::COMPETITIVE, c.competitive_bandwidth_bonus)
                        + personality.socialness * c.socialness_bandwidth_weight
                }
                ResourceType::Processing => {
                    bonus(traits::OVERCONFIDENT, c.overconfident_processing_bonus)
                        + bonus(traits::PERFECTIONIST, c.perfectionist_processing_bonus)
                }
                ResourceType::Memory => {
                    bonus(traits::PERFECTIONIST, c.perfectionist_memory_bonus)
                        + bonus(traits::CAUTIOUS, c.cautious_memory_bonus)
                        + bonus(traits::METHODICAL, c.methodical_memory_bonus)
                }
            };
        demand.clamp(0.0, 1.0)
    }

    /// Demand above which an agent contends for the resource.
    pub fn threshold(&self, resource: ResourceType) -> f32 {
        match resource {
            ResourceType::Energy => self.config.energy_threshold,
            ResourceType::Bandwidth => self.config.bandwidth_threshold,
            ResourceType::Processing => self.config.processing_threshold,
            ResourceType::Memory => self.config.memory_threshold,
        }
    }

    /// Recomputes every competition from the snapshot.
    pub fn arbitrate(&mut self, snapshot: &Snapshot) -> ArbitrationOutcome {
        let previous: BTreeSet<ResourceType> = self.competitions.keys().copied().collect();
        let mut next = BTreeMap::new();

        for resource in ResourceType::ALL {
            let threshold = self.threshold(resource);
            let usage: BTreeMap<String, f32> = snapshot
                .agents()
                .map(|a| (a.agent_id.clone(), self.demand(&a.personality, resource)))
                .filter(|(_, d)| *d > threshold)
                .collect();

            if usage.len() < 2 {
                continue;
            }

            let demands: Vec<f32> = usage.values().copied().collect();
            let intensity = contention_intensity(&demands, self.config.crowd_base, self.config.crowd_step);
            let competition = ResourceCompetition {
                resource_type: resource,
                competitors: usage.keys().cloned().collect(),
                intensity,
                allocation_strategy: resource.allocation_strategy(),
                usage,
            };
            next.insert(resource, competition);
        }

        self.competitions = next;

        let current: BTreeSet<ResourceType> = self.competitions.keys().copied().collect();
        let outcome = ArbitrationOutcome {
            formed: current.difference(&previous).copied().collect(),
            ended: previous.difference(&current).copied().collect(),
        };
        for resource in &outcome.formed {
            if let Some(c) = self.competitions.get(resource) {
                tracing::debug!(
                    "Competition for {} among {} (intensity {:.2})",
                    resource.label(),
                    c.competitors.join(", "),
                    c.intensity
                );
            }
        }
        outcome
    }

    /// Gets the competition for a resource, if any.
    pub fn get(&self, resource: ResourceType) -> Option<&ResourceCompetition> {
        self.competitions.get(&resource)
    }

    /// Copies of all current competitions, ordered by resource type.
    pub fn competitions(&self) -> Vec<ResourceCompetition> {
        self.competitions.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.competitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.competitions.is_empty()
    }

    pub fn clear(&mut self) {
        self.competitions.clear();
    }
}

/// Intensity of contention among the given demands.
///
/// High mean demand with little spread means many agents near saturation at
/// once, which is the worst case. More contenders raise the crowding factor
/// up to 1.
pub fn contention_intensity(demands: &[f32], crowd_base: f32, crowd_step: f32) -> f32 {
    if demands.len() < 2 {
        return 0.0;
    }
    let n = demands.len() as f32;
    let mean = demands.iter().sum::<f32>() / n;
    let variance = demands.iter().map(|d| (d - mean).powi(2)).sum::<f32>() / n;
    let crowding = (crowd_base + crowd_step * (n - 2.0)).min(1.0);
    (mean * (1.0 - variance.sqrt()) * crowding).clamp(0.0, 1.0)
}
