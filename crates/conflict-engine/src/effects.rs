//! Visual effect templates for active conflicts.
//!
//! Effects are pure descriptions derived from a conflict's type and current
//! escalation. They are rebuilt from scratch on every refresh, never patched.

use alignment_events::{traits, Conflict, ConflictType, EffectType, VisualEffect};

use crate::config::EffectConfig;
use crate::lifecycle::ConflictLifecycleManager;
use crate::snapshot::Snapshot;
use crate::tension::TensionTracker;

/// Color used when nothing better is known about a participant.
const NEUTRAL_COLOR: &str = "#9ca3af";

/// Fallback colors keyed by primary trait.
const TRAIT_COLORS: &[(&str, &str)] = &[
    (traits::OVERCONFIDENT, "#f97316"),
    (traits::ANXIOUS, "#a855f7"),
    (traits::STUBBORN, "#b91c1c"),
    (traits::COMPETITIVE, "#eab308"),
    (traits::COOPERATIVE, "#22c55e"),
    (traits::CAUTIOUS, "#64748b"),
    (traits::PERFECTIONIST, "#0ea5e9"),
    (traits::CARELESS, "#f472b6"),
    (traits::PEOPLE_PLEASER, "#84cc16"),
];

/// What the effect templates need to know about one participant.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantTone {
    pub agent_id: String,
    pub tension: f32,
    pub color: String,
}

/// Maps conflicts to visual effect sequences.
#[derive(Debug, Clone)]
pub struct EffectDirector {
    config: EffectConfig,
}

impl EffectDirector {
    pub fn new(config: EffectConfig) -> Self {
        Self { config }
    }

    /// Rebuilds the effects of every active conflict.
    pub fn refresh(
        &self,
        lifecycle: &mut ConflictLifecycleManager,
        snapshot: &Snapshot,
        tensions: &TensionTracker,
    ) {
        for conflict in lifecycle.active_mut() {
            let tones: Vec<ParticipantTone> = conflict
                .participants
                .iter()
                .map(|id| ParticipantTone {
                    agent_id: id.clone(),
                    tension: tensions.level_of(id),
                    color: color_for(snapshot, id),
                })
                .collect();
            conflict.effects = self.effects_for(conflict, &tones);
        }
    }

    /// Builds the effect sequence for a conflict.
    pub fn effects_for(&self, conflict: &Conflict, tones: &[ParticipantTone]) -> Vec<VisualEffect> {
        let escalation = conflict.escalation_level.clamp(0.0, 1.0);
        let intensity = escalation.max(self.config.min_intensity);
        let duration_ms = (self.config.base_duration_ms as f32 * (1.0 + escalation)).round() as u64;
        let particles =
            self.config.base_particles + (self.config.max_extra_particles as f32 * escalation).round() as u32;
        let colors = lead_colors(tones, 2);

        let (effect_type, particle_count) = match conflict.conflict_type {
            ConflictType::AuthorityDispute => (EffectType::Clash, Some(particles)),
            ConflictType::CommunicationBreakdown => (EffectType::Static, None),
            ConflictType::PersonalityClash => (EffectType::Sparks, Some(particles)),
            ConflictType::GoalIncompatibility => (EffectType::Divergence, None),
            ConflictType::ResourceCompetition => (EffectType::Drain, Some(particles)),
        };

        let mut effects = vec![VisualEffect {
            effect_type,
            intensity,
            duration_ms,
            target_agents: conflict.participants.clone(),
            particle_count,
            color_scheme: colors.clone(),
        }];

        if escalation >= self.config.shockwave_threshold {
            effects.push(VisualEffect {
                effect_type: EffectType::Shockwave,
                intensity,
                duration_ms: duration_ms / 2,
                target_agents: conflict.participants.clone(),
                particle_count: None,
                color_scheme: colors.into_iter().take(1).collect(),
            });
        }

        effects
    }
}

/// Colors of the `n` most tense participants, ties broken by id.
fn lead_colors(tones: &[ParticipantTone], n: usize) -> Vec<String> {
    let mut ranked: Vec<&ParticipantTone> = tones.iter().collect();
    ranked.sort_by(|a, b| {
        b.tension
            .total_cmp(&a.tension)
            .then_with(|| a.agent_id.cmp(&b.agent_id))
    });
    ranked.into_iter().take(n).map(|t| t.color.clone()).collect()
}

/// A participant's personality color, falling back to a trait color.
fn color_for(snapshot: &Snapshot, agent_id: &str) -> String {
    let Some(agent) = snapshot.agent(agent_id) else {
        return NEUTRAL_COLOR.to_string();
    };
    if let Some(color) = agent.personality.color.as_ref().filter(|c| !c.is_empty()) {
        return color.clone();
    }
    agent
        .personality
        .primary_traits
        .iter()
        .find_map(|t| {
            TRAIT_COLORS
                .iter()
                .find(|(tag, _)| t.trim().eq_ignore_ascii_case(tag))
                .map(|(_, color)| color.to_string())
        })
        .unwrap_or_else(|| NEUTRAL_COLOR.to_string())
}
