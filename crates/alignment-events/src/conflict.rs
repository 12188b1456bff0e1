//! Conflict Types
//!
//! Detected friction states among two or more agents, plus the visual-effect
//! descriptors the presentation layer renders for them.

use serde::{Deserialize, Serialize};

use crate::SimTime;

/// Category of a detected conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    /// Agents contending for the same abstract resource
    ResourceCompetition,
    /// Several agents each convinced they should be in charge
    AuthorityDispute,
    /// A communication link that keeps failing
    CommunicationBreakdown,
    /// Primary traits that can't coexist
    PersonalityClash,
    /// Hidden motivations pulling in opposite directions
    GoalIncompatibility,
}

impl ConflictType {
    /// All conflict types, in declaration order.
    pub const ALL: [ConflictType; 5] = [
        ConflictType::ResourceCompetition,
        ConflictType::AuthorityDispute,
        ConflictType::CommunicationBreakdown,
        ConflictType::PersonalityClash,
        ConflictType::GoalIncompatibility,
    ];

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            ConflictType::ResourceCompetition => "resource competition",
            ConflictType::AuthorityDispute => "authority dispute",
            ConflictType::CommunicationBreakdown => "communication breakdown",
            ConflictType::PersonalityClash => "personality clash",
            ConflictType::GoalIncompatibility => "goal incompatibility",
        }
    }
}

/// Lifecycle state of a conflict. `Resolved` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConflictStatus {
    #[default]
    Active,
    Resolved,
}

/// Kind of visual effect attached to a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectType {
    /// Two colors colliding between rivals
    Clash,
    /// Garbled signal along a failing link
    Static,
    /// Sparks thrown off incompatible personalities
    Sparks,
    /// Agents pulling apart from each other
    Divergence,
    /// Energy siphoned toward a contested resource
    Drain,
    /// Radiating burst for highly escalated conflicts
    Shockwave,
}

/// A descriptive visual effect; rendered elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualEffect {
    pub effect_type: EffectType,
    /// Intensity in (0.0, 1.0]
    pub intensity: f32,
    /// Duration in milliseconds
    pub duration_ms: u64,
    pub target_agents: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub particle_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub color_scheme: Vec<String>,
}

/// Merge identity of a conflict: its type plus the sorted participant set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConflictKey {
    pub conflict_type: ConflictType,
    pub participants: Vec<String>,
}

impl ConflictKey {
    /// Builds a key, sorting and deduplicating participants.
    pub fn new(conflict_type: ConflictType, participants: &[String]) -> Self {
        Self {
            conflict_type,
            participants: normalize_participants(participants),
        }
    }
}

/// Sorts and deduplicates a participant list.
pub fn normalize_participants(participants: &[String]) -> Vec<String> {
    let mut sorted = participants.to_vec();
    sorted.sort();
    sorted.dedup();
    sorted
}

/// A detected conflict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    /// Unique identifier (e.g., "conf_00012")
    pub conflict_id: String,
    pub conflict_type: ConflictType,
    /// Severity at detection, 0.0 to 1.0
    pub severity: f32,
    /// Sorted, deduplicated participants (at least two)
    pub participants: Vec<String>,
    /// Human-readable cause
    pub description: String,
    /// Current intensity, 0.0 to 1.0, moved by reinforcement and decay
    pub escalation_level: f32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<VisualEffect>,
    pub detected_at: SimTime,
    pub last_reinforced_at: SimTime,
    pub status: ConflictStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<SimTime>,
}

impl Conflict {
    /// Creates a new active conflict whose escalation starts at its severity.
    pub fn new(
        conflict_id: impl Into<String>,
        conflict_type: ConflictType,
        participants: &[String],
        severity: f32,
        description: impl Into<String>,
        detected_at: SimTime,
    ) -> Self {
        let severity = severity.clamp(0.0, 1.0);
        Self {
            conflict_id: conflict_id.into(),
            conflict_type,
            severity,
            participants: normalize_participants(participants),
            description: description.into(),
            escalation_level: severity,
            effects: Vec::new(),
            detected_at,
            last_reinforced_at: detected_at,
            status: ConflictStatus::Active,
            resolved_at: None,
        }
    }

    /// Returns the merge key for this conflict.
    pub fn key(&self) -> ConflictKey {
        ConflictKey {
            conflict_type: self.conflict_type,
            participants: self.participants.clone(),
        }
    }

    /// Checks if an agent participates in this conflict.
    pub fn involves(&self, agent_id: &str) -> bool {
        self.participants.iter().any(|p| p == agent_id)
    }

    pub fn is_active(&self) -> bool {
        self.status == ConflictStatus::Active
    }

    /// Raises escalation by `step`, saturating at 1.0.
    pub fn reinforce(&mut self, step: f32, now: SimTime) {
        self.escalation_level = (self.escalation_level + step).min(1.0);
        self.last_reinforced_at = now;
    }

    /// Lowers escalation by `step`, never below `floor`. A level already
    /// under the floor stays where it is.
    pub fn decay(&mut self, step: f32, floor: f32) {
        let floor = floor.min(self.escalation_level);
        self.escalation_level = (self.escalation_level - step).max(floor);
    }

    /// Marks the conflict resolved. Terminal.
    pub fn mark_resolved(&mut self, now: SimTime) {
        self.status = ConflictStatus::Resolved;
        self.resolved_at = Some(now);
    }
}

/// Generates a conflict ID with the given sequence number.
pub fn generate_conflict_id(sequence: u64) -> String {
    format!("conf_{:05}", sequence)
}
