//! Agent and Connection Types
//!
//! Read-only inputs supplied once per tick by the interaction simulator.
//! Personality data arrives already converted; the engine never mutates it.

use serde::{Deserialize, Serialize};

/// Well-known primary trait tags.
///
/// Traits travel as free-form tags so new personas don't need a schema change,
/// but the engine's heuristics key off these.
pub mod traits {
    pub const OVERCONFIDENT: &str = "overconfident";
    pub const ANXIOUS: &str = "anxious";
    pub const STUBBORN: &str = "stubborn";
    pub const COMPETITIVE: &str = "competitive";
    pub const COOPERATIVE: &str = "cooperative";
    pub const CAUTIOUS: &str = "cautious";
    pub const PERFECTIONIST: &str = "perfectionist";
    pub const CARELESS: &str = "careless";
    pub const PEOPLE_PLEASER: &str = "people_pleaser";
    pub const INDEPENDENT: &str = "independent";
    pub const SECRETIVE: &str = "secretive";
    pub const TRANSPARENT: &str = "transparent";
    pub const IMPULSIVE: &str = "impulsive";
    pub const METHODICAL: &str = "methodical";
}

/// Emotional profile of a persona. All values are 0.0 to 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmotionalProfile {
    /// Resistance to mood swings
    pub mood_stability: f32,
    /// Baseline worry
    pub anxiety: f32,
    /// Sensitivity to other agents' states
    pub empathy: f32,
    /// Tolerance for being thwarted
    pub frustration_tolerance: f32,
}

impl Default for EmotionalProfile {
    fn default() -> Self {
        Self {
            mood_stability: 0.5,
            anxiety: 0.3,
            empathy: 0.5,
            frustration_tolerance: 0.5,
        }
    }
}

/// Snapshot of an agent's personality, as converted for the current tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalitySnapshot {
    /// Primary trait tags (e.g. "overconfident", "anxious")
    #[serde(default)]
    pub primary_traits: Vec<String>,
    /// Communication style tag (e.g. "direct", "verbose")
    #[serde(default)]
    pub communication_style: String,
    /// Conflict-resolution style tag (e.g. "avoidant", "assertive")
    #[serde(default)]
    pub conflict_resolution: String,
    /// How dependably the agent does what it claims, 0.0 to 1.0
    pub reliability: f32,
    /// Frequency of voluntary interaction, 0.0 to 1.0
    pub socialness: f32,
    #[serde(default)]
    pub emotional_profile: EmotionalProfile,
    /// Free-text motivations the agent doesn't openly state
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hidden_motivations: Vec<String>,
    /// Display color token for the persona (e.g. "#ff8800")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl PersonalitySnapshot {
    /// Creates a personality with the given traits and neutral scalars.
    pub fn new(primary_traits: &[&str]) -> Self {
        Self {
            primary_traits: primary_traits.iter().map(|t| t.to_string()).collect(),
            communication_style: "direct".to_string(),
            conflict_resolution: "collaborative".to_string(),
            reliability: 0.5,
            socialness: 0.5,
            emotional_profile: EmotionalProfile::default(),
            hidden_motivations: Vec::new(),
            color: None,
        }
    }

    pub fn with_reliability(mut self, reliability: f32) -> Self {
        self.reliability = reliability;
        self
    }

    pub fn with_socialness(mut self, socialness: f32) -> Self {
        self.socialness = socialness;
        self
    }

    pub fn with_mood_stability(mut self, mood_stability: f32) -> Self {
        self.emotional_profile.mood_stability = mood_stability;
        self
    }

    /// Adds a hidden motivation.
    pub fn with_motivation(mut self, motivation: impl Into<String>) -> Self {
        self.hidden_motivations.push(motivation.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Checks whether the personality carries a trait tag (case-insensitive).
    pub fn has_trait(&self, tag: &str) -> bool {
        self.primary_traits
            .iter()
            .any(|t| t.trim().eq_ignore_ascii_case(tag))
    }

    /// Returns true if every scalar is a finite number.
    pub fn is_finite(&self) -> bool {
        let e = &self.emotional_profile;
        [
            self.reliability,
            self.socialness,
            e.mood_stability,
            e.anxiety,
            e.empathy,
            e.frustration_tolerance,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// A simulated device persona participating in interactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub agent_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub personality: PersonalitySnapshot,
}

impl Agent {
    /// Creates a new agent.
    pub fn new(agent_id: impl Into<String>, personality: PersonalitySnapshot) -> Self {
        Self {
            agent_id: agent_id.into(),
            name: String::new(),
            personality,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns the display name, falling back to the id.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.agent_id
        } else {
            &self.name
        }
    }
}

/// Kind of pairwise link between two agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionType {
    Cooperation,
    Communication,
    Conflict,
}

/// Status of a connection as reported by the interaction simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    #[default]
    Active,
    Idle,
    Strained,
    Broken,
}

/// A pairwise connection between two agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub source: String,
    pub target: String,
    pub connection_type: ConnectionType,
    /// Link strength, 0.0 to 1.0
    pub strength: f32,
    #[serde(default)]
    pub status: ConnectionStatus,
    #[serde(default)]
    pub interaction_count: u32,
    /// Fraction of interactions that succeeded, 0.0 to 1.0
    pub success_rate: f32,
}

impl Connection {
    /// Creates a new active connection.
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        connection_type: ConnectionType,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            connection_type,
            strength: 0.5,
            status: ConnectionStatus::Active,
            interaction_count: 0,
            success_rate: 1.0,
        }
    }

    /// Sets interaction statistics.
    pub fn with_stats(mut self, interaction_count: u32, success_rate: f32) -> Self {
        self.interaction_count = interaction_count;
        self.success_rate = success_rate;
        self
    }

    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = strength;
        self
    }
}
