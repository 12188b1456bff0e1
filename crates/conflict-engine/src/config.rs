//! Configuration loading for the conflict engine.
//!
//! Every threshold, step and weight the engine uses is a tunable constant
//! loaded from a TOML configuration file.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Per-agent tension dynamics
    #[serde(default)]
    pub tension: TensionConfig,
    /// Conflict detectors and merge policy
    #[serde(default)]
    pub detection: DetectionConfig,
    /// Resource demand model and contention
    #[serde(default)]
    pub resources: ResourceConfig,
    /// Dramatic moment thresholds
    #[serde(default)]
    pub drama: DramaConfig,
    /// Visual effect templates
    #[serde(default)]
    pub effects: EffectConfig,
}

impl EngineConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration as a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks that every value is finite and in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.tension;
        positive("tension.base_escalation_rate", t.base_escalation_rate)?;
        non_negative("tension.anxious_bonus", t.anxious_bonus)?;
        non_negative("tension.stubborn_bonus", t.stubborn_bonus)?;
        non_negative("tension.mood_instability_weight", t.mood_instability_weight)?;
        unit("tension.max_increase_per_tick", t.max_increase_per_tick)?;
        unit("tension.decay_step", t.decay_step)?;
        positive("tension.max_time_factor", t.max_time_factor)?;
        if t.nominal_tick_ms == 0 {
            return Err(ConfigError::Invalid(
                "tension.nominal_tick_ms must be greater than zero".to_string(),
            ));
        }

        let d = &self.detection;
        unit("detection.authority_base_severity", d.authority_base_severity)?;
        unit("detection.authority_per_extra_agent", d.authority_per_extra_agent)?;
        unit("detection.authority_reliability_weight", d.authority_reliability_weight)?;
        unit("detection.communication_success_floor", d.communication_success_floor)?;
        unit("detection.communication_base_severity", d.communication_base_severity)?;
        unit("detection.clash_base_severity", d.clash_base_severity)?;
        unit("detection.clash_per_pair", d.clash_per_pair)?;
        unit("detection.goal_base_severity", d.goal_base_severity)?;
        unit("detection.goal_per_match", d.goal_per_match)?;
        unit("detection.resource_promotion_threshold", d.resource_promotion_threshold)?;
        unit("detection.reinforce_step", d.reinforce_step)?;
        positive("detection.decay_step", d.decay_step)?;
        unit("detection.escalation_floor", d.escalation_floor)?;

        let r = &self.resources;
        for (name, value) in [
            ("resources.base_demand", r.base_demand),
            ("resources.anxious_energy_bonus", r.anxious_energy_bonus),
            ("resources.anxiety_energy_weight", r.anxiety_energy_weight),
            ("resources.competitive_bandwidth_bonus", r.competitive_bandwidth_bonus),
            ("resources.socialness_bandwidth_weight", r.socialness_bandwidth_weight),
            ("resources.overconfident_processing_bonus", r.overconfident_processing_bonus),
            ("resources.perfectionist_processing_bonus", r.perfectionist_processing_bonus),
            ("resources.perfectionist_memory_bonus", r.perfectionist_memory_bonus),
            ("resources.cautious_memory_bonus", r.cautious_memory_bonus),
            ("resources.methodical_memory_bonus", r.methodical_memory_bonus),
            ("resources.energy_threshold", r.energy_threshold),
            ("resources.bandwidth_threshold", r.bandwidth_threshold),
            ("resources.processing_threshold", r.processing_threshold),
            ("resources.memory_threshold", r.memory_threshold),
            ("resources.crowd_base", r.crowd_base),
            ("resources.crowd_step", r.crowd_step),
        ] {
            unit(name, value)?;
        }

        let dr = &self.drama;
        unit("drama.tension_peak_threshold", dr.tension_peak_threshold)?;
        unit("drama.resource_crisis_threshold", dr.resource_crisis_threshold)?;
        unit("drama.chaos_severity_floor", dr.chaos_severity_floor)?;
        if dr.chaos_conflict_count == 0 {
            return Err(ConfigError::Invalid(
                "drama.chaos_conflict_count must be at least 1".to_string(),
            ));
        }

        let e = &self.effects;
        unit("effects.shockwave_threshold", e.shockwave_threshold)?;
        unit("effects.min_intensity", e.min_intensity)?;
        if e.min_intensity <= 0.0 {
            return Err(ConfigError::Invalid(
                "effects.min_intensity must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

fn unit(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )))
    }
}

fn non_negative(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{} must be non-negative, got {}",
            name, value
        )))
    }
}

fn positive(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{} must be greater than zero, got {}",
            name, value
        )))
    }
}

/// Tension dynamics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TensionConfig {
    /// Escalation rate every agent starts from
    pub base_escalation_rate: f32,
    /// Added for the "anxious" trait
    pub anxious_bonus: f32,
    /// Added for the "stubborn" trait
    pub stubborn_bonus: f32,
    /// Scales (1 - mood_stability) into the rate
    pub mood_instability_weight: f32,
    /// Cap on a single tick's tension increase
    pub max_increase_per_tick: f32,
    /// Decay per nominal tick without conflict pressure
    pub decay_step: f32,
    /// Length of a nominal tick in milliseconds
    pub nominal_tick_ms: u64,
    /// Cap on elapsed / nominal
    pub max_time_factor: f32,
}

impl Default for TensionConfig {
    fn default() -> Self {
        Self {
            base_escalation_rate: 0.1,
            anxious_bonus: 0.05,
            stubborn_bonus: 0.05,
            mood_instability_weight: 0.05,
            max_increase_per_tick: 0.15,
            decay_step: 0.02,
            nominal_tick_ms: 1000,
            max_time_factor: 5.0,
        }
    }
}

/// Conflict detection and merge policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Severity of a two-agent authority dispute before reliability
    pub authority_base_severity: f32,
    /// Severity added per overconfident agent beyond two
    pub authority_per_extra_agent: f32,
    /// Weight of the disputants' mean reliability
    pub authority_reliability_weight: f32,
    /// Success rate below which a communication link is failing
    pub communication_success_floor: f32,
    /// Interactions required before a link can be judged
    pub communication_min_interactions: u32,
    /// Severity of a breakdown right at the floor
    pub communication_base_severity: f32,
    /// Severity of a clash before counting incompatible pairs
    pub clash_base_severity: f32,
    /// Severity added per incompatible trait pair
    pub clash_per_pair: f32,
    /// Severity of a goal conflict before counting oppositions
    pub goal_base_severity: f32,
    /// Severity added per matched opposition
    pub goal_per_match: f32,
    /// Competition intensity above which it becomes a conflict
    pub resource_promotion_threshold: f32,
    /// Escalation added when a conflict is re-detected
    pub reinforce_step: f32,
    /// Escalation removed when a conflict is not re-detected
    pub decay_step: f32,
    /// Escalation never decays below this
    pub escalation_floor: f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            authority_base_severity: 0.4,
            authority_per_extra_agent: 0.1,
            authority_reliability_weight: 0.3,
            communication_success_floor: 0.3,
            communication_min_interactions: 5,
            communication_base_severity: 0.3,
            clash_base_severity: 0.3,
            clash_per_pair: 0.2,
            goal_base_severity: 0.3,
            goal_per_match: 0.15,
            resource_promotion_threshold: 0.7,
            reinforce_step: 0.1,
            decay_step: 0.05,
            escalation_floor: 0.05,
        }
    }
}

/// Resource demand model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// Demand every agent has for every resource
    pub base_demand: f32,
    pub anxious_energy_bonus: f32,
    /// Scales emotional anxiety into energy demand
    pub anxiety_energy_weight: f32,
    pub competitive_bandwidth_bonus: f32,
    /// Scales socialness into bandwidth demand
    pub socialness_bandwidth_weight: f32,
    pub overconfident_processing_bonus: f32,
    pub perfectionist_processing_bonus: f32,
    pub perfectionist_memory_bonus: f32,
    pub cautious_memory_bonus: f32,
    pub methodical_memory_bonus: f32,
    /// Demand above which an agent contends for energy
    pub energy_threshold: f32,
    pub bandwidth_threshold: f32,
    pub processing_threshold: f32,
    pub memory_threshold: f32,
    /// Crowding factor for two contenders
    pub crowd_base: f32,
    /// Crowding added per contender beyond one
    pub crowd_step: f32,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            base_demand: 0.3,
            anxious_energy_bonus: 0.35,
            anxiety_energy_weight: 0.2,
            competitive_bandwidth_bonus: 0.3,
            socialness_bandwidth_weight: 0.3,
            overconfident_processing_bonus: 0.35,
            perfectionist_processing_bonus: 0.2,
            perfectionist_memory_bonus: 0.25,
            cautious_memory_bonus: 0.2,
            methodical_memory_bonus: 0.15,
            energy_threshold: 0.6,
            bandwidth_threshold: 0.6,
            processing_threshold: 0.6,
            memory_threshold: 0.6,
            crowd_base: 0.6,
            crowd_step: 0.2,
        }
    }
}

/// Dramatic moment thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DramaConfig {
    /// Tension high-water mark
    pub tension_peak_threshold: f32,
    /// Competition intensity that counts as a crisis
    pub resource_crisis_threshold: f32,
    /// Minimum severity for a conflict to count toward chaos
    pub chaos_severity_floor: f32,
    /// Serious conflicts needed for system chaos
    pub chaos_conflict_count: usize,
}

impl Default for DramaConfig {
    fn default() -> Self {
        Self {
            tension_peak_threshold: 0.8,
            resource_crisis_threshold: 0.8,
            chaos_severity_floor: 0.5,
            chaos_conflict_count: 3,
        }
    }
}

/// Visual effect templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectConfig {
    /// Duration of an effect at zero escalation
    pub base_duration_ms: u64,
    /// Particles at zero escalation
    pub base_particles: u32,
    /// Particles added at full escalation
    pub max_extra_particles: u32,
    /// Escalation at which a shockwave is layered on
    pub shockwave_threshold: f32,
    /// Lower bound on effect intensity
    pub min_intensity: f32,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            base_duration_ms: 2000,
            base_particles: 20,
            max_extra_particles: 80,
            shockwave_threshold: 0.75,
            min_intensity: 0.05,
        }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Error parsing TOML config
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    /// Error serializing config to TOML
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    /// A value is out of range
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Generates a default configuration file content.
pub fn default_config_toml() -> String {
    r#"# Conflict Engine Configuration

[tension]
base_escalation_rate = 0.1
anxious_bonus = 0.05
stubborn_bonus = 0.05
mood_instability_weight = 0.05
max_increase_per_tick = 0.15
decay_step = 0.02
nominal_tick_ms = 1000
max_time_factor = 5.0

[detection]
authority_base_severity = 0.4
authority_per_extra_agent = 0.1
authority_reliability_weight = 0.3
communication_success_floor = 0.3
communication_min_interactions = 5
communication_base_severity = 0.3
clash_base_severity = 0.3
clash_per_pair = 0.2
goal_base_severity = 0.3
goal_per_match = 0.15
resource_promotion_threshold = 0.7
reinforce_step = 0.1
decay_step = 0.05
escalation_floor = 0.05

[resources]
base_demand = 0.3
anxious_energy_bonus = 0.35
anxiety_energy_weight = 0.2
competitive_bandwidth_bonus = 0.3
socialness_bandwidth_weight = 0.3
overconfident_processing_bonus = 0.35
perfectionist_processing_bonus = 0.2
perfectionist_memory_bonus = 0.25
cautious_memory_bonus = 0.2
methodical_memory_bonus = 0.15
energy_threshold = 0.6
bandwidth_threshold = 0.6
processing_threshold = 0.6
memory_threshold = 0.6
crowd_base = 0.6
crowd_step = 0.2

[drama]
tension_peak_threshold = 0.8
resource_crisis_threshold = 0.8
chaos_severity_floor = 0.5
chaos_conflict_count = 3

[effects]
base_duration_ms = 2000
base_particles = 20
max_extra_particles = 80
shockwave_threshold = 0.75
min_intensity = 0.05
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();

        assert_eq!(config.tension.base_escalation_rate, 0.1);
        assert_eq!(config.detection.communication_min_interactions, 5);
        assert_eq!(config.drama.chaos_conflict_count, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_toml_parses() {
        let config = EngineConfig::from_str(&default_config_toml()).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml = r#"
            [drama]
            tension_peak_threshold = 0.9
        "#;

        let config = EngineConfig::from_str(toml).unwrap();

        assert_eq!(config.drama.tension_peak_threshold, 0.9);
        assert_eq!(config.drama.resource_crisis_threshold, 0.8);
        assert_eq!(config.tension, TensionConfig::default());
    }

    #[test]
    fn test_out_of_range_rejected() {
        let toml = r#"
            [detection]
            communication_success_floor = 1.5
        "#;

        let err = EngineConfig::from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("communication_success_floor"));
    }

    #[test]
    fn test_zero_nominal_tick_rejected() {
        let mut config = EngineConfig::default();
        config.tension.nominal_tick_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_malformed_toml() {
        let err = EngineConfig::from_str("[tension\nbase = ").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_config_to_toml_roundtrip() {
        let config = EngineConfig::default();
        let toml = config.to_toml().unwrap();

        assert!(toml.contains("[tension]"));
        assert!(toml.contains("[drama]"));
        assert_eq!(EngineConfig::from_str(&toml).unwrap(), config);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[effects]\nbase_particles = 5").unwrap();

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.effects.base_particles, 5);
    }

    #[test]
    fn test_missing_file() {
        let err = EngineConfig::from_file(Path::new("/nonexistent/engine.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
