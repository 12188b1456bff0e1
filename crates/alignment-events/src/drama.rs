//! Dramatic moments: ephemeral narrative events derived from engine state.

use serde::{Deserialize, Serialize};

use crate::SimTime;

/// Kind of dramatic moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DramaticMomentType {
    /// An agent's tension crossed its high-water mark
    TensionPeak,
    /// A resource competition became critical
    ResourceCrisis,
    /// Too many serious conflicts at once
    SystemChaos,
}

/// An edge-triggered narrative event. Emitted, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DramaticMoment {
    pub moment_type: DramaticMomentType,
    /// Intensity in (0.0, 1.0]
    pub intensity: f32,
    pub description: String,
    /// Sorted ids of implicated agents
    pub agents: Vec<String>,
    pub occurred_at: SimTime,
}

impl DramaticMoment {
    /// Creates a moment, clamping intensity into (0, 1].
    pub fn new(
        moment_type: DramaticMomentType,
        intensity: f32,
        description: impl Into<String>,
        mut agents: Vec<String>,
        occurred_at: SimTime,
    ) -> Self {
        agents.sort();
        agents.dedup();
        Self {
            moment_type,
            intensity: intensity.clamp(f32::EPSILON, 1.0),
            description: description.into(),
            agents,
            occurred_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intensity_never_zero() {
        let m = DramaticMoment::new(
            DramaticMomentType::SystemChaos,
            0.0,
            "quiet",
            vec![],
            SimTime::ZERO,
        );
        assert!(m.intensity > 0.0);

        let m = DramaticMoment::new(
            DramaticMomentType::TensionPeak,
            3.0,
            "loud",
            vec!["b".into(), "a".into(), "b".into()],
            SimTime::ZERO,
        );
        assert_eq!(m.intensity, 1.0);
        assert_eq!(m.agents, vec!["a".to_string(), "b".to_string()]);
    }
}
