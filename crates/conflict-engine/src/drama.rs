//! Dramatic moment classification.
//!
//! Every rule is edge-triggered: it fires when its metric crosses a threshold
//! upward, stays quiet while the metric remains above it, and re-arms once
//! the metric drops back below. Rules are independent and can co-fire.

use std::collections::BTreeSet;

use alignment_events::{
    Conflict, DramaticMoment, DramaticMomentType, ResourceCompetition, ResourceType, SimTime,
    TensionState,
};

use crate::config::DramaConfig;

/// Derives dramatic moments from aggregate engine state.
#[derive(Debug, Clone)]
pub struct DramaticMomentClassifier {
    config: DramaConfig,
    /// Agents above the tension peak mark last tick
    peaked_agents: BTreeSet<String>,
    /// Resources above the crisis mark last tick
    critical_resources: BTreeSet<ResourceType>,
    /// Whether the chaos count was met last tick
    in_chaos: bool,
}

impl DramaticMomentClassifier {
    pub fn new(config: DramaConfig) -> Self {
        Self {
            config,
            peaked_agents: BTreeSet::new(),
            critical_resources: BTreeSet::new(),
            in_chaos: false,
        }
    }

    /// Evaluates every rule against this tick's state.
    pub fn classify(
        &mut self,
        tensions: &[TensionState],
        competitions: &[ResourceCompetition],
        active_conflicts: &[Conflict],
        now: SimTime,
    ) -> Vec<DramaticMoment> {
        let mut moments = Vec::new();
        moments.extend(self.tension_peaks(tensions, now));
        moments.extend(self.resource_crises(competitions, now));
        moments.extend(self.system_chaos(active_conflicts, now));
        moments
    }

    fn tension_peaks(&mut self, tensions: &[TensionState], now: SimTime) -> Vec<DramaticMoment> {
        let mark = self.config.tension_peak_threshold;
        let above: BTreeSet<String> = tensions
            .iter()
            .filter(|t| t.is_above(mark))
            .map(|t| t.agent_id.clone())
            .collect();

        let moments = tensions
            .iter()
            .filter(|t| above.contains(&t.agent_id) && !self.peaked_agents.contains(&t.agent_id))
            .map(|t| {
                DramaticMoment::new(
                    DramaticMomentType::TensionPeak,
                    t.level,
                    format!("{} is at breaking point (tension {:.2})", t.agent_id, t.level),
                    vec![t.agent_id.clone()],
                    now,
                )
            })
            .collect();

        self.peaked_agents = above;
        moments
    }

    fn resource_crises(
        &mut self,
        competitions: &[ResourceCompetition],
        now: SimTime,
    ) -> Vec<DramaticMoment> {
        let mark = self.config.resource_crisis_threshold;
        let critical: BTreeSet<ResourceType> = competitions
            .iter()
            .filter(|c| c.intensity >= mark)
            .map(|c| c.resource_type)
            .collect();

        let moments = competitions
            .iter()
            .filter(|c| {
                critical.contains(&c.resource_type)
                    && !self.critical_resources.contains(&c.resource_type)
            })
            .map(|c| {
                DramaticMoment::new(
                    DramaticMomentType::ResourceCrisis,
                    c.intensity,
                    format!(
                        "{} is running out: {} agents are fighting over it",
                        c.resource_type.label(),
                        c.competitors.len()
                    ),
                    c.competitors.clone(),
                    now,
                )
            })
            .collect();

        self.critical_resources = critical;
        moments
    }

    fn system_chaos(&mut self, active_conflicts: &[Conflict], now: SimTime) -> Vec<DramaticMoment> {
        let serious: Vec<&Conflict> = active_conflicts
            .iter()
            .filter(|c| c.is_active() && c.severity >= self.config.chaos_severity_floor)
            .collect();
        let threshold = self.config.chaos_conflict_count;
        let chaotic = serious.len() >= threshold;

        let mut moments = Vec::new();
        if chaotic && !self.in_chaos {
            let agents: BTreeSet<String> = serious
                .iter()
                .flat_map(|c| c.participants.iter().cloned())
                .collect();
            let intensity = serious.len() as f32 / (threshold * 2) as f32;
            moments.push(DramaticMoment::new(
                DramaticMomentType::SystemChaos,
                intensity,
                format!(
                    "The household is in chaos: {} serious conflicts at once",
                    serious.len()
                ),
                agents.into_iter().collect(),
                now,
            ));
        }

        self.in_chaos = chaotic;
        moments
    }

    /// Forgets which thresholds were already crossed.
    pub fn clear(&mut self) {
        self.peaked_agents.clear();
        self.critical_resources.clear();
        self.in_chaos = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alignment_events::{AllocationStrategy, ConflictType};

    fn tension(id: &str, level: f32) -> TensionState {
        let mut t = TensionState::new(id, 0.1, SimTime::ZERO);
        t.level = level;
        t
    }

    fn competition(intensity: f32) -> ResourceCompetition {
        ResourceCompetition {
            resource_type: ResourceType::Energy,
            competitors: vec!["a".to_string(), "b".to_string()],
            intensity,
            allocation_strategy: AllocationStrategy::PriorityByReliability,
            usage: Default::default(),
        }
    }

    fn conflict(n: u64, severity: f32) -> Conflict {
        let participants = vec![format!("x{}", n), format!("y{}", n)];
        Conflict::new(
            format!("conf_{:05}", n),
            ConflictType::PersonalityClash,
            &participants,
            severity,
            "",
            SimTime::ZERO,
        )
    }

    #[test]
    fn test_tension_peak_is_edge_triggered() {
        let mut classifier = DramaticMomentClassifier::new(DramaConfig::default());

        let mut fired = 0;
        for _ in 0..10 {
            fired += classifier
                .classify(&[tension("a", 0.95)], &[], &[], SimTime::ZERO)
                .len();
        }
        assert_eq!(fired, 1);

        // Drop below and re-cross
        assert!(classifier.classify(&[tension("a", 0.5)], &[], &[], SimTime::ZERO).is_empty());
        let moments = classifier.classify(&[tension("a", 0.85)], &[], &[], SimTime::ZERO);
        assert_eq!(moments.len(), 1);
        assert_eq!(moments[0].moment_type, DramaticMomentType::TensionPeak);
        assert_eq!(moments[0].agents, vec!["a".to_string()]);
        assert!((moments[0].intensity - 0.85).abs() < 1e-6);
    }

    #[test]
    fn test_resource_crisis() {
        let mut classifier = DramaticMomentClassifier::new(DramaConfig::default());

        assert!(classifier.classify(&[], &[competition(0.5)], &[], SimTime::ZERO).is_empty());
        let moments = classifier.classify(&[], &[competition(0.9)], &[], SimTime::ZERO);
        assert_eq!(moments.len(), 1);
        assert_eq!(moments[0].moment_type, DramaticMomentType::ResourceCrisis);
        assert!(classifier.classify(&[], &[competition(0.9)], &[], SimTime::ZERO).is_empty());
    }

    #[test]
    fn test_system_chaos_counts_serious_conflicts() {
        let mut classifier = DramaticMomentClassifier::new(DramaConfig::default());

        let mild: Vec<Conflict> = (1..=5).map(|n| conflict(n, 0.2)).collect();
        assert!(classifier.classify(&[], &[], &mild, SimTime::ZERO).is_empty());

        let serious: Vec<Conflict> = (1..=3).map(|n| conflict(n, 0.6)).collect();
        let moments = classifier.classify(&[], &[], &serious, SimTime::ZERO);
        assert_eq!(moments.len(), 1);
        assert_eq!(moments[0].moment_type, DramaticMomentType::SystemChaos);
        assert_eq!(moments[0].agents.len(), 6);
        assert!((moments[0].intensity - 0.5).abs() < 1e-6);

        assert!(classifier.classify(&[], &[], &serious, SimTime::ZERO).is_empty());
    }

    #[test]
    fn test_rules_co_fire() {
        let mut classifier = DramaticMomentClassifier::new(DramaConfig::default());
        let serious: Vec<Conflict> = (1..=3).map(|n| conflict(n, 0.9)).collect();

        let moments = classifier.classify(
            &[tension("a", 0.9)],
            &[competition(0.95)],
            &serious,
            SimTime::ZERO,
        );

        let types: BTreeSet<_> = moments.iter().map(|m| format!("{:?}", m.moment_type)).collect();
        assert_eq!(types.len(), 3);
    }

    #[test]
    fn test_clear_rearms() {
        let mut classifier = DramaticMomentClassifier::new(DramaConfig::default());
        classifier.classify(&[tension("a", 0.9)], &[], &[], SimTime::ZERO);
        classifier.clear();
        assert_eq!(
            classifier.classify(&[tension("a", 0.9)], &[], &[], SimTime::ZERO).len(),
            1
        );
    }
}
