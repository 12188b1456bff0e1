//! Conflict detection and reconciliation.
//!
//! Each conflict type has its own detector, run against every tick's
//! snapshot. Detections are then merged into the active store:
//!
//! - a detection matching an active conflict by (type, participants)
//!   reinforces it
//! - an unmatched detection creates a new conflict
//! - an active conflict not detected this tick decays, but stays active
//!   until someone resolves it explicitly
//!
//! Resource competition conflicts aren't detected from the snapshot; they are
//! promoted from the arbiter's output.

pub mod authority;
pub mod communication;
pub mod goals;
pub mod personality;

use std::collections::{BTreeMap, HashSet};

use alignment_events::{
    normalize_participants, ConflictKey, ConflictType, ResourceCompetition, SimTime,
};

use crate::config::DetectionConfig;
use crate::lifecycle::ConflictLifecycleManager;
use crate::snapshot::Snapshot;

/// A conflict found in this tick's snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionCandidate {
    pub conflict_type: ConflictType,
    /// Sorted, deduplicated participants
    pub participants: Vec<String>,
    pub severity: f32,
    pub description: String,
}

impl DetectionCandidate {
    /// Creates a candidate, normalizing participants and clamping severity.
    pub fn new(
        conflict_type: ConflictType,
        participants: &[String],
        severity: f32,
        description: impl Into<String>,
    ) -> Self {
        Self {
            conflict_type,
            participants: normalize_participants(participants),
            severity: severity.clamp(0.0, 1.0),
            description: description.into(),
        }
    }

    pub fn key(&self) -> ConflictKey {
        ConflictKey {
            conflict_type: self.conflict_type,
            participants: self.participants.clone(),
        }
    }
}

/// What reconciliation did to the active store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileOutcome {
    pub created: Vec<String>,
    pub reinforced: Vec<String>,
    pub decayed: Vec<String>,
}

/// Runs the detectors and merges their output into the active store.
#[derive(Debug, Clone)]
pub struct ConflictDetectionEngine {
    config: DetectionConfig,
}

impl ConflictDetectionEngine {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Runs every snapshot-driven detector.
    pub fn detect(&self, snapshot: &Snapshot) -> Vec<DetectionCandidate> {
        ConflictType::ALL
            .iter()
            .flat_map(|&conflict_type| self.run_detector(conflict_type, snapshot))
            .collect()
    }

    fn run_detector(&self, conflict_type: ConflictType, snapshot: &Snapshot) -> Vec<DetectionCandidate> {
        match conflict_type {
            ConflictType::AuthorityDispute => authority::detect(snapshot, &self.config),
            ConflictType::CommunicationBreakdown => communication::detect(snapshot, &self.config),
            ConflictType::PersonalityClash => personality::detect(snapshot, &self.config),
            ConflictType::GoalIncompatibility => goals::detect(snapshot, &self.config),
            // Promoted from arbitration instead.
            ConflictType::ResourceCompetition => Vec::new(),
        }
    }

    /// Turns sufficiently intense resource competitions into candidates.
    pub fn promote_competitions(
        &self,
        competitions: &[ResourceCompetition],
    ) -> Vec<DetectionCandidate> {
        competitions
            .iter()
            .filter(|c| c.intensity > self.config.resource_promotion_threshold)
            .map(|c| {
                DetectionCandidate::new(
                    ConflictType::ResourceCompetition,
                    &c.competitors,
                    c.intensity,
                    format!(
                        "{} agents fighting over {} (intensity {:.2})",
                        c.competitors.len(),
                        c.resource_type.label(),
                        c.intensity
                    ),
                )
            })
            .collect()
    }

    /// Merges this tick's candidates into the active store.
    pub fn reconcile(
        &self,
        candidates: Vec<DetectionCandidate>,
        lifecycle: &mut ConflictLifecycleManager,
        now: SimTime,
    ) -> ReconcileOutcome {
        let mut outcome = ReconcileOutcome::default();

        // Snapshot of IDs, so the store can change underneath us.
        let previously_active = lifecycle.active_ids();

        // Duplicate detections in one tick count once, at their worst severity.
        let mut merged: BTreeMap<ConflictKey, DetectionCandidate> = BTreeMap::new();
        for candidate in candidates {
            if candidate.participants.len() < 2 {
                tracing::warn!(
                    "Dropping {} detection with fewer than two participants",
                    candidate.conflict_type.label()
                );
                continue;
            }
            merged
                .entry(candidate.key())
                .and_modify(|existing| {
                    if candidate.severity > existing.severity {
                        *existing = candidate.clone();
                    }
                })
                .or_insert(candidate);
        }

        let mut seen: HashSet<String> = HashSet::new();
        for (key, candidate) in merged {
            let existing = lifecycle.find_active(&key).map(str::to_string);
            match existing {
                Some(conflict_id) => {
                    if let Some(conflict) = lifecycle.get_mut(&conflict_id) {
                        conflict.reinforce(self.config.reinforce_step, now);
                        tracing::debug!(
                            "Reinforced {} ({}), escalation {:.2}",
                            conflict_id,
                            candidate.conflict_type.label(),
                            conflict.escalation_level
                        );
                    }
                    seen.insert(conflict_id.clone());
                    outcome.reinforced.push(conflict_id);
                }
                None => {
                    let conflict_id = lifecycle.create(
                        candidate.conflict_type,
                        &candidate.participants,
                        candidate.severity,
                        candidate.description,
                        now,
                    );
                    tracing::debug!(
                        "Detected {} {} between {}",
                        candidate.conflict_type.label(),
                        conflict_id,
                        candidate.participants.join(", ")
                    );
                    seen.insert(conflict_id.clone());
                    outcome.created.push(conflict_id);
                }
            }
        }

        for conflict_id in previously_active {
            if seen.contains(&conflict_id) {
                continue;
            }
            // May have been resolved since the snapshot was taken.
            if let Some(conflict) = lifecycle.get_mut(&conflict_id) {
                conflict.decay(self.config.decay_step, self.config.escalation_floor);
                outcome.decayed.push(conflict_id);
            }
        }

        outcome
    }
}

/// Joins display names for descriptions.
pub(crate) fn names(snapshot: &Snapshot, ids: &[String]) -> String {
    ids.iter()
        .map(|id| {
            snapshot
                .agent(id)
                .map(|a| a.display_name().to_string())
                .unwrap_or_else(|| id.clone())
        })
        .collect::<Vec<_>>()
        .join(" and ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use alignment_events::{AllocationStrategy, ResourceType};

    fn ids(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn candidate(t: ConflictType, p: &[&str], severity: f32) -> DetectionCandidate {
        DetectionCandidate::new(t, &ids(p), severity, "test")
    }

    #[test]
    fn test_new_detection_creates_conflict() {
        let engine = ConflictDetectionEngine::new(DetectionConfig::default());
        let mut lifecycle = ConflictLifecycleManager::new();

        let outcome = engine.reconcile(
            vec![candidate(ConflictType::AuthorityDispute, &["b", "a"], 0.6)],
            &mut lifecycle,
            SimTime::ZERO,
        );

        assert_eq!(outcome.created, vec!["conf_00001".to_string()]);
        let conflict = lifecycle.get("conf_00001").unwrap();
        assert_eq!(conflict.participants, ids(&["a", "b"]));
        assert_eq!(conflict.escalation_level, 0.6);
    }

    #[test]
    fn test_redetection_reinforces() {
        let engine = ConflictDetectionEngine::new(DetectionConfig::default());
        let mut lifecycle = ConflictLifecycleManager::new();
        let c = candidate(ConflictType::PersonalityClash, &["a", "b"], 0.5);

        engine.reconcile(vec![c.clone()], &mut lifecycle, SimTime::ZERO);
        let outcome = engine.reconcile(vec![c], &mut lifecycle, SimTime::from_millis(1000));

        assert!(outcome.created.is_empty());
        assert_eq!(outcome.reinforced, vec!["conf_00001".to_string()]);
        let conflict = lifecycle.get("conf_00001").unwrap();
        assert!((conflict.escalation_level - 0.6).abs() < 1e-6);
        assert_eq!(conflict.severity, 0.5);
        assert_eq!(lifecycle.active_count(), 1);
    }

    #[test]
    fn test_missing_detection_decays_without_resolving() {
        let engine = ConflictDetectionEngine::new(DetectionConfig::default());
        let mut lifecycle = ConflictLifecycleManager::new();
        engine.reconcile(
            vec![candidate(ConflictType::PersonalityClash, &["a", "b"], 0.5)],
            &mut lifecycle,
            SimTime::ZERO,
        );

        let mut last = 0.5;
        for _ in 0..8 {
            let outcome = engine.reconcile(vec![], &mut lifecycle, SimTime::ZERO);
            assert_eq!(outcome.decayed.len(), 1);
            let level = lifecycle.get("conf_00001").unwrap().escalation_level;
            assert!(level < last);
            last = level;
        }

        for _ in 0..50 {
            engine.reconcile(vec![], &mut lifecycle, SimTime::ZERO);
        }
        let conflict = lifecycle.get("conf_00001").unwrap();
        assert_eq!(conflict.escalation_level, 0.05);
        assert!(conflict.is_active());
    }

    #[test]
    fn test_duplicate_candidates_merge_at_max_severity() {
        let engine = ConflictDetectionEngine::new(DetectionConfig::default());
        let mut lifecycle = ConflictLifecycleManager::new();

        let outcome = engine.reconcile(
            vec![
                candidate(ConflictType::CommunicationBreakdown, &["a", "b"], 0.4),
                candidate(ConflictType::CommunicationBreakdown, &["b", "a"], 0.7),
            ],
            &mut lifecycle,
            SimTime::ZERO,
        );

        assert_eq!(outcome.created.len(), 1);
        assert_eq!(lifecycle.get("conf_00001").unwrap().severity, 0.7);
    }

    #[test]
    fn test_single_participant_dropped() {
        let engine = ConflictDetectionEngine::new(DetectionConfig::default());
        let mut lifecycle = ConflictLifecycleManager::new();

        let outcome = engine.reconcile(
            vec![candidate(ConflictType::PersonalityClash, &["a", "a"], 0.5)],
            &mut lifecycle,
            SimTime::ZERO,
        );

        assert!(outcome.created.is_empty());
        assert_eq!(lifecycle.active_count(), 0);
    }

    #[test]
    fn test_promote_only_intense_competitions() {
        let engine = ConflictDetectionEngine::new(DetectionConfig::default());
        let make = |intensity: f32| ResourceCompetition {
            resource_type: ResourceType::Processing,
            competitors: ids(&["a", "b"]),
            intensity,
            allocation_strategy: AllocationStrategy::RoundRobinPreemptive,
            usage: Default::default(),
        };

        assert!(engine.promote_competitions(&[make(0.5)]).is_empty());
        let promoted = engine.promote_competitions(&[make(0.9)]);
        assert_eq!(promoted.len(), 1);
        assert_eq!(promoted[0].conflict_type, ConflictType::ResourceCompetition);
        assert_eq!(promoted[0].severity, 0.9);
    }
}
