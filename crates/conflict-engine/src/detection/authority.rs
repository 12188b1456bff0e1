//! Authority disputes: several overconfident agents in one household.

use alignment_events::{traits, ConflictType};

use super::{names, DetectionCandidate};
use crate::config::DetectionConfig;
use crate::snapshot::Snapshot;

/// Fires once when two or more agents share the overconfident trait.
///
/// Severity grows with the number of claimants and with how reliable they
/// are, since a dependable device has more grounds to insist.
pub fn detect(snapshot: &Snapshot, config: &DetectionConfig) -> Vec<DetectionCandidate> {
    let claimants: Vec<_> = snapshot
        .agents()
        .filter(|a| a.personality.has_trait(traits::OVERCONFIDENT))
        .collect();

    if claimants.len() < 2 {
        return Vec::new();
    }

    let ids: Vec<String> = claimants.iter().map(|a| a.agent_id.clone()).collect();
    let mean_reliability = claimants
        .iter()
        .map(|a| a.personality.reliability)
        .sum::<f32>()
        / claimants.len() as f32;
    let severity = config.authority_base_severity
        + config.authority_per_extra_agent * (claimants.len() - 2) as f32
        + config.authority_reliability_weight * mean_reliability;

    vec![DetectionCandidate::new(
        ConflictType::AuthorityDispute,
        &ids,
        severity,
        format!("{} each insist on being in charge", names(snapshot, &ids)),
    )]
}
