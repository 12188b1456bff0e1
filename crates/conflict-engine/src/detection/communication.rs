//! Communication breakdowns: links that keep failing.

use alignment_events::{ConflictType, ConnectionType};

use super::{names, DetectionCandidate};
use crate::config::DetectionConfig;
use crate::snapshot::Snapshot;

/// Fires per communication link whose success rate is under the floor.
///
/// Links with too few interactions are ignored; a couple of failed pings
/// don't make a breakdown.
pub fn detect(snapshot: &Snapshot, config: &DetectionConfig) -> Vec<DetectionCandidate> {
    let floor = config.communication_success_floor;
    if floor <= 0.0 {
        return Vec::new();
    }

    snapshot
        .connections()
        .iter()
        .filter(|c| c.connection_type == ConnectionType::Communication)
        .filter(|c| c.interaction_count > config.communication_min_interactions)
        .filter(|c| c.success_rate < floor)
        .map(|c| {
            let shortfall = (floor - c.success_rate) / floor;
            let severity = config.communication_base_severity
                + (1.0 - config.communication_base_severity) * shortfall;
            let ids = vec![c.source.clone(), c.target.clone()];
            DetectionCandidate::new(
                ConflictType::CommunicationBreakdown,
                &ids,
                severity,
                format!(
                    "{} keep talking past each other ({:.0}% of {} exchanges succeed)",
                    names(snapshot, &ids),
                    c.success_rate * 100.0,
                    c.interaction_count
                ),
            )
        })
        .collect()
}
