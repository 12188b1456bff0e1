//! Personality clashes between agents whose primary traits can't coexist.

use alignment_events::{traits, Agent, ConflictType};

use super::{names, DetectionCandidate};
use crate::config::DetectionConfig;
use crate::snapshot::Snapshot;

/// Trait pairs that are mutually exclusive. Order within a pair is
/// irrelevant.
pub const INCOMPATIBLE_TRAITS: &[(&str, &str)] = &[
    (traits::OVERCONFIDENT, traits::CAUTIOUS),
    (traits::COMPETITIVE, traits::COOPERATIVE),
    (traits::PERFECTIONIST, traits::CARELESS),
    (traits::STUBBORN, traits::PEOPLE_PLEASER),
    (traits::SECRETIVE, traits::TRANSPARENT),
    (traits::IMPULSIVE, traits::METHODICAL),
    (traits::INDEPENDENT, traits::PEOPLE_PLEASER),
];

/// Counts incompatible trait pairs between two agents, in either direction.
pub fn incompatible_pairs(a: &Agent, b: &Agent) -> usize {
    let (pa, pb) = (&a.personality, &b.personality);
    INCOMPATIBLE_TRAITS
        .iter()
        .filter(|(x, y)| (pa.has_trait(x) && pb.has_trait(y)) || (pa.has_trait(y) && pb.has_trait(x)))
        .count()
}

/// Fires for every agent pair with at least one incompatible trait pair.
pub fn detect(snapshot: &Snapshot, config: &DetectionConfig) -> Vec<DetectionCandidate> {
    let agents: Vec<&Agent> = snapshot.agents().collect();
    let mut found = Vec::new();

    for (i, a) in agents.iter().enumerate() {
        for b in &agents[i + 1..] {
            let pairs = incompatible_pairs(a, b);
            if pairs == 0 {
                continue;
            }
            let ids = vec![a.agent_id.clone(), b.agent_id.clone()];
            let severity = config.clash_base_severity + config.clash_per_pair * pairs as f32;
            found.push(DetectionCandidate::new(
                ConflictType::PersonalityClash,
                &ids,
                severity,
                format!(
                    "{} rub each other the wrong way ({} incompatible trait{})",
                    names(snapshot, &ids),
                    pairs,
                    if pairs == 1 { "" } else { "s" }
                ),
            ));
        }
    }

    found
}
