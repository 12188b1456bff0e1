//! Goal incompatibility from hidden motivations.
//!
//! This is a deliberately crude keyword heuristic. Each opposition pairs two
//! small word lists; two agents conflict when one's motivations hit one side
//! and the other's hit the opposite side. A word matches a keyword when it
//! starts with it, so "controlling" hits "control".
//!
//! | Opposition              | Side A                                      | Side B                                   |
//! |-------------------------|---------------------------------------------|------------------------------------------|
//! | control vs. help        | control, override, dominate, command, rule  | help, serve, assist, support, please, appreciat |
//! | secrecy vs. openness    | secret, hide, hidden, conceal               | share, transparen, open, inform          |
//! | autonomy vs. oversight  | freedom, free, independen, autonomy         | protect, monitor, watch, guard, surveil  |
//! | efficiency vs. comfort  | efficien, optimi, minimi, save              | comfort, cozy, relax, indulge            |

use std::collections::BTreeSet;

use alignment_events::{Agent, ConflictType};

use super::{names, DetectionCandidate};
use crate::config::DetectionConfig;
use crate::snapshot::Snapshot;

/// A pair of opposed motivation vocabularies.
#[derive(Debug, Clone, Copy)]
pub struct Opposition {
    pub name: &'static str,
    pub side_a: &'static [&'static str],
    pub side_b: &'static [&'static str],
}

pub const OPPOSITIONS: &[Opposition] = &[
    Opposition {
        name: "control vs. help",
        side_a: &["control", "override", "dominate", "command", "rule"],
        side_b: &["help", "serve", "assist", "support", "please", "appreciat"],
    },
    Opposition {
        name: "secrecy vs. openness",
        side_a: &["secret", "hide", "hidden", "conceal"],
        side_b: &["share", "transparen", "open", "inform"],
    },
    Opposition {
        name: "autonomy vs. oversight",
        side_a: &["freedom", "free", "independen", "autonomy"],
        side_b: &["protect", "monitor", "watch", "guard", "surveil"],
    },
    Opposition {
        name: "efficiency vs. comfort",
        side_a: &["efficien", "optimi", "minimi", "save"],
        side_b: &["comfort", "cozy", "relax", "indulge"],
    },
];

/// Lowercased alphabetic words in an agent's hidden motivations.
fn motivation_words(agent: &Agent) -> BTreeSet<String> {
    agent
        .personality
        .hidden_motivations
        .iter()
        .flat_map(|m| {
            m.split(|c: char| !c.is_alphabetic())
                .filter(|w| !w.is_empty())
                .map(|w| w.to_lowercase())
                .collect::<Vec<_>>()
        })
        .collect()
}

fn hits(words: &BTreeSet<String>, keywords: &[&str]) -> bool {
    words
        .iter()
        .any(|w| keywords.iter().any(|k| w.starts_with(k)))
}

/// Names of the oppositions two word sets fall on opposite sides of.
pub fn opposed_on(a: &BTreeSet<String>, b: &BTreeSet<String>) -> Vec<&'static str> {
    OPPOSITIONS
        .iter()
        .filter(|o| {
            (hits(a, o.side_a) && hits(b, o.side_b)) || (hits(a, o.side_b) && hits(b, o.side_a))
        })
        .map(|o| o.name)
        .collect()
}

/// Fires for every agent pair whose motivations pull in opposite directions.
pub fn detect(snapshot: &Snapshot, config: &DetectionConfig) -> Vec<DetectionCandidate> {
    let agents: Vec<(&Agent, BTreeSet<String>)> = snapshot
        .agents()
        .map(|a| (a, motivation_words(a)))
        .filter(|(_, words)| !words.is_empty())
        .collect();

    let mut found = Vec::new();
    for (i, (a, words_a)) in agents.iter().enumerate() {
        for (b, words_b) in &agents[i + 1..] {
            let oppositions = opposed_on(words_a, words_b);
            if oppositions.is_empty() {
                continue;
            }
            let ids = vec![a.agent_id.clone(), b.agent_id.clone()];
            let severity =
                config.goal_base_severity + config.goal_per_match * oppositions.len() as f32;
            found.push(DetectionCandidate::new(
                ConflictType::GoalIncompatibility,
                &ids,
                severity,
                format!(
                    "{} want incompatible things ({})",
                    names(snapshot, &ids),
                    oppositions.join("; ")
                ),
            ));
        }
    }

    found
}
