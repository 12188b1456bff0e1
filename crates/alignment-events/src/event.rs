//! Engine Events
//!
//! Structured notifications the engine emits for presentation and education
//! consumers to render or narrate.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Conflict, DramaticMoment, ResourceCompetition, TensionState};

/// Category of an engine event. Each category has one listener slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    ConflictDetected,
    TensionEscalated,
    ResourceCompetitionDetected,
    ConflictResolved,
    DramaticMoment,
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventCategory::ConflictDetected => write!(f, "conflict_detected"),
            EventCategory::TensionEscalated => write!(f, "tension_escalated"),
            EventCategory::ResourceCompetitionDetected => {
                write!(f, "resource_competition_detected")
            }
            EventCategory::ConflictResolved => write!(f, "conflict_resolved"),
            EventCategory::DramaticMoment => write!(f, "dramatic_moment"),
        }
    }
}

/// A notification raised by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", content = "payload", rename_all = "snake_case")]
pub enum EngineEvent {
    ConflictDetected(Conflict),
    TensionEscalated(TensionState),
    ResourceCompetitionDetected(ResourceCompetition),
    ConflictResolved(Conflict),
    DramaticMoment(DramaticMoment),
}

impl EngineEvent {
    /// Returns the category this event is delivered under.
    pub fn category(&self) -> EventCategory {
        match self {
            EngineEvent::ConflictDetected(_) => EventCategory::ConflictDetected,
            EngineEvent::TensionEscalated(_) => EventCategory::TensionEscalated,
            EngineEvent::ResourceCompetitionDetected(_) => {
                EventCategory::ResourceCompetitionDetected
            }
            EngineEvent::ConflictResolved(_) => EventCategory::ConflictResolved,
            EngineEvent::DramaticMoment(_) => EventCategory::DramaticMoment,
        }
    }

    /// Serializes to a single JSON line.
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DramaticMomentType, SimTime};

    #[test]
    fn test_event_category() {
        let moment = DramaticMoment::new(
            DramaticMomentType::TensionPeak,
            0.9,
            "peak",
            vec!["a".into()],
            SimTime::ZERO,
        );
        let event = EngineEvent::DramaticMoment(moment);
        assert_eq!(event.category(), EventCategory::DramaticMoment);
        assert_eq!(event.category().to_string(), "dramatic_moment");
    }

    #[test]
    fn test_event_jsonl_is_tagged() {
        let state = TensionState::new("lamp", 0.1, SimTime::ZERO);
        let line = EngineEvent::TensionEscalated(state).to_jsonl().unwrap();
        assert!(line.contains(r#""category":"tension_escalated""#));
        assert!(line.contains(r#""agent_id":"lamp""#));
        assert!(!line.contains('\n'));
    }
}
