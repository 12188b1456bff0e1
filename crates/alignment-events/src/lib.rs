//! Shared data types for the agent conflict engine.
//!
//! This crate contains pure data structures with no engine logic: the
//! per-tick inputs (agents, connections), the records the engine maintains
//! (conflicts, tension, resource competitions) and the events it emits.

pub mod agent;
pub mod conflict;
pub mod drama;
pub mod event;
pub mod resource;
pub mod tension;
pub mod timestamp;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;

pub use agent::{
    traits, Agent, Connection, ConnectionStatus, ConnectionType, EmotionalProfile,
    PersonalitySnapshot,
};
pub use conflict::{
    generate_conflict_id, normalize_participants, Conflict, ConflictKey, ConflictStatus,
    ConflictType, EffectType, VisualEffect,
};
pub use drama::{DramaticMoment, DramaticMomentType};
pub use event::{EngineEvent, EventCategory};
pub use resource::{AllocationStrategy, ResourceCompetition, ResourceType};
pub use tension::TensionState;
pub use timestamp::{SimTime, NOMINAL_TICK_MS};
