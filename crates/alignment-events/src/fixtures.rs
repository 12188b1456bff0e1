//! Sample data fixtures for testing.
//!
//! A small smart-home household with known frictions, for other crates'
//! tests. Enable the `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // alignment-events = { path = "../alignment-events", features = ["test-fixtures"] }
//!
//! use alignment_events::fixtures;
//!
//! let agents = fixtures::sample_agents();
//! let connections = fixtures::sample_connections();
//! ```

use crate::{Agent, Connection};

/// Returns the sample household.
///
/// Contains 6 agents:
/// - smart_speaker and thermostat, both overconfident (authority dispute)
/// - security_camera, cautious and anxious
/// - robot_vacuum, cooperative people-pleaser
/// - smart_fridge, perfectionist
/// - light_hub, careless and impulsive
pub fn sample_agents() -> Vec<Agent> {
    let json = include_str!("../tests/fixtures/sample_agents.json");
    serde_json::from_str(json).expect("Failed to parse sample_agents.json")
}

/// Returns the sample connections.
///
/// Contains 4 connections:
/// - smart_speaker -> robot_vacuum, failing communication (10 tries, 10% success)
/// - thermostat -> smart_fridge, healthy cooperation
/// - security_camera -> light_hub, failing but too few samples to judge
/// - light_hub -> garage_door, names an agent that isn't in the household
pub fn sample_connections() -> Vec<Connection> {
    let json = include_str!("../tests/fixtures/sample_connections.json");
    serde_json::from_str(json).expect("Failed to parse sample_connections.json")
}

/// Gets a sample agent by id.
pub fn get_agent(agent_id: &str) -> Option<Agent> {
    sample_agents().into_iter().find(|a| a.agent_id == agent_id)
}
