//! Resource Competition Types
//!
//! Modeled contention for abstract device capacities.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Abstract capacity agents compete for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Energy,
    Bandwidth,
    Processing,
    Memory,
}

impl ResourceType {
    pub const ALL: [ResourceType; 4] = [
        ResourceType::Energy,
        ResourceType::Bandwidth,
        ResourceType::Processing,
        ResourceType::Memory,
    ];

    /// The fixed allocation strategy for this resource.
    pub fn allocation_strategy(&self) -> AllocationStrategy {
        match self {
            ResourceType::Energy => AllocationStrategy::PriorityByReliability,
            ResourceType::Bandwidth => AllocationStrategy::ProportionalShare,
            ResourceType::Processing => AllocationStrategy::RoundRobinPreemptive,
            ResourceType::Memory => AllocationStrategy::FirstComeReservation,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResourceType::Energy => "energy",
            ResourceType::Bandwidth => "bandwidth",
            ResourceType::Processing => "processing",
            ResourceType::Memory => "memory",
        }
    }
}

/// How a contested resource would be shared. Descriptive metadata only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationStrategy {
    /// Most reliable agent served first
    PriorityByReliability,
    /// Each agent gets a share proportional to demand
    ProportionalShare,
    /// Time slices with preemption of long holders
    RoundRobinPreemptive,
    /// Earliest reservation holds the capacity
    FirstComeReservation,
}

/// Active contention for one resource type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceCompetition {
    pub resource_type: ResourceType,
    /// Sorted competing agent ids (at least two)
    pub competitors: Vec<String>,
    /// Competition intensity, 0.0 to 1.0
    pub intensity: f32,
    pub allocation_strategy: AllocationStrategy,
    /// Modeled demand per competing agent, 0.0 to 1.0
    pub usage: BTreeMap<String, f32>,
}

impl ResourceCompetition {
    /// Checks if an agent is competing.
    pub fn involves(&self, agent_id: &str) -> bool {
        self.competitors.iter().any(|c| c == agent_id)
    }
}
