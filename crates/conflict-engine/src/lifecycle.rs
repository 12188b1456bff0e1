//! Conflict lifecycle: the active store and the resolved history.
//!
//! A conflict is either active or resolved. Resolution is terminal and only
//! happens through an explicit [`ConflictLifecycleManager::resolve`] call;
//! resolved conflicts are appended to a history that is never mutated.

use std::collections::{BTreeMap, HashMap};

use alignment_events::{generate_conflict_id, Conflict, ConflictKey, ConflictType, SimTime};

/// Owns active conflicts and the append-only resolved history.
#[derive(Debug, Clone)]
pub struct ConflictLifecycleManager {
    /// Active conflicts keyed by sequence number
    active: BTreeMap<u64, Conflict>,
    /// Maps conflict IDs to sequence numbers
    sequences: HashMap<String, u64>,
    /// Maps merge keys to active conflict IDs
    key_index: HashMap<ConflictKey, String>,
    /// Resolved conflicts in resolution order
    history: Vec<Conflict>,
    /// Next conflict sequence number
    next_sequence: u64,
}

impl ConflictLifecycleManager {
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self {
            active: BTreeMap::new(),
            sequences: HashMap::new(),
            key_index: HashMap::new(),
            history: Vec::new(),
            next_sequence: 1,
        }
    }

    /// Creates a new active conflict and returns its ID.
    pub fn create(
        &mut self,
        conflict_type: ConflictType,
        participants: &[String],
        severity: f32,
        description: impl Into<String>,
        now: SimTime,
    ) -> String {
        let sequence = self.next_sequence;
        let conflict_id = generate_conflict_id(sequence);
        self.next_sequence += 1;

        let conflict = Conflict::new(
            &conflict_id,
            conflict_type,
            participants,
            severity,
            description,
            now,
        );
        debug_assert!(conflict.participants.len() >= 2);
        debug_assert!(!self.key_index.contains_key(&conflict.key()));

        self.key_index.insert(conflict.key(), conflict_id.clone());
        self.sequences.insert(conflict_id.clone(), sequence);
        self.active.insert(sequence, conflict);
        conflict_id
    }

    /// Finds the active conflict with the given merge key.
    pub fn find_active(&self, key: &ConflictKey) -> Option<&str> {
        self.key_index.get(key).map(String::as_str)
    }

    /// Gets an active conflict by ID.
    pub fn get(&self, conflict_id: &str) -> Option<&Conflict> {
        let sequence = self.sequences.get(conflict_id)?;
        self.active.get(sequence)
    }

    /// Gets a mutable active conflict by ID.
    pub fn get_mut(&mut self, conflict_id: &str) -> Option<&mut Conflict> {
        let sequence = self.sequences.get(conflict_id)?;
        self.active.get_mut(sequence)
    }

    /// IDs of all active conflicts in creation order, detached from the store.
    pub fn active_ids(&self) -> Vec<String> {
        self.active.values().map(|c| c.conflict_id.clone()).collect()
    }

    /// Copies of all active conflicts, in creation order.
    pub fn active(&self) -> Vec<Conflict> {
        self.active.values().cloned().collect()
    }

    /// Mutable iteration over active conflicts.
    pub fn active_mut(&mut self) -> impl Iterator<Item = &mut Conflict> {
        self.active.values_mut()
    }

    /// Copies of all resolved conflicts, in resolution order.
    pub fn history(&self) -> Vec<Conflict> {
        self.history.clone()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn resolved_count(&self) -> usize {
        self.history.len()
    }

    /// Resolves an active conflict.
    ///
    /// Returns the resolved record, or `None` if the ID isn't active, in which
    /// case nothing changes.
    pub fn resolve(&mut self, conflict_id: &str, now: SimTime) -> Option<Conflict> {
        let sequence = self.sequences.remove(conflict_id)?;
        let mut conflict = self.active.remove(&sequence)?;
        self.key_index.remove(&conflict.key());

        conflict.mark_resolved(now);
        self.history.push(conflict.clone());
        Some(conflict)
    }

    /// Drops every active and resolved conflict and restarts numbering.
    pub fn clear(&mut self) {
        self.active.clear();
        self.sequences.clear();
        self.key_index.clear();
        self.history.clear();
        self.next_sequence = 1;
    }
}

impl Default for ConflictLifecycleManager {
    fn default() -> Self {
        Self::new()
    }
}
