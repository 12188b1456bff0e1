//! Agent conflict engine: tension, conflict detection and resource arbitration.
//!
//! The engine watches a household of AI agents tick by tick and turns their
//! personalities and interaction statistics into narrative state: who is
//! tense, who is fighting with whom, and which capacities are contested.
//!
//! # Tick pipeline
//!
//! ```text
//! TickInput ─▶ Snapshot ─▶ tension ─▶ detection ─▶ arbitration ─▶ reconcile
//!                                                                    │
//!        listeners ◀─ notification ◀─ effect refresh ◀─ classification
//! ```
//!
//! Everything runs synchronously on the caller's thread. Listeners receive a
//! [`ListenerContext`] through which they may resolve conflicts or reset the
//! engine while the tick is still being delivered.
//!
//! # Modules
//!
//! - [`snapshot`]: Per-tick input validation
//! - [`tension`]: Per-agent tension dynamics
//! - [`detection`]: Conflict detectors and the merge policy
//! - [`arbiter`]: Resource demand model and contention
//! - [`lifecycle`]: Active store and resolved history
//! - [`drama`]: Edge-triggered dramatic moments
//! - [`effects`]: Visual effect templates
//! - [`notifier`]: Single-slot listener dispatch
//! - [`config`]: TOML configuration

pub mod arbiter;
pub mod config;
pub mod detection;
pub mod drama;
pub mod effects;
pub mod lifecycle;
pub mod notifier;
pub mod snapshot;
pub mod tension;

pub use arbiter::{contention_intensity, ArbitrationOutcome, ResourceArbiter};
pub use config::{
    default_config_toml, ConfigError, DetectionConfig, DramaConfig, EffectConfig, EngineConfig,
    ResourceConfig, TensionConfig,
};
pub use detection::{ConflictDetectionEngine, DetectionCandidate, ReconcileOutcome};
pub use drama::DramaticMomentClassifier;
pub use effects::{EffectDirector, ParticipantTone};
pub use lifecycle::ConflictLifecycleManager;
pub use notifier::{EventNotifier, Listener, ListenerError, ListenerResult};
pub use snapshot::{Snapshot, TickInput};
pub use tension::TensionTracker;

use std::collections::VecDeque;
use std::path::Path;

use alignment_events::{
    Conflict, DramaticMoment, EngineEvent, ResourceCompetition, ResourceType, SimTime,
    TensionState,
};
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur constructing an engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Error loading or validating configuration
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// The engine's mutable stores.
#[derive(Debug)]
pub(crate) struct EngineState {
    tension: TensionTracker,
    lifecycle: ConflictLifecycleManager,
    arbiter: ResourceArbiter,
    classifier: DramaticMomentClassifier,
    clock: SimTime,
    tick: u64,
}

impl EngineState {
    pub(crate) fn new(config: &EngineConfig) -> Self {
        Self {
            tension: TensionTracker::new(config.tension.clone()),
            lifecycle: ConflictLifecycleManager::new(),
            arbiter: ResourceArbiter::new(config.resources.clone()),
            classifier: DramaticMomentClassifier::new(config.drama.clone()),
            clock: SimTime::ZERO,
            tick: 0,
        }
    }

    /// Resolves an active conflict and queues the resolution event.
    fn resolve(&mut self, conflict_id: &str, pending: &mut VecDeque<EngineEvent>) -> bool {
        match self.lifecycle.resolve(conflict_id, self.clock) {
            Some(conflict) => {
                tracing::info!(
                    "Resolved {} ({}) at {}",
                    conflict.conflict_id,
                    conflict.conflict_type.label(),
                    self.clock
                );
                pending.push_back(EngineEvent::ConflictResolved(conflict));
                true
            }
            None => {
                tracing::debug!("Cannot resolve {}: not an active conflict", conflict_id);
                false
            }
        }
    }

    fn clear(&mut self) {
        self.tension.clear();
        self.lifecycle.clear();
        self.arbiter.clear();
        self.classifier.clear();
        self.clock = SimTime::ZERO;
        self.tick = 0;
    }
}

/// Engine access handed to listeners during dispatch.
///
/// Events raised through the context, such as a resolution, are queued and
/// delivered later in the same dispatch pass.
pub struct ListenerContext<'a> {
    state: &'a mut EngineState,
    pending: &'a mut VecDeque<EngineEvent>,
    dispose_requested: bool,
}

impl<'a> ListenerContext<'a> {
    pub(crate) fn new(state: &'a mut EngineState, pending: &'a mut VecDeque<EngineEvent>) -> Self {
        Self {
            state,
            pending,
            dispose_requested: false,
        }
    }

    /// Current simulation time.
    pub fn now(&self) -> SimTime {
        self.state.clock
    }

    /// Current tick number.
    pub fn tick(&self) -> u64 {
        self.state.tick
    }

    pub fn active_conflicts(&self) -> Vec<Conflict> {
        self.state.lifecycle.active()
    }

    pub fn conflict(&self, conflict_id: &str) -> Option<Conflict> {
        self.state.lifecycle.get(conflict_id).cloned()
    }

    pub fn tension_of(&self, agent_id: &str) -> Option<TensionState> {
        self.state.tension.get(agent_id).cloned()
    }

    /// Resolves an active conflict. Returns false if it isn't active.
    pub fn resolve_conflict(&mut self, conflict_id: &str) -> bool {
        self.state.resolve(conflict_id, self.pending)
    }

    /// Clears every store and drops events not yet delivered.
    pub fn reset(&mut self) {
        self.state.clear();
        self.pending.clear();
    }

    /// Like [`reset`](Self::reset), and also drops every listener once the
    /// current listener returns.
    pub fn dispose(&mut self) {
        self.reset();
        self.dispose_requested = true;
    }
}

/// What a single tick did.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub now: SimTime,
    /// Conflicts created this tick
    pub created: Vec<String>,
    /// Conflicts re-detected this tick
    pub reinforced: Vec<String>,
    /// Conflicts not re-detected this tick
    pub decayed: Vec<String>,
    pub competitions_formed: Vec<ResourceType>,
    pub competitions_ended: Vec<ResourceType>,
    pub moments: Vec<DramaticMoment>,
    /// Agents whose tension rose this tick
    pub escalated_agents: Vec<String>,
    /// Input records skipped as malformed
    pub skipped_inputs: usize,
    pub listener_failures: usize,
}

/// Aggregate view of engine state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineStats {
    pub tick: u64,
    pub clock: SimTime,
    pub active_conflicts: usize,
    pub resolved_conflicts: usize,
    pub competitions: usize,
    pub tracked_agents: usize,
    pub mean_tension: f32,
    pub max_tension: f32,
}

/// The conflict engine.
///
/// Owns every store; independent engines never share state. All getters
/// return copies.
#[derive(Debug)]
pub struct ConflictEngine {
    config: EngineConfig,
    detector: ConflictDetectionEngine,
    effects: EffectDirector,
    state: EngineState,
    notifier: EventNotifier,
}

impl ConflictEngine {
    /// Creates an engine after validating the configuration.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    /// Creates an engine from a configuration file.
    pub fn from_config_file(path: &Path) -> Result<Self, EngineError> {
        let config = EngineConfig::from_file(path)?;
        Self::new(config)
    }

    /// Creates an engine with default configuration.
    pub fn with_defaults() -> Self {
        Self::build(EngineConfig::default())
    }

    fn build(config: EngineConfig) -> Self {
        Self {
            detector: ConflictDetectionEngine::new(config.detection.clone()),
            effects: EffectDirector::new(config.effects.clone()),
            state: EngineState::new(&config),
            notifier: EventNotifier::new(),
            config,
        }
    }

    /// Runs one analysis tick.
    ///
    /// 1. Validates the input into a snapshot and advances the clock
    /// 2. Updates tension from the conflicts carried over from last tick
    /// 3. Runs the detectors
    /// 4. Arbitrates resources and promotes intense competitions
    /// 5. Reconciles detections with the active store
    /// 6. Classifies dramatic moments
    /// 7. Refreshes visual effects
    /// 8. Notifies listeners
    pub fn tick(&mut self, input: &TickInput) -> TickReport {
        let snapshot = Snapshot::build(input);
        let state = &mut self.state;
        state.tick += 1;
        state.clock = state.clock.advanced_by(input.elapsed_ms);
        let now = state.clock;

        // 2. Tension
        let carried = state.lifecycle.active();
        let escalated = state
            .tension
            .update(&snapshot, &carried, input.elapsed_ms, now);

        // 3. Detection
        let mut candidates = self.detector.detect(&snapshot);

        // 4. Arbitration
        let arbitration = state.arbiter.arbitrate(&snapshot);
        let competitions = state.arbiter.competitions();
        candidates.extend(self.detector.promote_competitions(&competitions));

        // 5. Reconcile
        let reconciled = self
            .detector
            .reconcile(candidates, &mut state.lifecycle, now);

        // 6. Classification
        let active = state.lifecycle.active();
        let tensions = state.tension.states();
        let moments = state
            .classifier
            .classify(&tensions, &competitions, &active, now);

        // 7. Effects
        self.effects
            .refresh(&mut state.lifecycle, &snapshot, &state.tension);

        tracing::debug!(
            "Tick {}: {} created, {} reinforced, {} decayed, {} competitions, {} moments",
            state.tick,
            reconciled.created.len(),
            reconciled.reinforced.len(),
            reconciled.decayed.len(),
            competitions.len(),
            moments.len()
        );

        // 8. Notification
        let mut events = VecDeque::new();
        for conflict_id in &reconciled.created {
            if let Some(conflict) = state.lifecycle.get(conflict_id) {
                events.push_back(EngineEvent::ConflictDetected(conflict.clone()));
            }
        }
        events.extend(escalated.iter().cloned().map(EngineEvent::TensionEscalated));
        for resource in &arbitration.formed {
            if let Some(competition) = state.arbiter.get(*resource) {
                events.push_back(EngineEvent::ResourceCompetitionDetected(competition.clone()));
            }
        }
        events.extend(moments.iter().cloned().map(EngineEvent::DramaticMoment));

        let tick = state.tick;
        let listener_failures = self.dispatch(events);

        TickReport {
            tick,
            now,
            created: reconciled.created,
            reinforced: reconciled.reinforced,
            decayed: reconciled.decayed,
            competitions_formed: arbitration.formed,
            competitions_ended: arbitration.ended,
            moments,
            escalated_agents: escalated.into_iter().map(|t| t.agent_id).collect(),
            skipped_inputs: snapshot.skipped(),
            listener_failures,
        }
    }

    /// Delivers queued events, including any raised by listeners along the
    /// way. Returns the number of listener failures.
    fn dispatch(&mut self, mut pending: VecDeque<EngineEvent>) -> usize {
        if pending.is_empty() {
            return 0;
        }

        // Listeners can't reach the engine itself, so the registry is free
        // to move out for the duration of the pass.
        let mut notifier = std::mem::take(&mut self.notifier);
        let mut failures = 0;
        let mut dispose = false;

        while let Some(event) = pending.pop_front() {
            let mut ctx = ListenerContext::new(&mut self.state, &mut pending);
            if !notifier.dispatch(&event, &mut ctx) {
                failures += 1;
            }
            if ctx.dispose_requested {
                dispose = true;
            }
        }

        if dispose {
            notifier.clear();
        }
        self.notifier = notifier;
        failures
    }

    /// Copies of all active conflicts, in creation order.
    pub fn active_conflicts(&self) -> Vec<Conflict> {
        self.state.lifecycle.active()
    }

    /// Copies of all resolved conflicts, in resolution order.
    pub fn conflict_history(&self) -> Vec<Conflict> {
        self.state.lifecycle.history()
    }

    /// Copies of all tension states, ordered by agent ID.
    pub fn tension_states(&self) -> Vec<TensionState> {
        self.state.tension.states()
    }

    /// Copies of all current competitions, at most one per resource.
    pub fn resource_competitions(&self) -> Vec<ResourceCompetition> {
        self.state.arbiter.competitions()
    }

    /// Gets a copy of an active conflict.
    pub fn conflict(&self, conflict_id: &str) -> Option<Conflict> {
        self.state.lifecycle.get(conflict_id).cloned()
    }

    pub fn tension_of(&self, agent_id: &str) -> Option<TensionState> {
        self.state.tension.get(agent_id).cloned()
    }

    /// Resolves an active conflict and notifies the resolution listener.
    ///
    /// Returns false, changing nothing, if the ID isn't active.
    pub fn resolve_conflict(&mut self, conflict_id: &str) -> bool {
        let mut pending = VecDeque::new();
        let resolved = self.state.resolve(conflict_id, &mut pending);
        self.dispatch(pending);
        resolved
    }

    pub fn stats(&self) -> EngineStats {
        let levels: Vec<f32> = self
            .state
            .tension
            .states()
            .iter()
            .map(|t| t.level)
            .collect();
        let mean_tension = if levels.is_empty() {
            0.0
        } else {
            levels.iter().sum::<f32>() / levels.len() as f32
        };
        let max_tension = levels.iter().copied().fold(0.0, f32::max);

        EngineStats {
            tick: self.state.tick,
            clock: self.state.clock,
            active_conflicts: self.state.lifecycle.active_count(),
            resolved_conflicts: self.state.lifecycle.resolved_count(),
            competitions: self.state.arbiter.len(),
            tracked_agents: self.state.tension.len(),
            mean_tension,
            max_tension,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the current tick.
    pub fn current_tick(&self) -> u64 {
        self.state.tick
    }

    /// Returns the current simulation time.
    pub fn now(&self) -> SimTime {
        self.state.clock
    }

    /// Registers the conflict-detected listener, replacing any previous one.
    pub fn on_conflict_detected<F>(&mut self, listener: F) -> bool
    where
        F: FnMut(&Conflict, &mut ListenerContext<'_>) -> ListenerResult + 'static,
    {
        self.notifier.on_conflict_detected(Box::new(listener))
    }

    /// Registers the tension-escalated listener, replacing any previous one.
    pub fn on_tension_escalated<F>(&mut self, listener: F) -> bool
    where
        F: FnMut(&TensionState, &mut ListenerContext<'_>) -> ListenerResult + 'static,
    {
        self.notifier.on_tension_escalated(Box::new(listener))
    }

    /// Registers the competition-detected listener, replacing any previous one.
    pub fn on_resource_competition_detected<F>(&mut self, listener: F) -> bool
    where
        F: FnMut(&ResourceCompetition, &mut ListenerContext<'_>) -> ListenerResult + 'static,
    {
        self.notifier.on_resource_competition_detected(Box::new(listener))
    }

    /// Registers the conflict-resolved listener, replacing any previous one.
    pub fn on_conflict_resolved<F>(&mut self, listener: F) -> bool
    where
        F: FnMut(&Conflict, &mut ListenerContext<'_>) -> ListenerResult + 'static,
    {
        self.notifier.on_conflict_resolved(Box::new(listener))
    }

    /// Registers the dramatic-moment listener, replacing any previous one.
    pub fn on_dramatic_moment<F>(&mut self, listener: F) -> bool
    where
        F: FnMut(&DramaticMoment, &mut ListenerContext<'_>) -> ListenerResult + 'static,
    {
        self.notifier.on_dramatic_moment(Box::new(listener))
    }

    /// Clears every store and edge-trigger memory. Listeners stay registered.
    pub fn reset(&mut self) {
        self.state.clear();
        tracing::info!("Engine reset");
    }

    /// Clears every store and drops every listener.
    pub fn dispose(&mut self) {
        self.state.clear();
        self.notifier.clear();
        tracing::info!("Engine disposed");
    }
}

impl Default for ConflictEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}
