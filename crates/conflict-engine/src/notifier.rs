//! Event notification.
//!
//! One listener slot per event category; registering again replaces the
//! previous listener. Listener failures, whether returned errors or panics,
//! are logged and contained to the event that triggered them.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

use alignment_events::{
    Conflict, DramaticMoment, EngineEvent, EventCategory, ResourceCompetition, TensionState,
};
use thiserror::Error;

use crate::ListenerContext;

/// Error a listener can return to report that it failed.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ListenerError(String);

impl ListenerError {
    pub fn new(message: impl fmt::Display) -> Self {
        Self(message.to_string())
    }
}

impl From<&str> for ListenerError {
    fn from(message: &str) -> Self {
        Self(message.to_string())
    }
}

impl From<String> for ListenerError {
    fn from(message: String) -> Self {
        Self(message)
    }
}

pub type ListenerResult = Result<(), ListenerError>;

/// A listener for events carrying payload `T`.
pub type Listener<T> = Box<dyn FnMut(&T, &mut ListenerContext<'_>) -> ListenerResult>;

/// Single-slot listener registry.
#[derive(Default)]
pub struct EventNotifier {
    conflict_detected: Option<Listener<Conflict>>,
    tension_escalated: Option<Listener<TensionState>>,
    resource_competition_detected: Option<Listener<ResourceCompetition>>,
    conflict_resolved: Option<Listener<Conflict>>,
    dramatic_moment: Option<Listener<DramaticMoment>>,
}

impl EventNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the conflict-detected listener. Returns true if one was replaced.
    pub fn on_conflict_detected(&mut self, listener: Listener<Conflict>) -> bool {
        self.conflict_detected.replace(listener).is_some()
    }

    pub fn on_tension_escalated(&mut self, listener: Listener<TensionState>) -> bool {
        self.tension_escalated.replace(listener).is_some()
    }

    pub fn on_resource_competition_detected(
        &mut self,
        listener: Listener<ResourceCompetition>,
    ) -> bool {
        self.resource_competition_detected.replace(listener).is_some()
    }

    pub fn on_conflict_resolved(&mut self, listener: Listener<Conflict>) -> bool {
        self.conflict_resolved.replace(listener).is_some()
    }

    pub fn on_dramatic_moment(&mut self, listener: Listener<DramaticMoment>) -> bool {
        self.dramatic_moment.replace(listener).is_some()
    }

    /// Checks whether a category has a listener.
    pub fn has_listener(&self, category: EventCategory) -> bool {
        match category {
            EventCategory::ConflictDetected => self.conflict_detected.is_some(),
            EventCategory::TensionEscalated => self.tension_escalated.is_some(),
            EventCategory::ResourceCompetitionDetected => {
                self.resource_competition_detected.is_some()
            }
            EventCategory::ConflictResolved => self.conflict_resolved.is_some(),
            EventCategory::DramaticMoment => self.dramatic_moment.is_some(),
        }
    }

    /// Removes the listener for a category.
    pub fn remove(&mut self, category: EventCategory) {
        match category {
            EventCategory::ConflictDetected => self.conflict_detected = None,
            EventCategory::TensionEscalated => self.tension_escalated = None,
            EventCategory::ResourceCompetitionDetected => {
                self.resource_competition_detected = None
            }
            EventCategory::ConflictResolved => self.conflict_resolved = None,
            EventCategory::DramaticMoment => self.dramatic_moment = None,
        }
    }

    /// Removes every listener.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Delivers an event to its category's listener, if any.
    ///
    /// Returns false only when a listener was present and failed.
    pub fn dispatch(&mut self, event: &EngineEvent, ctx: &mut ListenerContext<'_>) -> bool {
        match event {
            EngineEvent::ConflictDetected(c) => deliver(&mut self.conflict_detected, c, ctx, event),
            EngineEvent::TensionEscalated(t) => deliver(&mut self.tension_escalated, t, ctx, event),
            EngineEvent::ResourceCompetitionDetected(r) => {
                deliver(&mut self.resource_competition_detected, r, ctx, event)
            }
            EngineEvent::ConflictResolved(c) => deliver(&mut self.conflict_resolved, c, ctx, event),
            EngineEvent::DramaticMoment(m) => deliver(&mut self.dramatic_moment, m, ctx, event),
        }
    }
}

fn deliver<T>(
    slot: &mut Option<Listener<T>>,
    payload: &T,
    ctx: &mut ListenerContext<'_>,
    event: &EngineEvent,
) -> bool {
    let Some(listener) = slot.as_mut() else {
        return true;
    };

    match catch_unwind(AssertUnwindSafe(|| listener(payload, ctx))) {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            tracing::error!("Listener for {} failed: {}", event.category(), e);
            false
        }
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::error!("Listener for {} panicked: {}", event.category(), message);
            false
        }
    }
}

impl fmt::Debug for EventNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventNotifier")
            .field("conflict_detected", &self.conflict_detected.is_some())
            .field("tension_escalated", &self.tension_escalated.is_some())
            .field(
                "resource_competition_detected",
                &self.resource_competition_detected.is_some(),
            )
            .field("conflict_resolved", &self.conflict_resolved.is_some())
            .field("dramatic_moment", &self.dramatic_moment.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EngineState;
    use crate::config::EngineConfig;
    use alignment_events::{ConflictType, SimTime};
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    fn detected() -> EngineEvent {
        let participants = vec!["a".to_string(), "b".to_string()];
        EngineEvent::ConflictDetected(Conflict::new(
            "conf_00001",
            ConflictType::PersonalityClash,
            &participants,
            0.5,
            "",
            SimTime::ZERO,
        ))
    }

    fn with_ctx<R>(f: impl FnOnce(&mut ListenerContext<'_>) -> R) -> R {
        let mut state = EngineState::new(&EngineConfig::default());
        let mut pending = VecDeque::new();
        let mut ctx = ListenerContext::new(&mut state, &mut pending);
        f(&mut ctx)
    }

    #[test]
    fn test_last_registration_wins() {
        let mut notifier = EventNotifier::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let first = Rc::clone(&log);
        assert!(!notifier.on_conflict_detected(Box::new(move |_, _| {
            first.borrow_mut().push("first");
            Ok(())
        })));
        let second = Rc::clone(&log);
        assert!(notifier.on_conflict_detected(Box::new(move |_, _| {
            second.borrow_mut().push("second");
            Ok(())
        })));

        with_ctx(|ctx| notifier.dispatch(&detected(), ctx));

        assert_eq!(*log.borrow(), vec!["second"]);
    }

    #[test]
    fn test_missing_listener_is_not_a_failure() {
        let mut notifier = EventNotifier::new();
        assert!(with_ctx(|ctx| notifier.dispatch(&detected(), ctx)));
        assert!(!notifier.has_listener(EventCategory::ConflictDetected));
    }

    #[test]
    fn test_listener_error_contained() {
        let mut notifier = EventNotifier::new();
        notifier.on_conflict_detected(Box::new(|_, _| Err("boom".into())));

        assert!(!with_ctx(|ctx| notifier.dispatch(&detected(), ctx)));
        // Still registered and callable
        assert!(notifier.has_listener(EventCategory::ConflictDetected));
    }

    #[test]
    fn test_listener_panic_contained() {
        let mut notifier = EventNotifier::new();
        notifier.on_conflict_detected(Box::new(|_, _| panic!("listener exploded")));

        assert!(!with_ctx(|ctx| notifier.dispatch(&detected(), ctx)));
    }

    #[test]
    fn test_remove_and_clear() {
        let mut notifier = EventNotifier::new();
        notifier.on_dramatic_moment(Box::new(|_, _| Ok(())));
        notifier.on_conflict_resolved(Box::new(|_, _| Ok(())));

        notifier.remove(EventCategory::DramaticMoment);
        assert!(!notifier.has_listener(EventCategory::DramaticMoment));
        assert!(notifier.has_listener(EventCategory::ConflictResolved));

        notifier.clear();
        assert!(!notifier.has_listener(EventCategory::ConflictResolved));
    }
}
