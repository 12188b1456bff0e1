//! Integration tests for the conflict engine.
//!
//! These drive the full tick pipeline, mostly over the sample household
//! fixture, and observe it through the public queries and listeners.

use std::cell::RefCell;
use std::fs;
use std::io::Write;
use std::rc::Rc;

use alignment_events::fixtures::{sample_agents, sample_connections};
use alignment_events::{
    Agent, Connection, ConnectionType, ConflictType, EngineEvent, PersonalitySnapshot,
    ResourceType,
};
use conflict_engine::{ConflictEngine, EngineConfig, ListenerError, TickInput};
use tempfile::{tempdir, NamedTempFile};

fn household() -> TickInput {
    TickInput::new(sample_agents(), sample_connections(), 1000)
}

fn agent(id: &str, traits: &[&str]) -> Agent {
    Agent::new(id, PersonalitySnapshot::new(traits))
}

fn count_of(engine: &ConflictEngine, conflict_type: ConflictType) -> usize {
    engine
        .active_conflicts()
        .iter()
        .filter(|c| c.conflict_type == conflict_type)
        .count()
}

/// Two overconfident agents: one authority dispute, one detection callback.
#[test]
fn test_scenario_authority_dispute() {
    let mut engine = ConflictEngine::with_defaults();
    let detections = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&detections);
    engine.on_conflict_detected(move |c, _| {
        sink.borrow_mut().push(c.clone());
        Ok(())
    });

    engine.tick(&TickInput::new(
        vec![agent("hub", &["overconfident"]), agent("speaker", &["overconfident"])],
        vec![],
        1000,
    ));

    let conflicts = engine.active_conflicts();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].conflict_type, ConflictType::AuthorityDispute);
    assert_eq!(
        conflicts[0].participants,
        vec!["hub".to_string(), "speaker".to_string()]
    );
    assert_eq!(detections.borrow().len(), 1);
    assert_eq!(detections.borrow()[0].conflict_id, conflicts[0].conflict_id);
}

/// A failing communication link becomes a breakdown naming both ends.
#[test]
fn test_scenario_communication_breakdown() {
    let mut engine = ConflictEngine::with_defaults();

    engine.tick(&TickInput::new(
        vec![agent("a", &[]), agent("b", &[])],
        vec![Connection::new("a", "b", ConnectionType::Communication).with_stats(10, 0.1)],
        1000,
    ));

    let breakdowns: Vec<_> = engine
        .active_conflicts()
        .into_iter()
        .filter(|c| c.conflict_type == ConflictType::CommunicationBreakdown)
        .collect();
    assert_eq!(breakdowns.len(), 1);
    assert!(breakdowns[0].involves("a"));
    assert!(breakdowns[0].involves("b"));
}

/// Resolving a fresh conflict moves it straight to history.
#[test]
fn test_scenario_resolve_fresh_conflict() {
    let mut engine = ConflictEngine::with_defaults();
    let report = engine.tick(&household());
    let id = report.created[0].clone();

    assert!(engine.resolve_conflict(&id));

    assert!(engine.active_conflicts().iter().all(|c| c.conflict_id != id));
    let history = engine.conflict_history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].conflict_id, id);
    assert!(!history[0].is_active());
    assert_eq!(history[0].resolved_at, Some(report.now));
}

/// The sample household produces a known set of conflicts on its first tick.
#[test]
fn test_household_first_tick() {
    let mut engine = ConflictEngine::with_defaults();

    let report = engine.tick(&household());

    assert_eq!(report.created.len(), 9);
    assert_eq!(count_of(&engine, ConflictType::AuthorityDispute), 1);
    assert_eq!(count_of(&engine, ConflictType::CommunicationBreakdown), 1);
    assert_eq!(count_of(&engine, ConflictType::PersonalityClash), 5);
    assert_eq!(count_of(&engine, ConflictType::GoalIncompatibility), 2);
    assert_eq!(count_of(&engine, ConflictType::ResourceCompetition), 0);

    // The garage door connection names an agent that isn't in the house
    assert_eq!(report.skipped_inputs, 1);

    // Both overconfident devices want processing at once
    assert_eq!(report.competitions_formed, vec![ResourceType::Processing]);
    let competitions = engine.resource_competitions();
    assert_eq!(competitions.len(), 1);
    assert_eq!(
        competitions[0].competitors,
        vec!["smart_speaker".to_string(), "thermostat".to_string()]
    );

    let authority = engine
        .active_conflicts()
        .into_iter()
        .find(|c| c.conflict_type == ConflictType::AuthorityDispute)
        .unwrap();
    assert!((authority.severity - 0.625).abs() < 1e-5);
    assert!(authority.description.contains("Echo"));
}

#[test]
fn test_every_active_conflict_has_effects() {
    let mut engine = ConflictEngine::with_defaults();
    for _ in 0..3 {
        engine.tick(&household());
    }

    for conflict in engine.active_conflicts() {
        assert!(!conflict.effects.is_empty(), "{} has no effects", conflict.conflict_id);
        for effect in &conflict.effects {
            assert!(effect.intensity > 0.0 && effect.intensity <= 1.0);
            assert_eq!(effect.target_agents, conflict.participants);
        }
    }
}

/// A listener resolving conflicts mid-tick leaves the engine consistent.
#[test]
fn test_listener_resolves_during_tick() {
    let mut engine = ConflictEngine::with_defaults();
    let resolutions = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&resolutions);

    engine.on_conflict_detected(|c, ctx| {
        if c.conflict_type == ConflictType::PersonalityClash {
            ctx.resolve_conflict(&c.conflict_id);
        }
        Ok(())
    });
    engine.on_conflict_resolved(move |_, _| {
        *counter.borrow_mut() += 1;
        Ok(())
    });

    engine.tick(&household());

    assert_eq!(*resolutions.borrow(), 5);
    assert_eq!(engine.conflict_history().len(), 5);
    assert_eq!(count_of(&engine, ConflictType::PersonalityClash), 0);
    assert_eq!(engine.active_conflicts().len(), 4);

    // Re-detected next tick as brand new conflicts
    let report = engine.tick(&household());
    assert_eq!(report.created.len(), 5);
    assert_eq!(report.reinforced.len(), 4);
}

/// One failing listener doesn't stop delivery to the others.
#[test]
fn test_listener_failure_isolated() {
    let mut engine = ConflictEngine::with_defaults();
    let competitions = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&competitions);

    engine.on_conflict_detected(|_, _| Err("display crashed".into()));
    engine.on_resource_competition_detected(move |_, _| {
        *counter.borrow_mut() += 1;
        Ok(())
    });

    let report = engine.tick(&household());

    assert_eq!(report.listener_failures, 9);
    assert_eq!(*competitions.borrow(), 1);
    assert_eq!(engine.active_conflicts().len(), 9);
}

#[test]
fn test_panicking_listener_isolated() {
    let mut engine = ConflictEngine::with_defaults();
    let competitions = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&competitions);

    engine.on_conflict_detected(|_, _| panic!("listener bug"));
    engine.on_resource_competition_detected(move |_, _| {
        *counter.borrow_mut() += 1;
        Ok(())
    });

    engine.tick(&household());
    engine.tick(&household());

    assert_eq!(*competitions.borrow(), 1);
    assert_eq!(engine.current_tick(), 2);
}

#[test]
fn test_last_registration_wins() {
    let mut engine = ConflictEngine::with_defaults();
    let log = Rc::new(RefCell::new(Vec::new()));

    let first = Rc::clone(&log);
    assert!(!engine.on_conflict_detected(move |_, _| {
        first.borrow_mut().push("first");
        Ok(())
    }));
    let second = Rc::clone(&log);
    assert!(engine.on_conflict_detected(move |_, _| {
        second.borrow_mut().push("second");
        Ok(())
    }));

    engine.tick(&TickInput::new(
        vec![agent("a", &["overconfident"]), agent("b", &["overconfident"])],
        vec![],
        1000,
    ));

    assert_eq!(*log.borrow(), vec!["second"]);
}

#[test]
fn test_dispose_clears_everything() {
    let mut engine = ConflictEngine::with_defaults();
    let calls = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&calls);
    engine.on_conflict_detected(move |_, _| {
        *counter.borrow_mut() += 1;
        Ok(())
    });

    let report = engine.tick(&household());
    engine.resolve_conflict(&report.created[0]);
    engine.dispose();

    assert!(engine.active_conflicts().is_empty());
    assert!(engine.conflict_history().is_empty());
    assert!(engine.tension_states().is_empty());
    assert!(engine.resource_competitions().is_empty());
    assert_eq!(engine.current_tick(), 0);

    // Listeners are gone too
    engine.tick(&household());
    assert_eq!(*calls.borrow(), 9);
}

#[test]
fn test_reset_keeps_listeners() {
    let mut engine = ConflictEngine::with_defaults();
    let calls = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&calls);
    engine.on_conflict_detected(move |_, _| {
        *counter.borrow_mut() += 1;
        Ok(())
    });

    engine.tick(&household());
    engine.reset();
    let report = engine.tick(&household());

    // Numbering restarts and everything is detected afresh
    assert_eq!(report.created[0], "conf_00001");
    assert_eq!(*calls.borrow(), 18);
}

#[test]
fn test_engine_from_config_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[detection]
communication_success_floor = 0.05
"#
    )
    .unwrap();

    let mut engine = ConflictEngine::from_config_file(file.path()).unwrap();
    assert_eq!(engine.config().detection.communication_success_floor, 0.05);
    assert_eq!(engine.config().tension, EngineConfig::default().tension);

    // 10% success is no longer below the floor
    engine.tick(&household());
    assert_eq!(count_of(&engine, ConflictType::CommunicationBreakdown), 0);
}

#[test]
fn test_invalid_config_file_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[drama]\ntension_peak_threshold = 1.5").unwrap();

    assert!(ConflictEngine::from_config_file(file.path()).is_err());
}

/// Events can be captured as JSON lines for replay tooling.
#[test]
fn test_event_log_jsonl() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.jsonl");
    let log = Rc::new(RefCell::new(Vec::new()));

    let sink = Rc::clone(&log);
    let mut engine = ConflictEngine::with_defaults();
    engine.on_conflict_detected(move |c, _| {
        let line = EngineEvent::ConflictDetected(c.clone())
            .to_jsonl()
            .map_err(ListenerError::new)?;
        sink.borrow_mut().push(line);
        Ok(())
    });

    engine.tick(&household());
    fs::write(&path, log.borrow().join("\n")).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let events: Vec<EngineEvent> = content
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(events.len(), 9);
    assert!(events
        .iter()
        .all(|e| matches!(e, EngineEvent::ConflictDetected(_))));
}

/// Reinforcing an existing conflict doesn't announce it again.
#[test]
fn test_reinforcement_does_not_refire_detection() {
    let mut engine = ConflictEngine::with_defaults();
    let detections = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&detections);
    engine.on_conflict_detected(move |_, _| {
        *counter.borrow_mut() += 1;
        Ok(())
    });
    let rivals = TickInput::new(
        vec![agent("a", &["overconfident"]), agent("b", &["overconfident"])],
        vec![],
        1000,
    );

    for _ in 0..5 {
        engine.tick(&rivals);
    }

    assert_eq!(*detections.borrow(), 1);
    assert_eq!(engine.active_conflicts().len(), 1);
    assert!(engine.active_conflicts()[0].escalation_level > 0.7);
}

/// A conflict detected below the escalation floor isn't lifted by decay.
#[test]
fn test_decay_below_floor_keeps_level() {
    let mut config = EngineConfig::default();
    config.detection.escalation_floor = 0.5;
    let mut engine = ConflictEngine::new(config).unwrap();
    let agents = vec![agent("a", &[]), agent("b", &[])];

    engine.tick(&TickInput::new(
        agents.clone(),
        vec![Connection::new("a", "b", ConnectionType::Communication).with_stats(10, 0.29)],
        1000,
    ));
    let before = engine.active_conflicts()[0].escalation_level;
    assert!(before < 0.5);

    // The failing link is gone, so the breakdown isn't re-detected
    for _ in 0..3 {
        let report = engine.tick(&TickInput::new(agents.clone(), vec![], 1000));
        assert_eq!(report.decayed.len(), 1);
        assert!(engine.active_conflicts()[0].escalation_level <= before);
    }
}
