//! Save slots on disk, driven through the engine.

use std::fs;

use campus_core::persistence::{self, SAVE_VERSION};
use campus_core::prelude::*;
use tempfile::TempDir;

fn fresh(seed: u64) -> Simulation<Transcript> {
    let config = SimConfig {
        autosave: false,
        ..SimConfig::seeded(seed)
    };
    Simulation::new_game(Faculty::Engineering, config, Transcript::new()).unwrap()
}

#[test]
fn save_then_load_in_another_session() {
    let dir = TempDir::new().unwrap();
    let mut first = fresh(1).with_store(SlotStore::open(dir.path(), "main").unwrap());
    first.acknowledge_semester().unwrap();
    first.submit_option("freshman_election", 1).unwrap();
    first.resolve("study").unwrap();
    first.save().unwrap();

    let mut second = fresh(2).with_store(SlotStore::open(dir.path(), "main").unwrap());
    assert_ne!(second.state(), first.state());
    assert!(second.load().unwrap());
    assert_eq!(second.state(), first.state());
    assert!(second.awaiting().is_none());
}

#[test]
fn empty_slot_loads_nothing() {
    let dir = TempDir::new().unwrap();
    let mut sim = fresh(3).with_store(SlotStore::open(dir.path(), "empty").unwrap());
    let before = sim.state().clone();
    assert!(!sim.load().unwrap());
    assert_eq!(sim.state(), &before);
}

#[test]
fn autosave_writes_before_each_advance() {
    let dir = TempDir::new().unwrap();
    let store = SlotStore::open(dir.path(), "auto").unwrap();
    let config = SimConfig {
        event_trigger_chance: 0.0,
        ..SimConfig::seeded(4)
    };
    let mut sim = Simulation::new_game(Faculty::Science, config, Transcript::new())
        .unwrap()
        .with_store(store);
    sim.acknowledge_semester().unwrap();
    sim.submit_option("freshman_election", 1).unwrap();
    sim.advance_month().unwrap();

    let reader = SlotStore::open(dir.path(), "auto").unwrap();
    let meta = reader.slot_info("auto").unwrap().unwrap();
    assert!(meta.summary.starts_with("2021-09 - "));
}

#[test]
fn slots_list_and_delete() {
    let dir = TempDir::new().unwrap();
    let mut store = SlotStore::open(dir.path(), "b").unwrap();
    let state = fresh(5).state().clone();
    store.save_state(&state).unwrap();
    store.set_active_slot("a");
    store.save_state(&state).unwrap();
    fs::write(dir.path().join("notes.txt"), "not a save").unwrap();

    assert_eq!(store.list_slots().unwrap(), vec!["a", "b"]);
    let meta = store.slot_info("a").unwrap().unwrap();
    assert_eq!(meta.summary, state.summary());

    assert!(store.delete("a").unwrap());
    assert!(!store.delete("a").unwrap());
    assert_eq!(store.list_slots().unwrap(), vec!["b"]);
    assert!(store.slot_info("a").unwrap().is_none());
}

#[test]
fn corrupt_slot_keeps_current_state() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("bad.sav"), b"\x01\x00\x00\x00garbage").unwrap();
    let mut sim = fresh(6).with_store(SlotStore::open(dir.path(), "bad").unwrap());
    let before = sim.state().clone();

    assert!(matches!(sim.load(), Err(EngineError::Save(_))));
    assert_eq!(sim.state(), &before);
}

#[test]
fn newer_format_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mut bytes = Vec::new();
    persistence::save_state_to(&mut bytes, fresh(7).state()).unwrap();
    bytes[..4].copy_from_slice(&(SAVE_VERSION + 1).to_le_bytes());
    fs::write(dir.path().join("future.sav"), &bytes).unwrap();

    let mut sim = fresh(8).with_store(SlotStore::open(dir.path(), "future").unwrap());
    assert!(matches!(
        sim.load(),
        Err(EngineError::Save(SaveError::VersionMismatch { .. }))
    ));
}

#[test]
fn save_refused_while_event_unanswered() {
    let dir = TempDir::new().unwrap();
    let mut sim = fresh(9).with_store(SlotStore::open(dir.path(), "mid").unwrap());
    sim.acknowledge_semester().unwrap();
    let pending = Awaiting::EventChoice("freshman_election".to_string());
    assert_eq!(sim.awaiting(), Some(&pending));

    assert!(matches!(sim.save(), Err(EngineError::Awaiting(_))));
    assert!(!dir.path().join("mid.sav").exists());
    assert_eq!(sim.awaiting(), Some(&pending));

    sim.submit_option("freshman_election", 1).unwrap();
    sim.save().unwrap();
    let mut reloaded = fresh(10).with_store(SlotStore::open(dir.path(), "mid").unwrap());
    assert!(reloaded.load().unwrap());
    assert_eq!(reloaded.state(), sim.state());
}

#[test]
fn slot_names_stay_inside_the_directory() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("saves");
    let state = fresh(11).state().clone();

    for bad in ["../escape", "a/b", "..", "", "c\\d"] {
        assert!(
            matches!(SlotStore::open(&nested, bad), Err(SaveError::InvalidSlot(_))),
            "slot {:?} accepted",
            bad
        );
    }

    let mut store = SlotStore::open(&nested, "ok").unwrap();
    store.set_active_slot("../escape");
    assert!(matches!(
        store.save_state(&state),
        Err(SaveError::InvalidSlot(_))
    ));
    assert!(matches!(store.delete("../ok"), Err(SaveError::InvalidSlot(_))));
    assert!(!dir.path().join("escape.sav").exists());
}
