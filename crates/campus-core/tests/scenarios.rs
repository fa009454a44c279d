//! Engine scenarios: hospitalization, internships, checkpoints, prompts
//! and re-entrancy, each started from a hand-placed state.

use campus_core::prelude::*;
use campus_logic::content;
use campus_logic::endings::Remark;
use campus_logic::error::{ActionError, ContentError, EventError};
use campus_logic::events::EventRegistry;
use rand::rngs::StdRng;
use rand::SeedableRng;

// ── Helpers ────────────────────────────────────────────────────────────

fn quiet() -> SimConfig {
    SimConfig {
        seed: Some(1),
        event_trigger_chance: 0.0,
        autosave: false,
    }
}

fn state_at(year: i32, month: u8, grade: u8) -> SimulationState {
    let mut rng = StdRng::seed_from_u64(99);
    let mut state = content::new_game(Faculty::Science, &mut rng);
    state.sanitize();
    state.year = year;
    state.month = month;
    state.grade = grade;
    state.health = 85;
    state.energy = 100;
    state
}

fn resume(state: SimulationState) -> Simulation<Transcript> {
    Simulation::resume(state, quiet(), Transcript::new()).unwrap()
}

// ── Month advance ──────────────────────────────────────────────────────

#[test]
fn health_crisis_hospitalizes_without_advancing() {
    let mut state = state_at(2021, 10, 1);
    state.health = 49;
    state.energy = 5;
    let money = state.money;
    let mut sim = resume(state);

    assert_eq!(sim.advance_month().unwrap(), Advance::Hospitalized);
    let s = sim.state();
    assert_eq!((s.year, s.month), (2021, 10));
    assert_eq!(s.health, 60);
    assert_eq!(s.energy, 50);
    assert_eq!(s.money, money - 3000);
    assert!(sim.presenter().notifications().contains(&"Hospitalized"));

    // Recovered: the next call moves on.
    assert!(matches!(
        sim.advance_month().unwrap(),
        Advance::Advanced { year: 2021, month: 11 }
    ));
}

#[test]
fn actions_blocked_during_health_crisis() {
    let mut state = state_at(2021, 10, 1);
    state.health = 49;
    let mut sim = resume(state);
    assert!(matches!(
        sim.resolve("study"),
        Err(EngineError::Action(ActionError::HealthCrisis))
    ));
}

#[test]
fn phase_resets_each_month() {
    let mut sim = resume(state_at(2021, 10, 1));
    sim.resolve("study").unwrap();
    assert_eq!(sim.state().phase, Phase::Minor);
    sim.advance_month().unwrap();
    assert_eq!(sim.state().phase, Phase::Major);
}

#[test]
fn grade_increments_in_september() {
    let mut state = state_at(2022, 8, 1);
    state.next_semester_study_buff = 40;
    let mut sim = resume(state);
    sim.advance_month().unwrap();

    let s = sim.state();
    assert_eq!(s.grade, 2);
    assert_eq!(s.semester_study_effort, 40);
    assert_eq!(s.next_semester_study_buff, 0);
    assert_eq!(s.semester_target, s.credit_plan[2]);
    assert_eq!(sim.awaiting(), Some(&Awaiting::SemesterAck));
}

#[test]
fn semester_settles_when_leaving_january() {
    let mut state = state_at(2022, 1, 1);
    state.semester_target = 27;
    state.semester_study_effort = 100;
    state.knowledge = 90;
    let mut sim = resume(state);
    sim.advance_month().unwrap();

    let s = sim.state();
    assert_eq!(s.credits_earned_total, 27);
    assert_eq!(s.semester_target, 0);
    assert!((s.gpa - 4.9).abs() < 1e-9);
    assert!(sim.presenter().notifications().contains(&"Semester report"));
}

#[test]
fn final_year_does_not_settle() {
    let mut state = state_at(2025, 1, 4);
    state.credits_earned_total = 140;
    state.semester_target = 25;
    let mut sim = resume(state);
    sim.advance_month().unwrap();
    assert_eq!(sim.state().credits_earned_total, 140);
}

// ── Internship ─────────────────────────────────────────────────────────

#[test]
fn internship_locks_two_months() {
    let mut sim = resume(state_at(2021, 10, 1));

    let resolution = sim.resolve("intern").unwrap();
    assert!(matches!(resolution, Resolution::NeedsConfirmation(_)));
    assert!(matches!(sim.resolve("study"), Err(EngineError::Awaiting(_))));

    let confirmed = sim.confirm().unwrap();
    assert!(matches!(confirmed, Confirmed::Internship { payout: Some(_) }));
    assert_eq!(sim.state().intern_lock_months, 2);
    assert_eq!(sim.state().phase, Phase::Minor);
    assert_eq!(sim.state().energy, 70);

    sim.advance_month().unwrap();
    assert_eq!(sim.state().intern_lock_months, 1);
    assert_eq!(sim.state().phase, Phase::Minor);
    assert_eq!(sim.state().energy, 40);

    sim.advance_month().unwrap();
    assert_eq!(sim.state().intern_lock_months, 0);
    assert_eq!(sim.state().phase, Phase::Minor);
    assert_eq!(sim.state().energy, 10);

    sim.advance_month().unwrap();
    assert_eq!(sim.state().phase, Phase::Major);
}

#[test]
fn locked_month_without_energy_skips_pay() {
    let mut state = state_at(2021, 10, 1);
    state.intern_lock_months = 1;
    state.energy = 10;
    let money = state.money;
    let mut sim = resume(state);
    sim.advance_month().unwrap();

    assert_eq!(sim.state().money, money);
    assert_eq!(sim.state().phase, Phase::Minor);
    assert_eq!(sim.state().intern_lock_months, 0);
}

// ── Checkpoints ────────────────────────────────────────────────────────

#[test]
fn diversion_prompt_and_completion() {
    let mut sim = resume(state_at(2021, 12, 1));
    assert!(matches!(
        sim.complete_diversion("School of Physics"),
        Err(EngineError::NotAwaiting)
    ));

    sim.advance_month().unwrap();
    assert!(sim.diversion_open());
    let colleges = Faculty::Science.info().colleges;
    assert!(sim
        .presenter()
        .contains(&PresenterCall::Diversion(colleges.iter().map(|c| c.to_string()).collect())));

    // The prompt does not hold up the calendar.
    assert!(sim.awaiting().is_none());

    assert!(matches!(
        sim.complete_diversion("Guanghua Law School"),
        Err(EngineError::UnknownCollege(_))
    ));
    sim.complete_diversion(colleges[0]).unwrap();
    assert_eq!(sim.state().major_name, colleges[0]);
    assert!(!sim.diversion_open());
}

#[test]
fn baoyan_checkpoint_compares_gpa() {
    let mut state = state_at(2024, 8, 3);
    state.gpa = 4.6;
    let mut sim = resume(state);
    sim.advance_month().unwrap();
    assert!(sim.state().baoyan_qualified);
    assert_eq!(sim.state().grade, 4);
    assert!(sim.awaiting().is_none());

    let mut state = state_at(2024, 8, 3);
    state.gpa = 3.9;
    let mut sim = resume(state);
    sim.advance_month().unwrap();
    assert!(!sim.state().baoyan_qualified);
}

#[test]
fn graduation_yields_generic_ending() {
    let mut state = state_at(2025, 6, 4);
    state.credits_earned_total = state.target_credits;
    state.thesis_progress = 100;
    state.baoyan_qualified = false;
    state.knowledge = 85;
    state.social = 85;
    state.skill = 85;
    let mut sim = resume(state);

    let advance = sim.advance_month().unwrap();
    assert_eq!(advance, Advance::Graduated(Ending::Graduated(Remark::Plain)));
    assert!(sim.state().graduated);
    assert_eq!((sim.state().year, sim.state().month), (2025, 7));
    assert!(sim.presenter().notifications().contains(&"Ending: Graduation"));

    assert_eq!(sim.advance_month().unwrap(), Advance::AlreadyGraduated);
    assert!(matches!(sim.resolve("rest"), Err(EngineError::GameOver)));
    assert_eq!((sim.state().year, sim.state().month), (2025, 7));
}

// ── Events and prompts ─────────────────────────────────────────────────

#[test]
fn unaffordable_option_keeps_event_pending() {
    let mut state = state_at(2022, 8, 1);
    state.energy = 0;
    let mut sim = resume(state);
    sim.advance_month().unwrap();
    sim.acknowledge_semester().unwrap();

    let pending = Awaiting::EventChoice("freshman_election".to_string());
    assert_eq!(sim.awaiting(), Some(&pending));
    assert!(sim.presenter().contains(&PresenterCall::EventOptions {
        event_id: "freshman_election".to_string(),
        affordable: vec![false, true],
    }));

    assert!(matches!(
        sim.submit_option("freshman_election", 0),
        Err(EngineError::Event(EventError::Unaffordable { .. }))
    ));
    assert_eq!(sim.awaiting(), Some(&pending));
    assert!(matches!(sim.advance_month(), Err(EngineError::Awaiting(_))));

    let resolution = sim.submit_option("freshman_election", 1).unwrap();
    assert_eq!(resolution.option_index, 1);
    assert!(sim.awaiting().is_none());
}

#[test]
fn wrong_event_id_is_rejected() {
    let mut sim = Simulation::new_game(Faculty::Humanities, quiet(), Transcript::new()).unwrap();
    sim.acknowledge_semester().unwrap();
    assert!(matches!(
        sim.submit_option("cet_exam", 1),
        Err(EngineError::NotAwaiting)
    ));
    assert!(matches!(sim.decline(), Err(EngineError::Awaiting(_))));
    sim.submit_option("freshman_election", 1).unwrap();
}

#[test]
fn one_event_per_month_even_at_full_chance() {
    let config = SimConfig {
        event_trigger_chance: 1.0,
        ..quiet()
    };
    let mut sim = Simulation::resume(state_at(2021, 9, 1), config, Transcript::new()).unwrap();
    sim.advance_month().unwrap();
    let Some(Awaiting::EventChoice(id)) = sim.awaiting().cloned() else {
        panic!("an event should fire at full chance");
    };
    sim.submit_option(&id, 1).unwrap();
    let key = sim.state().month_key();
    assert_eq!(sim.state().event_state.last_triggered_month_key, key);
    assert!(sim.awaiting().is_none());
}

#[test]
fn registered_event_joins_pool() {
    let mut sim = resume(state_at(2021, 10, 1));
    let mut extra = EventRegistry::builtin()
        .unwrap()
        .get("cet_exam")
        .cloned()
        .unwrap();

    assert!(matches!(
        sim.register_event(extra.clone()),
        Err(EngineError::Content(ContentError::DuplicateEvent(_)))
    ));

    extra.id = "robotics_cup".to_string();
    extra.name = "Robotics Cup".to_string();
    let before = sim.registry().len();
    sim.register_event(extra).unwrap();
    assert_eq!(sim.registry().len(), before + 1);
    assert!(sim.registry().get("robotics_cup").is_some());
}
