//! Simulation engine - main entry point for running a session
//!
//! [`Simulation`] owns the state, the event registry, the RNG and both
//! collaborators. One call to [`Simulation::advance_month`] is one calendar
//! tick; actions are resolved in between. Every point where the player has
//! to answer is recorded as an [`Awaiting`] continuation and answered by a
//! later call, so nothing here ever blocks.

use rand::rngs::StdRng;

use campus_logic::achievements;
use campus_logic::actions::{self, ActionDefinition, ActionReport, Confirmed, PendingConfirmation, Resolution};
use campus_logic::constants::{calendar, hospital};
use campus_logic::content::{self, Faculty};
use campus_logic::endings::{self, Ending};
use campus_logic::events::{self, EventDefinition, EventRegistry, EventResolution};
use campus_logic::scoring;
use campus_logic::{Phase, SimulationState, Stat};

use crate::config::SimConfig;
use crate::error::EngineError;
use crate::persistence::SaveStore;
use crate::presenter::Presenter;

/// A continuation the presentation collaborator still has to answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Awaiting {
    /// Answered by [`Simulation::confirm`] or [`Simulation::decline`].
    Confirmation(PendingConfirmation),
    /// Answered by [`Simulation::acknowledge_semester`]; the month's event
    /// check runs afterwards.
    SemesterAck,
    /// Answered by [`Simulation::submit_option`] for this event id.
    EventChoice(String),
}

impl Awaiting {
    pub fn label(&self) -> &'static str {
        match self {
            Awaiting::Confirmation(_) => "a confirmation",
            Awaiting::SemesterAck => "the semester acknowledgment",
            Awaiting::EventChoice(_) => "an event choice",
        }
    }
}

/// What one call to [`Simulation::advance_month`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    AlreadyGraduated,
    /// Health crisis handled; the calendar did not move.
    Hospitalized,
    Advanced { year: i32, month: u8 },
    Graduated(Ending),
}

/// Main simulation engine
pub struct Simulation<P: Presenter> {
    state: SimulationState,
    registry: EventRegistry,
    presenter: P,
    store: Option<Box<dyn SaveStore>>,
    config: SimConfig,
    rng: StdRng,
    awaiting: Option<Awaiting>,
    /// The diversion prompt is out and `complete_diversion` will be accepted.
    diversion_open: bool,
    ending: Option<Ending>,
}

impl<P: Presenter> Simulation<P> {
    /// Roll a new session for `faculty` and open the first semester.
    pub fn new_game(faculty: Faculty, config: SimConfig, presenter: P) -> Result<Self, EngineError> {
        let mut rng = config.rng();
        let state = content::new_game(faculty, &mut rng);
        log::info!(
            "New game: {} / {} family, {} credits to graduate",
            state.major_name,
            state.family.info().name,
            state.target_credits
        );
        let mut sim = Self::assemble(state, EventRegistry::builtin()?, config, rng, presenter);
        sim.begin();
        Ok(sim)
    }

    /// Continue from an existing state (e.g. one loaded elsewhere). No
    /// prompt is raised.
    pub fn resume(state: SimulationState, config: SimConfig, presenter: P) -> Result<Self, EngineError> {
        let rng = config.rng();
        Ok(Self::assemble(state, EventRegistry::builtin()?, config, rng, presenter))
    }

    fn assemble(
        state: SimulationState,
        registry: EventRegistry,
        config: SimConfig,
        rng: StdRng,
        presenter: P,
    ) -> Self {
        let ending = state.graduated.then(|| endings::resolve_ending(&state));
        Self {
            state,
            registry,
            presenter,
            store: None,
            config,
            rng,
            awaiting: None,
            diversion_open: false,
            ending,
        }
    }

    /// Attach a persistence collaborator.
    pub fn with_store(mut self, store: impl SaveStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    /// First semester: its target comes from the credit plan and the
    /// September event waits for the acknowledgment.
    fn begin(&mut self) {
        self.state.semester_target = self.state.credit_plan.first().copied().unwrap_or_default();
        self.awaiting = Some(Awaiting::SemesterAck);
        self.presenter.on_state_changed(&self.state);
        self.presenter
            .prompt_semester_ack(self.state.semester_target, self.state.target_credits);
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn registry(&self) -> &EventRegistry {
        &self.registry
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn awaiting(&self) -> Option<&Awaiting> {
        self.awaiting.as_ref()
    }

    pub fn diversion_open(&self) -> bool {
        self.diversion_open
    }

    /// The ending, once the graduation checkpoint has passed.
    pub fn ending(&self) -> Option<Ending> {
        self.ending
    }

    /// Actions offered for the current month, before phase gating.
    pub fn available_actions(&self) -> Vec<ActionDefinition> {
        actions::catalog_for(self.state.grade, self.state.month)
    }

    fn ensure_idle(&self) -> Result<(), EngineError> {
        match &self.awaiting {
            Some(waiting) => {
                log::debug!("Rejected call while waiting for {}", waiting.label());
                Err(EngineError::Awaiting(waiting.label()))
            }
            None => Ok(()),
        }
    }

    // ========================================================================
    // MONTH ADVANCE
    // ========================================================================

    /// One calendar tick.
    pub fn advance_month(&mut self) -> Result<Advance, EngineError> {
        self.ensure_idle()?;
        if self.state.graduated {
            return Ok(Advance::AlreadyGraduated);
        }

        if self.state.health < hospital::THRESHOLD {
            self.hospitalize();
            return Ok(Advance::Hospitalized);
        }

        if self.config.autosave {
            if let Err(e) = self.save() {
                log::warn!("Autosave failed: {}", e);
            }
        }

        if calendar::SETTLEMENT_MONTHS.contains(&self.state.month) {
            if let Some(report) = scoring::settle_semester(&mut self.state) {
                let rating = if report.is_excellent() { "excellent" } else { "settled" };
                let message = format!(
                    "Semester GPA {:.2} ({}), {} credits earned. Cumulative GPA {:.2}.",
                    report.semester_gpa, rating, report.credits, report.cumulative_gpa
                );
                self.presenter.notify("Semester report", &message);
            }
        }

        self.state.month += 1;
        if self.state.month > 12 {
            self.state.month = 1;
            self.state.year += 1;
        }
        log::info!("Advanced to {}", self.state.month_key());

        if self.state.at(calendar::GRADUATION) {
            return Ok(Advance::Graduated(self.graduate()));
        }

        if self.state.at(calendar::DIVERSION) {
            self.diversion_open = true;
            let colleges = self.state.faculty.info().colleges;
            self.presenter.prompt_diversion(colleges);
        }

        if self.state.at(calendar::BAOYAN) {
            self.evaluate_baoyan();
        }

        if self.state.month == calendar::START_MONTH {
            self.state.grade += 1;
        }

        if self.state.intern_lock_months > 0 {
            self.state.intern_lock_months -= 1;
            match actions::intern_payout(&mut self.state) {
                Some(report) => {
                    self.presenter
                        .notify("Internship", "Another month at the internship paid out.");
                    self.announce_unlocks(&report.unlocked);
                }
                None => self
                    .presenter
                    .notify("Internship", "Too tired to work this month; no pay."),
            }
        } else {
            self.state.phase = Phase::Major;
        }

        self.state.sanitize();

        let semester_opened = self.open_semester();

        let unlocked: Vec<&str> = achievements::check_achievements(&mut self.state)
            .into_iter()
            .map(|a| a.id)
            .collect();
        self.announce_unlocks(&unlocked);
        self.presenter.on_state_changed(&self.state);

        if !semester_opened {
            self.check_events();
        }

        Ok(Advance::Advanced {
            year: self.state.year,
            month: self.state.month,
        })
    }

    fn hospitalize(&mut self) {
        self.state.apply_delta(Stat::Money, -hospital::FEE);
        self.state.health = hospital::HEALTH_AFTER;
        self.state.energy = hospital::ENERGY_AFTER;
        log::info!(
            "Hospitalized at {} (fee {}), month not advanced",
            self.state.month_key(),
            hospital::FEE
        );
        self.presenter.notify(
            "Hospitalized",
            &format!(
                "Your health gave out. The hospital stay cost {} and this month is lost.",
                hospital::FEE
            ),
        );
        self.presenter.on_state_changed(&self.state);
    }

    fn graduate(&mut self) -> Ending {
        self.state.graduated = true;
        let ending = endings::resolve_ending(&self.state);
        self.ending = Some(ending);
        log::info!("Session finished with {:?}", ending);
        let narrative = ending.narrative(&mut self.rng);
        self.presenter.notify(ending.title(), narrative);
        self.presenter.on_state_changed(&self.state);
        ending
    }

    fn evaluate_baoyan(&mut self) {
        let threshold = self.state.faculty.info().baoyan_threshold;
        if self.state.gpa >= threshold {
            self.state.baoyan_qualified = true;
        }
        log::info!(
            "Recommendation check: gpa {:.2} against {:.2}, qualified {}",
            self.state.gpa,
            threshold,
            self.state.baoyan_qualified
        );
        let message = if self.state.baoyan_qualified {
            format!(
                "With a GPA of {:.2} you qualify for recommended admission. Finish your thesis to keep it.",
                self.state.gpa
            )
        } else {
            format!(
                "A GPA of {:.2} falls short of the {:.2} needed for recommended admission.",
                self.state.gpa, threshold
            )
        };
        self.presenter.notify("Recommended admission", &message);
    }

    /// Open a semester if this month starts one. Returns whether a
    /// semester prompt is now outstanding.
    fn open_semester(&mut self) -> bool {
        if !calendar::SEMESTER_START_MONTHS.contains(&self.state.month)
            || self.state.year > calendar::LAST_TEACHING_YEAR
        {
            return false;
        }
        let offset = if self.state.month == calendar::START_MONTH { 0 } else { 1 };
        let index = (self.state.grade as usize).saturating_sub(1) * 2 + offset;
        let Some(&target) = self.state.credit_plan.get(index) else {
            return false;
        };

        self.state.semester_study_effort = self.state.next_semester_study_buff;
        self.state.next_semester_study_buff = 0;
        self.state.semester_target = target;
        log::info!(
            "Semester {} opened with {} credits, carried effort {}",
            index + 1,
            target,
            self.state.semester_study_effort
        );
        self.awaiting = Some(Awaiting::SemesterAck);
        self.presenter.prompt_semester_ack(target, self.state.target_credits);
        true
    }

    fn check_events(&mut self) {
        let chance = self.config.trigger_chance();
        let Some(id) = events::check_events(&mut self.state, &self.registry, chance, &mut self.rng)
        else {
            return;
        };
        let Some(event) = self.registry.get(&id) else {
            return;
        };
        let affordable = events::affordable_options(&self.state, event);
        if !affordable.contains(&true) {
            // Nothing could ever answer the prompt; the month stays marked.
            log::warn!("Event {} has no affordable option, skipped", id);
            self.presenter.notify(
                &event.name,
                "You could not afford any choice, and the moment passed.",
            );
            return;
        }
        self.awaiting = Some(Awaiting::EventChoice(id));
        self.presenter.prompt_event_options(event, &affordable);
    }

    fn announce_unlocks(&mut self, ids: &[&str]) {
        for id in ids {
            if let Some(achievement) = achievements::find(id) {
                self.presenter.notify(
                    "Achievement unlocked",
                    &format!("{}: {}", achievement.name, achievement.description),
                );
            }
        }
    }

    fn announce_action(&mut self, report: &ActionReport) {
        if let Some(milestone) = report.milestone {
            self.presenter.notify("Thesis", milestone.message());
        }
        self.announce_unlocks(&report.unlocked);
        self.presenter.on_state_changed(&self.state);
    }

    // ========================================================================
    // ACTIONS
    // ========================================================================

    /// Take an action for the current phase. Actions behind a confirmation
    /// gate return [`Resolution::NeedsConfirmation`] and leave the state
    /// untouched until [`Simulation::confirm`].
    pub fn resolve(&mut self, action_id: &str) -> Result<Resolution, EngineError> {
        if self.state.graduated {
            return Err(EngineError::GameOver);
        }
        self.ensure_idle()?;
        let resolution = actions::resolve(&mut self.state, action_id)?;
        match &resolution {
            Resolution::Applied(report) => self.announce_action(report),
            Resolution::NeedsConfirmation(pending) => {
                self.awaiting = Some(Awaiting::Confirmation(pending.clone()));
                self.presenter.prompt_confirmation(&pending.message());
            }
        }
        Ok(resolution)
    }

    /// Accept the outstanding confirmation. If it can no longer be carried
    /// out the error is returned and the confirmation stays outstanding.
    pub fn confirm(&mut self) -> Result<Confirmed, EngineError> {
        let pending = match &self.awaiting {
            Some(Awaiting::Confirmation(pending)) => pending.clone(),
            Some(other) => return Err(EngineError::Awaiting(other.label())),
            None => return Err(EngineError::NotAwaiting),
        };
        let confirmed = actions::confirm(&mut self.state, &pending)?;
        self.awaiting = None;
        match &confirmed {
            Confirmed::Internship { payout } => {
                log::info!("Internship started at {}", self.state.month_key());
                match payout {
                    Some(report) => {
                        self.presenter
                            .notify("Internship", "Internship started; first month paid out.");
                        self.announce_unlocks(&report.unlocked);
                    }
                    None => self.presenter.notify(
                        "Internship",
                        "Internship started, but you were too tired to work this month.",
                    ),
                }
                self.presenter.on_state_changed(&self.state);
            }
            Confirmed::Action(report) => self.announce_action(report),
        }
        Ok(confirmed)
    }

    /// Refuse the outstanding confirmation. The state is not touched.
    pub fn decline(&mut self) -> Result<(), EngineError> {
        match &self.awaiting {
            Some(Awaiting::Confirmation(pending)) => {
                log::debug!("Declined {:?}", pending);
                self.awaiting = None;
                Ok(())
            }
            Some(other) => Err(EngineError::Awaiting(other.label())),
            None => Err(EngineError::NotAwaiting),
        }
    }

    /// Acknowledge the semester prompt and run the deferred event check.
    pub fn acknowledge_semester(&mut self) -> Result<(), EngineError> {
        match &self.awaiting {
            Some(Awaiting::SemesterAck) => {
                self.awaiting = None;
                self.check_events();
                Ok(())
            }
            Some(other) => Err(EngineError::Awaiting(other.label())),
            None => Err(EngineError::NotAwaiting),
        }
    }

    // ========================================================================
    // EVENTS
    // ========================================================================

    /// Answer the outstanding event with option `option_index`. An
    /// unaffordable option fails and keeps the event outstanding.
    pub fn submit_option(
        &mut self,
        event_id: &str,
        option_index: usize,
    ) -> Result<EventResolution, EngineError> {
        match &self.awaiting {
            Some(Awaiting::EventChoice(pending)) if pending == event_id => {}
            Some(Awaiting::EventChoice(_)) | None => return Err(EngineError::NotAwaiting),
            Some(other) => return Err(EngineError::Awaiting(other.label())),
        }
        let resolution = events::select_option(
            &mut self.state,
            &self.registry,
            event_id,
            option_index,
            &mut self.rng,
        )?;
        self.awaiting = None;

        let sub = &resolution.sub_outcome;
        self.presenter.notify(
            &resolution.event_name,
            &format!("{}: {}", sub.name, sub.description),
        );
        let unlocked: Vec<&str> = achievements::check_achievements(&mut self.state)
            .into_iter()
            .map(|a| a.id)
            .collect();
        self.announce_unlocks(&unlocked);
        self.presenter.on_state_changed(&self.state);
        Ok(resolution)
    }

    /// Add an event to the live pool. It is eligible from the next check on.
    pub fn register_event(&mut self, definition: EventDefinition) -> Result<(), EngineError> {
        log::info!("Registering event {}", definition.id);
        self.registry.register_event(definition)?;
        Ok(())
    }

    // ========================================================================
    // DIVERSION
    // ========================================================================

    /// Pick the college the player is diverted into.
    pub fn complete_diversion(&mut self, college: &str) -> Result<(), EngineError> {
        if !self.diversion_open {
            return Err(EngineError::NotAwaiting);
        }
        if !self.state.faculty.offers_college(college) {
            return Err(EngineError::UnknownCollege(college.to_string()));
        }
        self.state.major_name = college.to_string();
        self.diversion_open = false;
        log::info!("Diverted into {}", college);
        self.presenter.notify(
            "Diversion complete",
            &format!("You are now enrolled in {}.", college),
        );
        self.presenter.on_state_changed(&self.state);
        Ok(())
    }

    // ========================================================================
    // PERSISTENCE
    // ========================================================================

    /// Hand the state to the store. Without a store this does nothing.
    /// Refused while a prompt is open, since a save holds no continuation.
    pub fn save(&mut self) -> Result<(), EngineError> {
        self.ensure_idle()?;
        if let Some(store) = self.store.as_mut() {
            store.save_state(&self.state)?;
            log::debug!("Saved {}", self.state.summary());
        }
        Ok(())
    }

    /// Replace the state with the stored one. Returns `false` when there is
    /// no store or nothing stored; on error the current state is kept.
    pub fn load(&mut self) -> Result<bool, EngineError> {
        let Some(store) = self.store.as_mut() else {
            return Ok(false);
        };
        let Some(state) = store.load_state()? else {
            return Ok(false);
        };
        log::info!("Loaded {}", state.summary());
        self.diversion_open = state.at(calendar::DIVERSION)
            && state.major_name == state.faculty.info().name;
        self.ending = state.graduated.then(|| endings::resolve_ending(&state));
        self.state = state;
        self.awaiting = None;
        self.presenter.on_state_changed(&self.state);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::presenter::{PresenterCall, Transcript};

    fn sim() -> Simulation<Transcript> {
        Simulation::new_game(Faculty::Engineering, SimConfig::seeded(3), Transcript::new()).unwrap()
    }

    #[test]
    fn test_new_game_waits_for_first_semester() {
        let sim = sim();
        assert_eq!(sim.awaiting(), Some(&Awaiting::SemesterAck));
        assert_eq!(sim.state().semester_target, sim.state().credit_plan[0]);
    }

    #[test]
    fn test_ack_forces_september_election() {
        let mut sim = sim();
        sim.acknowledge_semester().unwrap();
        assert_eq!(
            sim.awaiting(),
            Some(&Awaiting::EventChoice("freshman_election".to_string()))
        );
    }

    #[test]
    fn test_advance_rejected_while_waiting() {
        let mut sim = sim();
        assert!(matches!(sim.advance_month(), Err(EngineError::Awaiting(_))));
        assert!(matches!(sim.resolve("study"), Err(EngineError::Awaiting(_))));
        assert_eq!(sim.state().month, 9);
    }

    #[test]
    fn test_answer_without_prompt_is_rejected() {
        let mut sim = sim();
        assert!(matches!(sim.confirm(), Err(EngineError::Awaiting(_))));
        sim.acknowledge_semester().unwrap();
        assert!(matches!(sim.acknowledge_semester(), Err(EngineError::Awaiting(_))));
        assert!(matches!(
            sim.submit_option("cet_exam", 0),
            Err(EngineError::NotAwaiting)
        ));
    }

    #[test]
    fn test_decline_leaves_state_untouched() {
        let mut sim = sim();
        sim.acknowledge_semester().unwrap();
        sim.submit_option("freshman_election", 0).unwrap();
        let before = sim.state().clone();
        let resolution = sim.resolve("intern").unwrap();
        assert!(matches!(resolution, Resolution::NeedsConfirmation(_)));
        sim.decline().unwrap();
        assert_eq!(sim.state(), &before);
        assert!(sim.awaiting().is_none());
    }

    #[test]
    fn test_save_without_store_is_noop() {
        let mut sim = sim();
        sim.acknowledge_semester().unwrap();
        sim.submit_option("freshman_election", 1).unwrap();
        sim.save().unwrap();
        assert!(!sim.load().unwrap());
    }

    #[test]
    fn test_load_replaces_state() {
        let mut store = MemoryStore::new();
        let mut saved = sim().state().clone();
        saved.month = 11;
        store.save_state(&saved).unwrap();

        let mut sim = sim().with_store(store);
        assert!(sim.load().unwrap());
        assert_eq!(sim.state().month, 11);
        assert!(sim.awaiting().is_none());
        assert!(sim.presenter().contains(&PresenterCall::StateChanged));
    }
}
