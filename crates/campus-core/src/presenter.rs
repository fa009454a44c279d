//! The presentation collaborator.
//!
//! The engine never blocks on a prompt. It records what it is waiting for
//! and returns; the front end answers later through the matching engine
//! call (`confirm`/`decline`, `submit_option`, `acknowledge_semester`,
//! `complete_diversion`).

use campus_logic::events::EventDefinition;
use campus_logic::SimulationState;

pub trait Presenter {
    fn on_state_changed(&mut self, state: &SimulationState);

    /// Answered by `confirm` or `decline`.
    fn prompt_confirmation(&mut self, message: &str);

    /// Answered by `submit_option`. `affordable[i]` tells whether option
    /// `i` can currently be paid for.
    fn prompt_event_options(&mut self, event: &EventDefinition, affordable: &[bool]);

    /// Answered by `acknowledge_semester`.
    fn prompt_semester_ack(&mut self, semester_credits: u32, target_credits: u32);

    /// Answered by `complete_diversion`. Does not block other calls.
    fn prompt_diversion(&mut self, colleges: &[&str]) {
        let _ = colleges;
    }

    fn notify(&mut self, title: &str, message: &str);
}

/// Ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn on_state_changed(&mut self, _state: &SimulationState) {}
    fn prompt_confirmation(&mut self, _message: &str) {}
    fn prompt_event_options(&mut self, _event: &EventDefinition, _affordable: &[bool]) {}
    fn prompt_semester_ack(&mut self, _semester_credits: u32, _target_credits: u32) {}
    fn notify(&mut self, _title: &str, _message: &str) {}
}

/// One presenter call, as recorded by [`Transcript`].
#[derive(Debug, Clone, PartialEq)]
pub enum PresenterCall {
    StateChanged,
    Confirmation(String),
    EventOptions { event_id: String, affordable: Vec<bool> },
    SemesterAck { semester_credits: u32, target_credits: u32 },
    Diversion(Vec<String>),
    Notify { title: String, message: String },
}

/// Records every call, for tests and the headless harness.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    pub calls: Vec<PresenterCall>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    /// Titles of every notification so far.
    pub fn notifications(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                PresenterCall::Notify { title, .. } => Some(title.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn contains(&self, call: &PresenterCall) -> bool {
        self.calls.contains(call)
    }
}

impl Presenter for Transcript {
    fn on_state_changed(&mut self, _state: &SimulationState) {
        // Consecutive refreshes are recorded once.
        if self.calls.last() != Some(&PresenterCall::StateChanged) {
            self.calls.push(PresenterCall::StateChanged);
        }
    }

    fn prompt_confirmation(&mut self, message: &str) {
        self.calls.push(PresenterCall::Confirmation(message.to_string()));
    }

    fn prompt_event_options(&mut self, event: &EventDefinition, affordable: &[bool]) {
        self.calls.push(PresenterCall::EventOptions {
            event_id: event.id.clone(),
            affordable: affordable.to_vec(),
        });
    }

    fn prompt_semester_ack(&mut self, semester_credits: u32, target_credits: u32) {
        self.calls.push(PresenterCall::SemesterAck {
            semester_credits,
            target_credits,
        });
    }

    fn prompt_diversion(&mut self, colleges: &[&str]) {
        self.calls.push(PresenterCall::Diversion(
            colleges.iter().map(|c| c.to_string()).collect(),
        ));
    }

    fn notify(&mut self, title: &str, message: &str) {
        self.calls.push(PresenterCall::Notify {
            title: title.to_string(),
            message: message.to_string(),
        });
    }
}
