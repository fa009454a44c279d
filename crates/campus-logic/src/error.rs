//! Error types for the pure logic layer.
//!
//! Every error is returned before the first mutation, so an `Err` always
//! means the state is unchanged.

use thiserror::Error;

use crate::state::Phase;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ActionError {
    #[error("no actions left this month")]
    PhaseDone,
    #[error("health is critical; advance the month to be hospitalized")]
    HealthCrisis,
    #[error("unknown action `{0}` for this month")]
    UnknownAction(String),
    #[error("action `{action}` is not available in the {phase} phase")]
    WrongPhase { action: String, phase: Phase },
    #[error("not enough energy: need {needed}, have {available}")]
    InsufficientEnergy { needed: i32, available: i32 },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EventError {
    #[error("unknown event `{0}`")]
    UnknownEvent(String),
    #[error("event `{event}` has no option {index}")]
    UnknownOption { event: String, index: usize },
    #[error("cannot afford option {index} of event `{event}`")]
    Unaffordable { event: String, index: usize },
    #[error("event `{0}` has an option with no outcomes")]
    EmptyOutcomes(String),
}

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to parse event content: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate event id `{0}`")]
    DuplicateEvent(String),
    #[error("malformed event `{id}`: {reason}")]
    Malformed { id: String, reason: String },
}
