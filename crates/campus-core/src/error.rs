//! Engine-level errors. Every variant is returned before any mutation.

use thiserror::Error;

use campus_logic::{ActionError, ContentError, EventError};

use crate::persistence::SaveError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("the session has ended")]
    GameOver,
    #[error("still waiting for {0}")]
    Awaiting(&'static str),
    #[error("nothing is waiting for that response")]
    NotAwaiting,
    #[error("`{0}` is not a college of this faculty")]
    UnknownCollege(String),
    #[error(transparent)]
    Action(#[from] ActionError),
    #[error(transparent)]
    Event(#[from] EventError),
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Save(#[from] SaveError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
