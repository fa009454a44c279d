//! Campus Core - month-by-month campus life simulation engine
//!
//! Drives a single play session through the academic calendar on top of
//! the pure rules in `campus_logic`.
//!
//! # Architecture
//!
//! - **Engine**: [`engine::Simulation`] owns the state and advances it one
//!   month per call, settling semesters, firing checkpoints and events
//! - **Presenter**: the front end, told about every change and asked for
//!   every answer through [`presenter::Presenter`]
//! - **Persistence**: an optional [`persistence::SaveStore`] the engine
//!   hands whole states to
//!
//! # Example
//!
//! ```rust,no_run
//! use campus_core::prelude::*;
//!
//! let config = SimConfig::seeded(7);
//! let mut sim = Simulation::new_game(Faculty::Science, config, NullPresenter).unwrap();
//! sim.acknowledge_semester().unwrap();
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod persistence;
pub mod presenter;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::config::SimConfig;
    pub use crate::engine::{Advance, Awaiting, Simulation};
    pub use crate::error::{ConfigError, EngineError};
    pub use crate::persistence::{MemoryStore, SaveError, SaveStore, SlotStore};
    pub use crate::presenter::{NullPresenter, Presenter, PresenterCall, Transcript};
    pub use campus_logic::actions::{Confirmed, PendingConfirmation, Resolution};
    pub use campus_logic::content::Faculty;
    pub use campus_logic::endings::Ending;
    pub use campus_logic::events::{EventDefinition, EventResolution};
    pub use campus_logic::{Phase, SimulationState, Stat};
}
