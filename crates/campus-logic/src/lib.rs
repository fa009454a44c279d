//! Pure simulation logic for the campus life simulation.
//!
//! This crate contains all game logic that is independent of presentation,
//! storage, or runtime. Functions take the state handle (and an RNG where
//! sampling is needed) explicitly and return results, making them
//! unit-testable and reusable from the engine, the headless harness, and
//! any future front end.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`achievements`] | Achievement predicates and monotonic unlocks |
//! | [`actions`] | Action catalogs per month type, phase gating, confirmation gates |
//! | [`constants`] | Stat bounds, action magnitudes, calendar checkpoints |
//! | [`content`] | Faculties, colleges, family tiers, start-of-game roll |
//! | [`endings`] | Ending decision tree and closing narratives |
//! | [`error`] | Typed errors for actions, events and content |
//! | [`events`] | Event definitions, registry, eligibility, category weighting |
//! | [`sampler`] | Weighted roulette shared by every random choice |
//! | [`scoring`] | Semester GPA and credit-weighted cumulative GPA |
//! | [`state`] | The simulation state record and clamped mutation |

pub mod achievements;
pub mod actions;
pub mod constants;
pub mod content;
pub mod endings;
pub mod error;
pub mod events;
pub mod sampler;
pub mod scoring;
pub mod state;

pub use error::{ActionError, ContentError, EventError};
pub use state::{Phase, SimulationState, Stat};
