//! Runtime configuration for a [`Simulation`](crate::engine::Simulation).

use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use campus_logic::constants::events;

use crate::error::ConfigError;

/// Engine settings. Every field has a default, so a config file only needs
/// the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Fixed RNG seed for reproducible sessions. `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Chance that a non-forced month fires an event.
    pub event_trigger_chance: f64,
    /// Save to the attached store at every month advance.
    pub autosave: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: None,
            event_trigger_chance: events::TRIGGER_CHANCE,
            autosave: true,
        }
    }
}

impl SimConfig {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let mut config: SimConfig = serde_json::from_str(json)?;
        config.event_trigger_chance = config.trigger_chance();
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Trigger chance clamped to [0, 1]; NaN counts as 0.
    pub fn trigger_chance(&self) -> f64 {
        if self.event_trigger_chance.is_nan() {
            0.0
        } else {
            self.event_trigger_chance.clamp(0.0, 1.0)
        }
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_defaults_fill_missing_keys() {
        let config = SimConfig::from_json_str(r#"{ "seed": 7 }"#).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.event_trigger_chance, 0.5);
        assert!(config.autosave);
    }

    #[test]
    fn test_chance_is_clamped() {
        let config = SimConfig::from_json_str(r#"{ "event_trigger_chance": 3.0 }"#).unwrap();
        assert_eq!(config.event_trigger_chance, 1.0);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(matches!(
            SimConfig::from_json_str("{ seed: "),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let a: u64 = SimConfig::seeded(42).rng().gen();
        let b: u64 = SimConfig::seeded(42).rng().gen();
        assert_eq!(a, b);
    }
}
