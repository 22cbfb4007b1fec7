//! Simulation tuning
//!
//! Every physics constant, reward and control threshold travels in one
//! `SimulationConfig` value handed to the episode driver at construction.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::SIM_DT;

/// Errors raised when configuration invariants are violated.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be in {range} (got {value})")]
    OutOfRange {
        field: &'static str,
        range: &'static str,
        value: f32,
    },
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Signal levels above which a driver output triggers a control
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlThresholds {
    pub accelerate: f32,
    pub turn_right: f32,
    pub turn_left: f32,
}

impl Default for ControlThresholds {
    fn default() -> Self {
        Self {
            accelerate: 0.5,
            turn_right: 0.2,
            turn_left: 0.2,
        }
    }
}

/// Simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === Car physics ===
    /// Thrust added to velocity per `accelerate()` (units/s²)
    pub acceleration: f32,
    /// Velocity multiplier per tick, in (0, 1]
    pub drag: f32,
    /// Angular velocity multiplier per tick, in (0, 1]
    pub angular_drag: f32,
    /// Degrees added per steering input
    pub turn_speed: f32,
    /// Sensor reach as a multiple of the body half-extents
    pub detection_range: f32,

    // === Fitness ===
    /// Simulated seconds without a gate before a car is removed
    pub death_timeout_secs: f32,
    /// Subtracted from fitness on removal
    pub wall_penalty: f32,
    /// Added to fitness per gate crossed
    pub checkpoint_reward: f32,
    /// Any car reaching this fitness ends the episode
    pub fitness_cap: f32,

    // === Episode ===
    /// Tick length used by `Episode::run`
    pub tick_dt: f32,
    /// Hard tick budget per episode (`None` = unbounded)
    pub max_ticks: Option<u64>,
    /// Driver output thresholds
    pub thresholds: ControlThresholds,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            acceleration: 25.0,
            drag: 0.9,
            angular_drag: 0.2,
            turn_speed: 4.0,
            detection_range: 8.0,

            death_timeout_secs: 5.0,
            wall_penalty: 10.0,
            checkpoint_reward: 10.0,
            fitness_cap: 6000.0,

            tick_dt: SIM_DT,
            max_ticks: Some(20_000),
            thresholds: ControlThresholds::default(),
        }
    }
}

impl SimulationConfig {
    /// Preset for replaying a single trained champion (lower cap)
    pub fn champion_replay() -> Self {
        Self {
            fitness_cap: 4000.0,
            ..Self::default()
        }
    }

    /// Check invariants the simulation relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn unit_interval(field: &'static str, value: f32) -> Result<(), ConfigError> {
            if value > 0.0 && value <= 1.0 {
                Ok(())
            } else {
                Err(ConfigError::OutOfRange {
                    field,
                    range: "(0, 1]",
                    value,
                })
            }
        }
        fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
            if value > 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(ConfigError::OutOfRange {
                    field,
                    range: "(0, inf)",
                    value,
                })
            }
        }

        unit_interval("drag", self.drag)?;
        unit_interval("angular_drag", self.angular_drag)?;
        positive("detection_range", self.detection_range)?;
        positive("death_timeout_secs", self.death_timeout_secs)?;
        positive("fitness_cap", self.fitness_cap)?;
        positive("tick_dt", self.tick_dt)?;
        if !self.acceleration.is_finite() || self.acceleration < 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "acceleration",
                range: "[0, inf)",
                value: self.acceleration,
            });
        }
        Ok(())
    }

    /// Parse and validate a config from JSON; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SimulationConfig::default();
        config.validate().unwrap();
        assert_eq!(config.acceleration, 25.0);
        assert_eq!(config.thresholds.accelerate, 0.5);
        assert_eq!(config.thresholds.turn_right, 0.2);
    }

    #[test]
    fn test_champion_replay_cap() {
        let config = SimulationConfig::champion_replay();
        assert_eq!(config.fitness_cap, 4000.0);
        assert_eq!(config.drag, SimulationConfig::default().drag);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            SimulationConfig::from_json(r#"{ "drag": 0.85, "thresholds": { "turn_left": 0.5 } }"#)
                .unwrap();
        assert_eq!(config.drag, 0.85);
        assert_eq!(config.thresholds.turn_left, 0.5);
        assert_eq!(config.thresholds.turn_right, 0.2);
        assert_eq!(config.fitness_cap, 6000.0);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let err = SimulationConfig::from_json(r#"{ "drag": 1.5 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { field: "drag", .. }));

        let config = SimulationConfig {
            death_timeout_secs: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { field: "death_timeout_secs", .. })
        ));
    }
}
