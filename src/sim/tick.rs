//! Per-car simulation step
//!
//! One tick for one car is: judge the pose produced by the previous tick
//! (wall, timeout, next gate), then integrate motion and re-sense.

use serde::{Deserialize, Serialize};

use super::car::Car;
use super::track::Track;
use crate::settings::SimulationConfig;

/// Why a car left the episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Crashed,
    TimedOut,
}

/// What the start-of-tick checks found for a car
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// A collision edge touches a wall
    Crashed,
    /// No gate for longer than `death_timeout_secs`
    TimedOut,
    /// The next expected gate was crossed (the car already advanced its index)
    Checkpoint,
    /// Nothing happened
    Driving,
}

impl Verdict {
    /// Cause of removal, for verdicts that end the car's run
    pub fn death_cause(self) -> Option<DeathCause> {
        match self {
            Verdict::Crashed => Some(DeathCause::Crashed),
            Verdict::TimedOut => Some(DeathCause::TimedOut),
            Verdict::Checkpoint | Verdict::Driving => None,
        }
    }

    pub fn is_fatal(self) -> bool {
        self.death_cause().is_some()
    }
}

/// Start-of-tick checks. Wall and timeout take precedence over gates.
pub fn judge(car: &mut Car, track: &Track, config: &SimulationConfig) -> Verdict {
    if car.collides_with_wall(track) {
        Verdict::Crashed
    } else if car.time_since_checkpoint > config.death_timeout_secs {
        Verdict::TimedOut
    } else if car.cross_checkpoint(track) {
        Verdict::Checkpoint
    } else {
        Verdict::Driving
    }
}

/// Integrate motion by `dt` seconds and rebuild geometry and sensors
pub fn advance(car: &mut Car, track: &Track, config: &SimulationConfig, dt: f32) {
    car.integrate(dt, config.drag, config.angular_drag);
    car.refresh_geometry(track, config.detection_range);
}
