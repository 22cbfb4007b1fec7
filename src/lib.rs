//! Track Pilot - a 2D car learning to drive a closed track
//!
//! Core modules:
//! - `sim`: Deterministic simulation (geometry, track, car, tick, episode)
//! - `settings`: Simulation tuning (`SimulationConfig`)
//! - `brain`: Seeded feed-forward driver for headless runs
//! - `report`: Ranked fitness results handed to an optimizer

pub mod brain;
pub mod report;
pub mod settings;
pub mod sim;

pub use brain::FeedForward;
pub use report::{EpisodeReport, ReportEntry};
pub use settings::{ConfigError, ControlThresholds, SimulationConfig};

use glam::Vec2;

/// Simulation constants
pub mod consts {
    /// Default tick length (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Car body half-extents
    pub const CAR_HALF_WIDTH: f32 = 10.0;
    pub const CAR_HALF_HEIGHT: f32 = 20.0;

    /// Number of detection rays (front-left, front-right, forward)
    pub const SENSOR_COUNT: usize = 3;
    /// Number of control signals (accelerate, turn right, turn left)
    pub const CONTROL_COUNT: usize = 3;
}

/// Sensor readings handed to a driver each tick
pub type Sensors = [f32; consts::SENSOR_COUNT];

/// Control signals returned by a driver
pub type Controls = [f32; consts::CONTROL_COUNT];

/// Degrees to radians
#[inline]
pub fn deg_to_rad(degrees: f32) -> f32 {
    degrees * std::f32::consts::PI / 180.0
}

/// Rotate `point` about `center` by `radian` (screen coordinates, y down)
#[inline]
pub fn rotate_about(point: Vec2, center: Vec2, radian: f32) -> Vec2 {
    let (sin, cos) = radian.sin_cos();
    let d = point - center;
    Vec2::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos) + center
}

/// Rotate every point of a fixed-size set about `center`
pub fn rotate_points<const N: usize>(points: &[Vec2; N], center: Vec2, radian: f32) -> [Vec2; N] {
    points.map(|p| rotate_about(p, center, radian))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let center = Vec2::new(100.0, 100.0);
        let p = Vec2::new(110.0, 100.0);
        let rotated = rotate_about(p, center, deg_to_rad(90.0));
        assert!(close(rotated, Vec2::new(100.0, 110.0)));
    }

    proptest! {
        #[test]
        fn rotation_by_zero_is_identity(
            cx in -1000.0f32..1000.0, cy in -1000.0f32..1000.0,
            pts in prop::array::uniform4((-1000.0f32..1000.0, -1000.0f32..1000.0)),
        ) {
            let center = Vec2::new(cx, cy);
            let points = pts.map(|(x, y)| Vec2::new(x, y));
            let rotated = rotate_points(&points, center, 0.0);
            for (a, b) in points.iter().zip(rotated.iter()) {
                prop_assert!(close(*a, *b));
            }
        }

        #[test]
        fn rotation_round_trip(
            cx in -500.0f32..500.0, cy in -500.0f32..500.0,
            angle in -720.0f32..720.0,
            pts in prop::array::uniform4((-500.0f32..500.0, -500.0f32..500.0)),
        ) {
            let center = Vec2::new(cx, cy);
            let points = pts.map(|(x, y)| Vec2::new(x, y));
            let there = rotate_points(&points, center, deg_to_rad(angle));
            let back = rotate_points(&there, center, deg_to_rad(-angle));
            for (a, b) in points.iter().zip(back.iter()) {
                prop_assert!((*a - *b).length() < 1e-2);
            }
        }
    }
}
