//! The simulated car: rigid-body state, hull and sensor geometry
//!
//! Screen coordinates: y grows downward, angle 0 faces "up" (negative y),
//! positive angles turn clockwise.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::segment::{Intersection, Segment};
use super::track::Track;
use crate::consts::*;
use crate::settings::{ControlThresholds, SimulationConfig};
use crate::{Controls, Sensors, deg_to_rad, rotate_points};

/// Sensor ray order
pub const SENSOR_FRONT_LEFT: usize = 0;
pub const SENSOR_FRONT_RIGHT: usize = 1;
pub const SENSOR_FORWARD: usize = 2;

/// Hull corner order
pub const CORNER_TOP_LEFT: usize = 0;
pub const CORNER_TOP_RIGHT: usize = 1;
pub const CORNER_BOTTOM_RIGHT: usize = 2;
pub const CORNER_BOTTOM_LEFT: usize = 3;

/// Colour hint for renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HullTint {
    Clear,
    Colliding,
}

/// Per-tick renderable view of a car
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarSnapshot {
    pub center: Vec2,
    pub rotated_corners: [Vec2; 4],
    pub rotated_sensor_anchors: [Vec2; SENSOR_COUNT],
    pub sensor_hits: [Vec2; SENSOR_COUNT],
    pub alive: bool,
    pub tint: HullTint,
}

/// A car on the track
#[derive(Debug, Clone)]
pub struct Car {
    pub center: Vec2,
    pub velocity: Vec2,
    /// Heading in degrees
    pub angle: f32,
    /// Heading in radians, refreshed by `integrate`
    pub radian: f32,
    /// Degrees per second
    pub angular_velocity: f32,
    pub half_width: f32,
    pub half_height: f32,

    /// Axis-aligned hull around `center`
    pub corners: [Vec2; 4],
    /// Collision hull
    pub rotated_corners: [Vec2; 4],
    /// Un-clipped ray endpoints before rotation
    pub sensor_anchors: [Vec2; SENSOR_COUNT],
    /// Un-clipped ray endpoints
    pub rotated_sensor_anchors: [Vec2; SENSOR_COUNT],
    /// First wall hit along each ray, or the anchor when the ray is clear
    pub sensor_hits: [Vec2; SENSOR_COUNT],
    /// Distances from `center` to each `sensor_hits` entry
    pub sensor_distances: Sensors,

    /// Flat index of the next gate's first point (always even)
    pub next_checkpoint: usize,
    pub fitness: f32,
    /// Simulated seconds since the last gate (or spawn)
    pub time_since_checkpoint: f32,
    pub alive: bool,
}

impl Car {
    /// Place a fresh car on the start point, heading 0, geometry computed
    pub fn spawn(track: &Track, detection_range: f32) -> Self {
        let mut car = Self {
            center: track.start(),
            velocity: Vec2::ZERO,
            angle: 0.0,
            radian: 0.0,
            angular_velocity: 0.0,
            half_width: CAR_HALF_WIDTH,
            half_height: CAR_HALF_HEIGHT,
            corners: [Vec2::ZERO; 4],
            rotated_corners: [Vec2::ZERO; 4],
            sensor_anchors: [Vec2::ZERO; SENSOR_COUNT],
            rotated_sensor_anchors: [Vec2::ZERO; SENSOR_COUNT],
            sensor_hits: [Vec2::ZERO; SENSOR_COUNT],
            sensor_distances: [0.0; SENSOR_COUNT],
            next_checkpoint: 0,
            fitness: 0.0,
            time_since_checkpoint: 0.0,
            alive: true,
        };
        car.refresh_geometry(track, detection_range);
        car
    }

    /// Advance motion by `dt` seconds under drag
    pub fn integrate(&mut self, dt: f32, drag: f32, angular_drag: f32) {
        self.center += self.velocity * dt;
        self.velocity *= drag;
        self.angle += self.angular_velocity * dt;
        self.angular_velocity *= angular_drag;
        self.radian = deg_to_rad(self.angle);
        self.time_since_checkpoint += dt;
    }

    /// Thrust along the current heading
    pub fn accelerate(&mut self, acceleration: f32) {
        self.velocity += Vec2::new(self.radian.sin(), -self.radian.cos()) * acceleration;
    }

    pub fn rotate_right(&mut self, turn_speed: f32) {
        self.angular_velocity += turn_speed;
        self.angle += turn_speed;
    }

    pub fn rotate_left(&mut self, turn_speed: f32) {
        self.angular_velocity -= turn_speed;
        self.angle -= turn_speed;
    }

    /// Apply driver outputs that clear their thresholds
    pub fn apply_controls(&mut self, controls: &Controls, config: &SimulationConfig) {
        let ControlThresholds {
            accelerate,
            turn_right,
            turn_left,
        } = config.thresholds;

        if controls[0] > accelerate {
            self.accelerate(config.acceleration);
        }
        if controls[1] > turn_right {
            self.rotate_right(config.turn_speed);
        }
        if controls[2] > turn_left {
            self.rotate_left(config.turn_speed);
        }
    }

    /// Rebuild hull, sensor rays, hits and distances from the current pose
    pub fn refresh_geometry(&mut self, track: &Track, detection_range: f32) {
        let c = self.center;
        let (hw, hh) = (self.half_width, self.half_height);

        self.corners = [
            Vec2::new(c.x - hw, c.y - hh),
            Vec2::new(c.x + hw, c.y - hh),
            Vec2::new(c.x + hw, c.y + hh),
            Vec2::new(c.x - hw, c.y + hh),
        ];

        let (rw, rh) = (hw * detection_range, hh * detection_range);
        self.sensor_anchors = [
            Vec2::new(c.x - rw, c.y - rh),
            Vec2::new(c.x + rw, c.y - rh),
            Vec2::new(c.x, c.y - rh),
        ];

        self.rotated_corners = rotate_points(&self.corners, c, self.radian);
        self.rotated_sensor_anchors = rotate_points(&self.sensor_anchors, c, self.radian);

        for i in 0..SENSOR_COUNT {
            let ray = Segment::new(c, self.rotated_sensor_anchors[i]);
            let hit = first_wall_hit(track, &ray).unwrap_or(ray.end);
            self.sensor_hits[i] = hit;
            self.sensor_distances[i] = (hit - c).length();
        }
    }

    /// Top, left and right hull edges. The rear edge never collides.
    pub fn hull_edges(&self) -> [Segment; 3] {
        let r = &self.rotated_corners;
        [
            Segment::new(r[CORNER_TOP_LEFT], r[CORNER_TOP_RIGHT]),
            Segment::new(r[CORNER_TOP_LEFT], r[CORNER_BOTTOM_LEFT]),
            Segment::new(r[CORNER_TOP_RIGHT], r[CORNER_BOTTOM_RIGHT]),
        ]
    }

    /// True if any collision edge touches a wall segment
    pub fn collides_with_wall(&self, track: &Track) -> bool {
        let edges = self.hull_edges();
        track
            .wall_segments()
            .any(|wall| edges.iter().any(|edge| wall.intersects(edge)))
    }

    /// Check the next expected gate only; on a hit advance to the following one.
    pub fn cross_checkpoint(&mut self, track: &Track) -> bool {
        let gate = track.gate(self.next_checkpoint);
        if !self.hull_edges().iter().any(|edge| gate.intersects(edge)) {
            return false;
        }

        self.next_checkpoint += 2;
        if self.next_checkpoint >= track.checkpoints().len() {
            self.next_checkpoint = 0;
        }
        self.time_since_checkpoint = 0.0;
        true
    }

    pub fn snapshot(&self, track: &Track) -> CarSnapshot {
        CarSnapshot {
            center: self.center,
            rotated_corners: self.rotated_corners,
            rotated_sensor_anchors: self.rotated_sensor_anchors,
            sensor_hits: self.sensor_hits,
            alive: self.alive,
            tint: if self.collides_with_wall(track) {
                HullTint::Colliding
            } else {
                HullTint::Clear
            },
        }
    }
}

/// First wall segment (outer, then inner, in polyline order) crossed by `ray`.
///
/// Not necessarily the nearest. Collinear overlaps have no determinate
/// crossing point and are skipped.
fn first_wall_hit(track: &Track, ray: &Segment) -> Option<Vec2> {
    track
        .wall_segments()
        .filter(|wall| wall.intersects(ray))
        .find_map(|wall| match wall.intersection_point(ray) {
            Intersection::Hit(p) => Some(p),
            Intersection::Parallel => None,
        })
}
