//! Track geometry: two wall polylines, ordered checkpoint gates, a start point
//!
//! Loaded once and read-only thereafter. Every car in an episode borrows
//! the same `Track`.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::segment::Segment;

/// Which wall polyline a validation error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallSide {
    Outer,
    Inner,
}

impl std::fmt::Display for WallSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WallSide::Outer => f.write_str("outer"),
            WallSide::Inner => f.write_str("inner"),
        }
    }
}

/// Errors raised when loading or validating track geometry.
#[derive(Debug, Error)]
pub enum TrackError {
    #[error("{wall} wall needs at least 2 points (got {count})")]
    TooFewWallPoints { wall: WallSide, count: usize },
    #[error("track needs at least one checkpoint gate")]
    NoCheckpoints,
    #[error("checkpoint points must come in pairs (got {count})")]
    OddCheckpointCount { count: usize },
    #[error("failed to read track file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed track file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Raw serialized track layout
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TrackData {
    outer_wall: Vec<Vec2>,
    inner_wall: Vec<Vec2>,
    checkpoints: Vec<Vec2>,
    start: Vec2,
}

/// Validated, immutable track
#[derive(Debug, Clone, Serialize)]
pub struct Track {
    outer_wall: Vec<Vec2>,
    inner_wall: Vec<Vec2>,
    checkpoints: Vec<Vec2>,
    start: Vec2,
}

impl Track {
    /// Build a track, refusing geometry that would leave sensing undefined.
    ///
    /// Walls are not closed automatically: repeat the first point at the end
    /// of a polyline to close it.
    pub fn new(
        outer_wall: Vec<Vec2>,
        inner_wall: Vec<Vec2>,
        checkpoints: Vec<Vec2>,
        start: Vec2,
    ) -> Result<Self, TrackError> {
        if outer_wall.len() < 2 {
            return Err(TrackError::TooFewWallPoints {
                wall: WallSide::Outer,
                count: outer_wall.len(),
            });
        }
        if inner_wall.len() < 2 {
            return Err(TrackError::TooFewWallPoints {
                wall: WallSide::Inner,
                count: inner_wall.len(),
            });
        }
        if checkpoints.is_empty() {
            return Err(TrackError::NoCheckpoints);
        }
        if checkpoints.len() % 2 != 0 {
            return Err(TrackError::OddCheckpointCount {
                count: checkpoints.len(),
            });
        }

        Ok(Self {
            outer_wall,
            inner_wall,
            checkpoints,
            start,
        })
    }

    /// Parse a track from JSON
    pub fn from_json(json: &str) -> Result<Self, TrackError> {
        let data: TrackData = serde_json::from_str(json)?;
        Self::new(data.outer_wall, data.inner_wall, data.checkpoints, data.start)
    }

    /// Load a track from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TrackError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let track = Self::from_json(&json)?;
        log::info!(
            "Loaded track {}: {} outer / {} inner wall points, {} gates",
            path.as_ref().display(),
            track.outer_wall.len(),
            track.inner_wall.len(),
            track.gate_count()
        );
        Ok(track)
    }

    pub fn outer_wall(&self) -> &[Vec2] {
        &self.outer_wall
    }

    pub fn inner_wall(&self) -> &[Vec2] {
        &self.inner_wall
    }

    /// Flat checkpoint list; gate k is `(checkpoints[2k], checkpoints[2k+1])`
    pub fn checkpoints(&self) -> &[Vec2] {
        &self.checkpoints
    }

    pub fn start(&self) -> Vec2 {
        self.start
    }

    pub fn gate_count(&self) -> usize {
        self.checkpoints.len() / 2
    }

    /// Gate starting at flat index `index` (always even)
    pub fn gate(&self, index: usize) -> Segment {
        Segment::new(self.checkpoints[index], self.checkpoints[index + 1])
    }

    /// All wall segments: outer polyline first, then inner
    pub fn wall_segments(&self) -> impl Iterator<Item = Segment> + '_ {
        polyline_segments(&self.outer_wall).chain(polyline_segments(&self.inner_wall))
    }

    /// Two concentric axis-aligned squares with one gate across each corridor.
    ///
    /// Outer (0,0)-(1000,1000), inner (400,400)-(600,600), start (200,500).
    pub fn concentric_rectangles() -> Self {
        let square = |min: f32, max: f32| {
            vec![
                Vec2::new(min, min),
                Vec2::new(max, min),
                Vec2::new(max, max),
                Vec2::new(min, max),
                Vec2::new(min, min),
            ]
        };
        let checkpoints = vec![
            // Left corridor, ahead of the start
            Vec2::new(0.0, 300.0),
            Vec2::new(400.0, 300.0),
            // Top corridor
            Vec2::new(500.0, 0.0),
            Vec2::new(500.0, 400.0),
            // Right corridor
            Vec2::new(600.0, 500.0),
            Vec2::new(1000.0, 500.0),
            // Bottom corridor
            Vec2::new(500.0, 600.0),
            Vec2::new(500.0, 1000.0),
        ];
        Self {
            outer_wall: square(0.0, 1000.0),
            inner_wall: square(400.0, 600.0),
            checkpoints,
            start: Vec2::new(200.0, 500.0),
        }
    }
}

/// Consecutive point pairs of a polyline
fn polyline_segments(points: &[Vec2]) -> impl Iterator<Item = Segment> + '_ {
    points.windows(2).map(|w| Segment::new(w[0], w[1]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall() -> Vec<Vec2> {
        vec![Vec2::ZERO, Vec2::new(100.0, 0.0)]
    }

    #[test]
    fn test_rejects_short_walls() {
        let err = Track::new(vec![Vec2::ZERO], wall(), wall(), Vec2::ZERO).unwrap_err();
        assert!(matches!(
            err,
            TrackError::TooFewWallPoints { wall: WallSide::Outer, count: 1 }
        ));

        let err = Track::new(wall(), vec![], wall(), Vec2::ZERO).unwrap_err();
        assert!(matches!(
            err,
            TrackError::TooFewWallPoints { wall: WallSide::Inner, count: 0 }
        ));
    }

    #[test]
    fn test_rejects_bad_checkpoints() {
        let err = Track::new(wall(), wall(), vec![], Vec2::ZERO).unwrap_err();
        assert!(matches!(err, TrackError::NoCheckpoints));

        let odd = vec![Vec2::ZERO, Vec2::ONE, Vec2::X];
        let err = Track::new(wall(), wall(), odd, Vec2::ZERO).unwrap_err();
        assert!(matches!(err, TrackError::OddCheckpointCount { count: 3 }));
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "outer_wall": [[0, 0], [100, 0], [100, 100], [0, 0]],
            "inner_wall": [[40, 40], [60, 40]],
            "checkpoints": [[0, 50], [40, 50]],
            "start": [20, 80]
        }"#;
        let track = Track::from_json(json).unwrap();
        assert_eq!(track.outer_wall().len(), 4);
        assert_eq!(track.gate_count(), 1);
        assert_eq!(track.start(), Vec2::new(20.0, 80.0));
        // 3 outer + 1 inner segment, no implicit closing segment
        assert_eq!(track.wall_segments().count(), 4);
    }

    #[test]
    fn test_from_json_validates() {
        let json = r#"{
            "outer_wall": [[0, 0], [100, 0]],
            "inner_wall": [[40, 40], [60, 40]],
            "checkpoints": [[0, 50]],
            "start": [20, 80]
        }"#;
        assert!(matches!(
            Track::from_json(json),
            Err(TrackError::OddCheckpointCount { count: 1 })
        ));
        assert!(matches!(Track::from_json("{"), Err(TrackError::Json(_))));
    }

    #[test]
    fn test_concentric_rectangles() {
        let track = Track::concentric_rectangles();
        assert_eq!(track.gate_count(), 4);
        assert_eq!(track.wall_segments().count(), 8);
        assert_eq!(track.gate(2), Segment::new(Vec2::new(500.0, 0.0), Vec2::new(500.0, 400.0)));
    }
}
