//! Deterministic simulation module
//!
//! Everything a run needs lives here and stays pure:
//! - Caller-supplied tick length only (no wall clock)
//! - Stable iteration order (pilots in insertion order)
//! - No rendering or platform dependencies

pub mod car;
pub mod episode;
pub mod segment;
pub mod tick;
pub mod track;

pub use car::{Car, CarSnapshot, HullTint};
pub use episode::{AbortHandle, Driver, Episode, PilotId};
pub use segment::{Intersection, Segment, segment_intersection_point, segments_intersect};
pub use tick::{DeathCause, Verdict, advance, judge};
pub use track::{Track, TrackError, WallSide};
