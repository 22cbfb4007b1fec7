//! Line segment geometry
//!
//! Two primitives drive everything else: an inclusive segment/segment
//! intersection test, and the crossing point of the infinite lines through
//! two segments.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Lines whose crossing angle has a sine below this are treated as parallel
pub const PARALLEL_EPSILON: f32 = 1e-6;

/// A directed line segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Vec2,
    pub end: Vec2,
}

impl Segment {
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn length(&self) -> f32 {
        (self.end - self.start).length()
    }

    /// True if the two segments share at least one point
    #[inline]
    pub fn intersects(&self, other: &Segment) -> bool {
        segments_intersect(self.start, self.end, other.start, other.end)
    }

    /// Crossing point of the lines through both segments
    #[inline]
    pub fn intersection_point(&self, other: &Segment) -> Intersection {
        segment_intersection_point(self.start, self.end, other.start, other.end)
    }
}

/// Result of a line/line crossing computation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intersection {
    /// The lines cross at this point
    Hit(Vec2),
    /// The lines are parallel (or collinear): no single crossing point
    Parallel,
}

impl Intersection {
    pub fn point(self) -> Option<Vec2> {
        match self {
            Intersection::Hit(p) => Some(p),
            Intersection::Parallel => None,
        }
    }
}

/// Signed area of the triangle (p, q, r); sign gives the turn direction
#[inline]
fn orientation(p: Vec2, q: Vec2, r: Vec2) -> f32 {
    (q - p).perp_dot(r - p)
}

/// `r` lies inside the bounding box of `p`-`q` (only meaningful when collinear)
#[inline]
fn within_bounds(p: Vec2, q: Vec2, r: Vec2) -> bool {
    r.x >= p.x.min(q.x) && r.x <= p.x.max(q.x) && r.y >= p.y.min(q.y) && r.y <= p.y.max(q.y)
}

/// True iff segment a1-a2 and segment b1-b2 share at least one point.
///
/// Touching endpoints and collinear overlap both count as intersecting.
pub fn segments_intersect(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> bool {
    let d1 = orientation(b1, b2, a1);
    let d2 = orientation(b1, b2, a2);
    let d3 = orientation(a1, a2, b1);
    let d4 = orientation(a1, a2, b2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && within_bounds(b1, b2, a1))
        || (d2 == 0.0 && within_bounds(b1, b2, a2))
        || (d3 == 0.0 && within_bounds(a1, a2, b1))
        || (d4 == 0.0 && within_bounds(a1, a2, b2))
}

/// Crossing point of the infinite lines through a1-a2 and b1-b2 (Cramer's rule).
///
/// Only meaningful once [`segments_intersect`] has confirmed the segments
/// meet. Parallel and collinear lines yield [`Intersection::Parallel`].
pub fn segment_intersection_point(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> Intersection {
    let det = |a: Vec2, b: Vec2| a.x * b.y - a.y * b.x;

    let xdiff = Vec2::new(a1.x - a2.x, b1.x - b2.x);
    let ydiff = Vec2::new(a1.y - a2.y, b1.y - b2.y);

    let div = det(xdiff, ydiff);
    if div.abs() <= PARALLEL_EPSILON * (a2 - a1).length() * (b2 - b1).length() {
        return Intersection::Parallel;
    }

    let d = Vec2::new(det(a1, a2), det(b1, b2));
    Intersection::Hit(Vec2::new(det(d, xdiff) / div, det(d, ydiff) / div))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y)
    }

    #[test]
    fn test_crossing_segments() {
        assert!(segments_intersect(v(0.0, 0.0), v(10.0, 10.0), v(0.0, 10.0), v(10.0, 0.0)));
        let p = segment_intersection_point(v(0.0, 0.0), v(10.0, 10.0), v(0.0, 10.0), v(10.0, 0.0));
        let p = p.point().unwrap();
        assert!((p - v(5.0, 5.0)).length() < 1e-4);
    }

    #[test]
    fn test_disjoint_segments() {
        assert!(!segments_intersect(v(0.0, 0.0), v(1.0, 0.0), v(0.0, 1.0), v(1.0, 1.0)));
        // Lines cross, segments don't
        assert!(!segments_intersect(v(0.0, 0.0), v(1.0, 1.0), v(3.0, 0.0), v(2.0, 1.0)));
    }

    #[test]
    fn test_shared_endpoint_counts() {
        assert!(segments_intersect(v(0.0, 0.0), v(5.0, 0.0), v(5.0, 0.0), v(5.0, 5.0)));
        // T-junction: endpoint touches the interior of the other segment
        assert!(segments_intersect(v(0.0, 0.0), v(10.0, 0.0), v(5.0, 0.0), v(5.0, 5.0)));
    }

    #[test]
    fn test_collinear_overlap_counts() {
        assert!(segments_intersect(v(0.0, 0.0), v(10.0, 0.0), v(5.0, 0.0), v(15.0, 0.0)));
        // Collinear but separated
        assert!(!segments_intersect(v(0.0, 0.0), v(4.0, 0.0), v(5.0, 0.0), v(15.0, 0.0)));
    }

    #[test]
    fn test_parallel_has_no_point() {
        let r = segment_intersection_point(v(0.0, 0.0), v(10.0, 0.0), v(0.0, 5.0), v(10.0, 5.0));
        assert_eq!(r, Intersection::Parallel);
        assert_eq!(r.point(), None);

        let collinear =
            segment_intersection_point(v(0.0, 0.0), v(10.0, 0.0), v(5.0, 0.0), v(15.0, 0.0));
        assert_eq!(collinear, Intersection::Parallel);
    }

    #[test]
    fn test_segment_methods() {
        let wall = Segment::new(v(0.0, 0.0), v(1000.0, 0.0));
        let ray = Segment::new(v(200.0, 500.0), v(200.0, -100.0));
        assert!(wall.intersects(&ray));
        let p = wall.intersection_point(&ray).point().unwrap();
        assert!((p - v(200.0, 0.0)).length() < 1e-3);
        assert!((ray.length() - 600.0).abs() < 1e-3);
    }
}
