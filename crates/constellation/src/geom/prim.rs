//! Stateless 2D primitives.

use nalgebra::Rotation2;

use super::{Pt2, DENOM_EPS};

/// Rotate `v` counter-clockwise by `theta` radians.
#[inline]
pub fn rot(v: Pt2, theta: f64) -> Pt2 {
    Rotation2::new(theta) * v
}

/// z-component of `a × b`. Positive when `b` is counter-clockwise from `a`.
#[inline]
pub fn cross(a: Pt2, b: Pt2) -> f64 {
    a.perp(&b)
}

/// Orientation of the triple `(a, b, c)`: `> 0` for a left turn.
#[inline]
pub fn orient(a: Pt2, b: Pt2, c: Pt2) -> f64 {
    cross(b - a, c - a)
}

/// Directed segment `a → b`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub a: Pt2,
    pub b: Pt2,
}

impl Segment {
    #[inline]
    pub fn new(a: Pt2, b: Pt2) -> Self {
        Self { a, b }
    }
    #[inline]
    pub fn dir(&self) -> Pt2 {
        self.b - self.a
    }
    #[inline]
    pub fn length(&self) -> f64 {
        self.dir().norm()
    }
}

/// A crossing between two segments.
///
/// `t` parameterizes the first segment and `u` the second, so
/// `point == s.a + t * s.dir() == other.a + u * other.dir()`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentHit {
    pub t: f64,
    pub u: f64,
    pub point: Pt2,
}

/// Crossing point of two segments, if any.
///
/// Both parameters use the half-open range `[0, 1)`: a crossing exactly at a
/// shared polygon vertex is reported by the segment that starts there and not
/// by the one that ends there, so walking a closed boundary never counts the
/// same vertex crossing twice. Parallel and collinear segments never cross.
pub fn segment_intersection(s: &Segment, other: &Segment) -> Option<SegmentHit> {
    let r = s.dir();
    let q = other.dir();
    let denom = cross(r, q);
    if !denom.is_finite() || denom.abs() <= DENOM_EPS * r.norm() * q.norm() {
        return None;
    }
    let w = other.a - s.a;
    let t = cross(w, q) / denom;
    let u = cross(w, r) / denom;
    if (0.0..1.0).contains(&t) && (0.0..1.0).contains(&u) {
        Some(SegmentHit {
            t,
            u,
            point: s.a + r * t,
        })
    } else {
        None
    }
}

/// Shoelace signed area. Positive for counter-clockwise vertex order.
pub fn signed_area(points: &[Pt2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut acc = 0.0;
    for i in 0..n {
        acc += cross(points[i], points[(i + 1) % n]);
    }
    0.5 * acc
}

/// Arithmetic mean of the vertices (not the area centroid).
pub fn vertex_mean(points: &[Pt2]) -> Option<Pt2> {
    if points.is_empty() {
        return None;
    }
    let sum = points.iter().fold(Pt2::zeros(), |acc, p| acc + p);
    Some(sum / points.len() as f64)
}
