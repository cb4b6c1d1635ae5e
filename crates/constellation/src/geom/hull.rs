//! Convex hulls and the `BareHull` boundary type.

use std::cmp::Ordering;

use super::{orient, signed_area, vertex_mean, Pt2, Segment, DEDUP_EPS};

/// Boundary construction failures (the "degenerate hull" family).
///
/// Callers decide the fallback: skip the taxon or keep its raw points.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum HullError {
    /// Fewer than 3 distinct points.
    #[error("need at least 3 distinct points for a boundary, got {distinct}")]
    TooFewPoints { distinct: usize },
    /// Enough points, but they span no area.
    #[error("all {distinct} distinct points are collinear")]
    Collinear { distinct: usize },
    /// A coordinate is NaN or infinite.
    #[error("point {index} has a non-finite coordinate")]
    NonFinite { index: usize },
}

fn lexicographic(a: &Pt2, b: &Pt2) -> Ordering {
    match a.x.total_cmp(&b.x) {
        Ordering::Equal => a.y.total_cmp(&b.y),
        o => o,
    }
}

/// Andrew's monotone chain, returning indices into `points` in CCW order.
///
/// Collinear boundary points are dropped; duplicates keep their lowest index.
/// The first index is the lexicographically smallest point. Returns fewer than
/// 3 indices for degenerate input (and nothing if any point is non-finite).
pub fn convex_hull_indices(points: &[Pt2]) -> Vec<usize> {
    if points.iter().any(|p| !(p.x.is_finite() && p.y.is_finite())) {
        return Vec::new();
    }
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&i, &j| lexicographic(&points[i], &points[j]).then(i.cmp(&j)));
    order.dedup_by(|i, j| (points[*i] - points[*j]).norm() <= DEDUP_EPS);
    if order.len() < 3 {
        return order;
    }
    let mut lower: Vec<usize> = Vec::with_capacity(order.len());
    for &i in &order {
        while lower.len() >= 2
            && orient(
                points[lower[lower.len() - 2]],
                points[lower[lower.len() - 1]],
                points[i],
            ) <= 0.0
        {
            lower.pop();
        }
        lower.push(i);
    }
    let mut upper: Vec<usize> = Vec::with_capacity(order.len());
    for &i in order.iter().rev() {
        while upper.len() >= 2
            && orient(
                points[upper[upper.len() - 2]],
                points[upper[upper.len() - 1]],
                points[i],
            ) <= 0.0
        {
            upper.pop();
        }
        upper.push(i);
    }
    lower.pop();
    upper.pop();
    let mut hull = lower;
    hull.extend(upper);
    // All-collinear input collapses to the two extremes.
    if hull.len() < 3 {
        hull.truncate(2);
    }
    hull
}

/// Convex hull vertices in CCW order.
pub fn convex_hull(points: &[Pt2]) -> Vec<Pt2> {
    convex_hull_indices(points)
        .into_iter()
        .map(|i| points[i])
        .collect()
}

/// A simple, closed, counter-clockwise boundary.
///
/// Invariants:
/// - at least 3 vertices, all finite;
/// - no two consecutive vertices coincide (including `last → first`);
/// - positive signed area (CCW).
///
/// The vertex list is private so the invariants cannot be broken after
/// construction; `BareHull` is immutable.
#[derive(Clone, Debug, PartialEq)]
pub struct BareHull {
    points: Vec<Pt2>,
}

impl BareHull {
    /// Adopt an ordered boundary, dropping consecutive duplicates and
    /// reversing clockwise input.
    pub fn from_ring(mut points: Vec<Pt2>) -> Result<Self, HullError> {
        if let Some(index) = points
            .iter()
            .position(|p| !(p.x.is_finite() && p.y.is_finite()))
        {
            return Err(HullError::NonFinite { index });
        }
        points.dedup_by(|a, b| (*a - *b).norm() <= DEDUP_EPS);
        while points.len() > 1
            && (points[0] - points[points.len() - 1]).norm() <= DEDUP_EPS
        {
            points.pop();
        }
        if points.len() < 3 {
            return Err(HullError::TooFewPoints {
                distinct: points.len(),
            });
        }
        let area = signed_area(&points);
        if area == 0.0 || !area.is_finite() {
            return Err(HullError::Collinear {
                distinct: points.len(),
            });
        }
        if area < 0.0 {
            points.reverse();
        }
        Ok(Self { points })
    }

    /// Convex hull of a raw point cloud.
    pub fn from_point_cloud(points: &[Pt2]) -> Result<Self, HullError> {
        if let Some(index) = points
            .iter()
            .position(|p| !(p.x.is_finite() && p.y.is_finite()))
        {
            return Err(HullError::NonFinite { index });
        }
        let hull = convex_hull_indices(points);
        if hull.len() < 3 {
            let mut distinct: Vec<Pt2> = points.to_vec();
            distinct.sort_by(lexicographic);
            distinct.dedup_by(|a, b| (*a - *b).norm() <= DEDUP_EPS);
            return Err(if distinct.len() < 3 {
                HullError::TooFewPoints {
                    distinct: distinct.len(),
                }
            } else {
                HullError::Collinear {
                    distinct: distinct.len(),
                }
            });
        }
        Ok(Self {
            points: hull.into_iter().map(|i| points[i]).collect(),
        })
    }

    #[inline]
    pub fn points(&self) -> &[Pt2] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Vertex index list `0..len`.
    #[inline]
    pub fn vertices(&self) -> std::ops::Range<usize> {
        0..self.points.len()
    }

    /// Index pairs of consecutive vertices, wrapping at the end.
    pub fn i_segments(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (i, (i + 1) % n))
    }

    /// Edges in boundary order, wrapping at the end.
    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.i_segments()
            .map(move |(i, j)| Segment::new(self.points[i], self.points[j]))
    }

    /// Enclosed area (positive).
    pub fn area(&self) -> f64 {
        signed_area(&self.points)
    }

    /// Mean of the vertices.
    pub fn vertex_mean(&self) -> Pt2 {
        vertex_mean(&self.points).unwrap_or_else(Pt2::zeros)
    }

    /// Convex hull of this boundary's vertices (itself, if already convex).
    pub fn convex_envelope(&self) -> Vec<Pt2> {
        convex_hull(&self.points)
    }

    /// Axis-aligned bounds `(min, max)`.
    pub fn bounds(&self) -> (Pt2, Pt2) {
        let mut lo = self.points[0];
        let mut hi = self.points[0];
        for p in &self.points[1..] {
            lo = lo.inf(p);
            hi = hi.sup(p);
        }
        (lo, hi)
    }
}
