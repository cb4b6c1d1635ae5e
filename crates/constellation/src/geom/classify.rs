//! Strict point-in-convex-polygon classification.
//!
//! A point is inside iff `cross(p - edge.a, edge.b - edge.a)` has the same,
//! non-zero sign for every edge. Points on an edge or vertex produce a zero
//! and are classified outside; hull-quality heuristics rely on that strict
//! interior semantics.
//!
//! Preconditions
//! - The polygon is convex with a consistent winding. Non-convex input gives
//!   meaningless answers; callers classify against a convex hull instead.

use std::cmp::Ordering;

use super::{cross, Pt2};

/// `true` iff `point` lies strictly inside the convex polygon.
pub fn is_inside(point: Pt2, polygon: &[Pt2]) -> bool {
    classify(std::slice::from_ref(&point), polygon)[0]
}

/// Classify every point against the convex polygon.
///
/// Points are dropped from further edge checks as soon as one edge rejects
/// them, and the scan stops early once no candidate remains.
pub fn classify(points: &[Pt2], polygon: &[Pt2]) -> Vec<bool> {
    let n = polygon.len();
    if n < 3 {
        return vec![false; points.len()];
    }
    let mut inside = vec![true; points.len()];
    let mut reference: Vec<Ordering> = vec![Ordering::Equal; points.len()];
    let mut active: Vec<usize> = (0..points.len()).collect();
    for k in 0..n {
        if active.is_empty() {
            break;
        }
        let src = polygon[k];
        let edge = polygon[(k + 1) % n] - src;
        active.retain(|&i| {
            let sgn = sign(cross(points[i] - src, edge));
            let keep = if sgn == Ordering::Equal {
                false
            } else if k == 0 {
                reference[i] = sgn;
                true
            } else {
                sgn == reference[i]
            };
            if !keep {
                inside[i] = false;
            }
            keep
        });
    }
    inside
}

#[inline]
fn sign(x: f64) -> Ordering {
    if x > 0.0 {
        Ordering::Greater
    } else if x < 0.0 {
        Ordering::Less
    } else {
        // NaN lands here as well and is rejected like a boundary point.
        Ordering::Equal
    }
}
