//! Corner smoothing for boundary paths.
//!
//! Each edge `src → dst` becomes a cubic bezier whose control points sit near
//! the endpoints, tangent to the bisector of the corner at each end. The
//! vertex set is unchanged; only the edges bow. Where a control point comes
//! out non-finite (zero-length or antiparallel edges) the edge stays straight.

use std::f64::consts::FRAC_PI_2;

use crate::geom::{rot, Pt2};

/// Control-point distance as a fraction of the edge length.
pub const SMOOTHING_FACTOR: f64 = 0.1;

/// One edge of a smoothed boundary.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathSegment {
    pub start: Pt2,
    pub end: Pt2,
    /// `(near start, near end)`; `None` draws a straight line.
    pub ctrl: Option<(Pt2, Pt2)>,
}

/// Control point at `center` for the edge heading to `post`.
///
/// The bisector of the unit directions to `pre` and `post` is rotated a
/// quarter turn and oriented toward `post`, then scaled by
/// `SMOOTHING_FACTOR * |post - center|`. `None` if any step is non-finite.
pub fn corner_control_point(pre: Pt2, center: Pt2, post: Pt2) -> Option<Pt2> {
    let v0 = pre - center;
    let v0 = v0 / v0.norm();
    let v1 = post - center;
    let post_norm = v1.norm();
    let v1 = v1 / post_norm;
    let bisector = 0.5 * (v0 + v1);
    let bisector = bisector / bisector.norm();
    let mut orth = rot(bisector, FRAC_PI_2);
    if orth.dot(&v1) < 0.0 {
        orth = -orth;
    }
    let ctrl = center + SMOOTHING_FACTOR * post_norm * orth;
    (ctrl.x.is_finite() && ctrl.y.is_finite()).then_some(ctrl)
}

/// Smoothed closed path through `points` (one segment per edge, wrapping).
pub fn smooth_boundary(points: &[Pt2]) -> Vec<PathSegment> {
    let n = points.len();
    if n < 2 {
        return Vec::new();
    }
    (0..n)
        .map(|i_src| {
            let i_dst = (i_src + 1) % n;
            let pre = points[(i_src + n - 1) % n];
            let post = points[(i_dst + 1) % n];
            let src = points[i_src];
            let dst = points[i_dst];
            let ctrl = corner_control_point(pre, src, dst)
                .zip(corner_control_point(post, dst, src));
            PathSegment {
                start: src,
                end: dst,
                ctrl,
            }
        })
        .collect()
}

/// Flatten to `(start, ctrl_start, end, ctrl_end)` quadruples.
///
/// A straight segment stores its own endpoints as control points, which
/// draws the same line and keeps every stored value finite.
pub fn to_path_points(path: &[PathSegment]) -> Vec<Pt2> {
    let mut out = Vec::with_capacity(4 * path.len());
    for seg in path {
        let (c0, c1) = seg.ctrl.unwrap_or((seg.start, seg.end));
        out.extend([seg.start, c0, seg.end, c1]);
    }
    out
}

/// Inverse of [`to_path_points`]; `None` unless the length is a multiple of 4.
pub fn from_path_points(points: &[Pt2]) -> Option<Vec<PathSegment>> {
    if points.len() % 4 != 0 {
        return None;
    }
    Some(
        points
            .chunks_exact(4)
            .map(|q| {
                let (start, c0, end, c1) = (q[0], q[1], q[2], q[3]);
                let ctrl = (c0 != start || c1 != end).then_some((c0, c1));
                PathSegment { start, end, ctrl }
            })
            .collect(),
    )
}
