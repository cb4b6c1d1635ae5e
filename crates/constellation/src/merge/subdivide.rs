//! Leaf point-cloud subdivision and per-subset hulls.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geom::{BareHull, Pt2};

/// Subdivision limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubdivideCfg {
    /// Split any subset holding more points than this.
    pub max_points: usize,
    /// Drop subsets holding fewer points than this.
    pub min_points: usize,
}

impl Default for SubdivideCfg {
    fn default() -> Self {
        Self {
            max_points: 500,
            min_points: 10,
        }
    }
}

/// Split a cloud into spatially coherent subsets.
///
/// Median split along the longer axis of the bounding box, repeated until
/// every subset fits `max_points`. Ties on the split coordinate are broken by
/// the other coordinate so the result is independent of input order.
pub fn subdivide(points: &[Pt2], cfg: &SubdivideCfg) -> Vec<Vec<Pt2>> {
    let max_points = cfg.max_points.max(3);
    let mut out = Vec::new();
    let mut stack: Vec<Vec<Pt2>> = vec![points.to_vec()];
    while let Some(mut subset) = stack.pop() {
        if subset.len() <= max_points {
            if subset.len() >= cfg.min_points {
                out.push(subset);
            } else if !subset.is_empty() {
                debug!(n = subset.len(), "dropping undersized subset");
            }
            continue;
        }
        let (lo, hi) = extent(&subset);
        let split_x = (hi.x - lo.x) >= (hi.y - lo.y);
        subset.sort_by(|a, b| {
            if split_x {
                a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y))
            } else {
                a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x))
            }
        });
        let upper = subset.split_off(subset.len() / 2);
        // Upper half pushed first so the lower half is emitted first.
        stack.push(upper);
        stack.push(subset);
    }
    out
}

/// One boundary per subset; degenerate subsets are skipped.
pub fn leaf_hulls(subsets: &[Vec<Pt2>]) -> Vec<BareHull> {
    subsets
        .iter()
        .filter_map(|s| match BareHull::from_point_cloud(s) {
            Ok(h) => Some(h),
            Err(err) => {
                debug!(error = %err, n = s.len(), "skipping degenerate leaf subset");
                None
            }
        })
        .collect()
}

fn extent(points: &[Pt2]) -> (Pt2, Pt2) {
    let mut lo = points[0];
    let mut hi = points[0];
    for p in &points[1..] {
        lo = lo.inf(p);
        hi = hi.sup(p);
    }
    (lo, hi)
}
