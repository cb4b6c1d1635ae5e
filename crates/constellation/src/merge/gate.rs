//! Quality-gated merging for leaf hulls built from raw cell points.
//!
//! Topological union (`merge`) assumes both boundaries are correct. Leaf hulls
//! come from noisy point clouds, so combining two of them risks enclosing
//! cells of other taxa ("false positives"). The gate here decides whether a
//! merge is worth it, judged against a held-out set of labelled test points.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geom::{classify, BareHull, Pt2};

/// Gate thresholds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GateCfg {
    /// Bounding-box padding, as a fraction of the extent, when selecting test
    /// points around a taxon.
    pub slop: f64,
    /// Accept if the new false positives are at most this fraction of the sum
    /// of the two hulls' own false-positive counts.
    pub fp_sum_fraction: f64,
    /// Accept if the new false positives are below this fraction of the points
    /// the two hulls already contain.
    pub fp_union_fraction: f64,
}

impl Default for GateCfg {
    fn default() -> Self {
        Self {
            slop: 0.05,
            fp_sum_fraction: 0.5,
            fp_union_fraction: 0.05,
        }
    }
}

/// Labelled test points: `valid[i]` iff `points[i]` belongs to the taxon.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TestPoints {
    points: Vec<Pt2>,
    valid: Vec<bool>,
}

impl TestPoints {
    /// Pairs points with validity flags; `None` on length mismatch.
    pub fn new(points: Vec<Pt2>, valid: Vec<bool>) -> Option<Self> {
        (points.len() == valid.len()).then_some(Self { points, valid })
    }

    /// Cells strictly inside the member cells' bounding box, padded by
    /// `slop` of the extent on every side. Validity is membership.
    ///
    /// Returns `None` if no cell is a member or the inputs disagree in length.
    pub fn select(all: &[Pt2], member: &[bool], slop: f64) -> Option<Self> {
        if all.len() != member.len() {
            return None;
        }
        let mut members = all.iter().zip(member).filter(|(_, m)| **m).map(|(p, _)| *p);
        let first = members.next()?;
        let (mut lo, mut hi) = (first, first);
        for p in members {
            lo = lo.inf(&p);
            hi = hi.sup(&p);
        }
        let pad = (hi - lo) * slop;
        lo -= pad;
        hi += pad;
        let mut points = Vec::new();
        let mut valid = Vec::new();
        for (p, m) in all.iter().zip(member) {
            if p.x > lo.x && p.x < hi.x && p.y > lo.y && p.y < hi.y {
                points.push(*p);
                valid.push(*m);
            }
        }
        Some(Self { points, valid })
    }

    pub fn points(&self) -> &[Pt2] {
        &self.points
    }
    pub fn valid(&self) -> &[bool] {
        &self.valid
    }
    pub fn len(&self) -> usize {
        self.points.len()
    }
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Merge `h0` and `h1` into the convex hull of their vertices if the gate
/// admits it; `None` otherwise.
///
/// With `in0`, `in1`, `in_new` the strict-interior masks and `fp` the invalid
/// points among them, the merge is accepted iff
/// `fp_new - |fp0 ∪ fp1| <= fp_sum_fraction * (|fp0| + |fp1|)` or
/// `fp_new - |fp0 ∪ fp1| < fp_union_fraction * |in0 ∪ in1|`.
pub fn evaluate_merger(
    h0: &BareHull,
    h1: &BareHull,
    test: &TestPoints,
    cfg: &GateCfg,
) -> Option<BareHull> {
    let mut combined: Vec<Pt2> = Vec::with_capacity(h0.len() + h1.len());
    combined.extend_from_slice(h0.points());
    combined.extend_from_slice(h1.points());
    let candidate = BareHull::from_point_cloud(&combined).ok()?;

    let in_new = classify(test.points(), candidate.points());
    let in0 = classify(test.points(), &h0.convex_envelope());
    let in1 = classify(test.points(), &h1.convex_envelope());

    let mut fp_new = 0usize;
    let mut fp0 = 0usize;
    let mut fp1 = 0usize;
    let mut fp_old = 0usize;
    let mut in_old = 0usize;
    for (k, valid) in test.valid().iter().enumerate() {
        let false_point = !valid;
        if in_new[k] && false_point {
            fp_new += 1;
        }
        if in0[k] && false_point {
            fp0 += 1;
        }
        if in1[k] && false_point {
            fp1 += 1;
        }
        if (in0[k] || in1[k]) && false_point {
            fp_old += 1;
        }
        if in0[k] || in1[k] {
            in_old += 1;
        }
    }

    let delta_fp = fp_new as f64 - fp_old as f64;
    let accept = delta_fp <= cfg.fp_sum_fraction * (fp0 + fp1) as f64
        || delta_fp < cfg.fp_union_fraction * in_old as f64;
    debug!(fp_new, fp_old, fp0, fp1, in_old, accept, "evaluated leaf merger");
    accept.then_some(candidate)
}

/// Greedy gated assembly of one taxon's leaf hulls.
///
/// Each pass computes the vertex-mean centroid of every hull and the squared
/// distance matrix between them. Only pairs closer than the median over the
/// first `n/2` columns (all columns when that is fewer than 10) are tried.
/// Rows are visited in ascending distance from hull 0; each unmerged row tries
/// its unmerged neighbours nearest-first and takes the first pair the gate
/// admits. The merged hull replaces the first member of its pair. Passes
/// repeat until nothing merges or a single hull remains.
pub fn assemble_leaf_hulls(
    hulls: Vec<BareHull>,
    test: &TestPoints,
    cfg: &GateCfg,
) -> Vec<BareHull> {
    let mut work = hulls;
    while work.len() > 1 {
        let n = work.len();
        let centroids: Vec<Pt2> = work.iter().map(BareHull::vertex_mean).collect();
        let dsq: Vec<Vec<f64>> = centroids
            .iter()
            .map(|a| centroids.iter().map(|b| (a - b).norm_squared()).collect())
            .collect();
        let threshold = median_threshold(&dsq);

        let mut merged_into: Vec<Option<BareHull>> = vec![None; n];
        let mut consumed = vec![false; n];
        let mut any = false;
        for i0 in ascending(&dsq[0]) {
            if consumed[i0] {
                continue;
            }
            for i1 in ascending(&dsq[i0]) {
                if i1 == i0 || consumed[i1] || dsq[i0][i1] > threshold {
                    continue;
                }
                if let Some(h) = evaluate_merger(&work[i0], &work[i1], test, cfg) {
                    debug!(i0, i1, "gated merge accepted");
                    merged_into[i0] = Some(h);
                    consumed[i0] = true;
                    consumed[i1] = true;
                    any = true;
                    break;
                }
            }
        }
        if !any {
            break;
        }
        work = work
            .into_iter()
            .zip(merged_into)
            .enumerate()
            .filter_map(|(i, (h, m))| match m {
                Some(merged) => Some(merged),
                None if !consumed[i] => Some(h),
                None => None,
            })
            .collect();
    }
    work
}

/// Column indices of `row` sorted by value (stable).
fn ascending(row: &[f64]) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..row.len()).collect();
    idx.sort_by(|&a, &b| row[a].total_cmp(&row[b]));
    idx
}

fn median_threshold(dsq: &[Vec<f64>]) -> f64 {
    let n = dsq.len();
    let mut n_cols = n / 2;
    if n_cols < 10 {
        n_cols = n;
    }
    let mut values: Vec<f64> = dsq
        .iter()
        .flat_map(|row| row[..n_cols].iter().copied())
        .collect();
    values.sort_by(f64::total_cmp);
    let m = values.len();
    if m == 0 {
        return 0.0;
    }
    if m % 2 == 1 {
        values[m / 2]
    } else {
        0.5 * (values[m / 2 - 1] + values[m / 2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;

    #[test]
    fn median_of_small_matrix_uses_all_columns() {
        let dsq = vec![vec![0.0, 1.0, 4.0], vec![1.0, 0.0, 9.0], vec![4.0, 9.0, 0.0]];
        // sorted: 0 0 0 1 1 4 4 9 9 -> median 1
        assert_eq!(median_threshold(&dsq), 1.0);
    }

    #[test]
    fn select_pads_bounding_box() {
        let all = vec![
            vector![0.0, 0.0],
            vector![10.0, 10.0],
            vector![10.4, 5.0],
            vector![10.6, 5.0],
            vector![5.0, 5.0],
        ];
        let member = vec![true, true, false, false, false];
        let t = TestPoints::select(&all, &member, 0.05).unwrap();
        // Box is (-0.5, 10.5)^2, strict: both members, the 10.4 point and (5,5).
        assert_eq!(t.len(), 4);
        assert_eq!(t.valid(), &[true, true, false, false]);
    }

    #[test]
    fn select_without_members_is_none() {
        let all = vec![vector![0.0, 0.0]];
        assert!(TestPoints::select(&all, &[false], 0.05).is_none());
        assert!(TestPoints::select(&all, &[], 0.05).is_none());
    }
}
