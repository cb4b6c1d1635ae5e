//! Fixed-point merging into compound hulls, and the taxonomy roll-up.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::union::merge;
use crate::geom::BareHull;

/// Reduce a list of boundaries until no pair merges.
///
/// Each pass scans unordered pairs `(i0, i1)` with `i0 < i1` in index order
/// and applies the first merge found: both inputs are removed and the result
/// is placed at the front. Every successful pass shortens the list by one, so
/// the loop ends after at most `len - 1` merges. Running it again on its own
/// output changes nothing.
pub fn merge_all(hulls: Vec<BareHull>) -> Vec<BareHull> {
    let mut work = hulls;
    let mut passes = 0usize;
    loop {
        passes += 1;
        let mut found: Option<(usize, usize, BareHull)> = None;
        'scan: for i0 in 0..work.len() {
            for i1 in (i0 + 1)..work.len() {
                let mut merged = merge(&work[i0], &work[i1]);
                if merged.len() == 1 {
                    if let Some(h) = merged.pop() {
                        found = Some((i0, i1, h));
                        break 'scan;
                    }
                }
            }
        }
        match found {
            Some((i0, i1, h)) => {
                work.remove(i1);
                work.remove(i0);
                work.insert(0, h);
            }
            None => break,
        }
    }
    debug!(passes, remaining = work.len(), "merge_all reached fixed point");
    work
}

/// One taxon's region: one or more disjoint boundaries with display data.
///
/// Built once per (level, label) and immutable afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct CompoundHull {
    label: String,
    name: String,
    n_cells: u64,
    color: String,
    boundaries: Vec<BareHull>,
}

impl CompoundHull {
    /// Merge `candidates` to a fixed point and bind them to a taxon.
    ///
    /// Returns `None` when there is nothing to draw.
    pub fn assemble(
        label: impl Into<String>,
        name: impl Into<String>,
        n_cells: u64,
        color: impl Into<String>,
        candidates: Vec<BareHull>,
    ) -> Option<Self> {
        let boundaries = merge_all(candidates);
        if boundaries.is_empty() {
            return None;
        }
        Some(Self {
            label: label.into(),
            name: name.into(),
            n_cells,
            color: color.into(),
            boundaries,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn n_cells(&self) -> u64 {
        self.n_cells
    }
    pub fn color(&self) -> &str {
        &self.color
    }
    pub fn boundaries(&self) -> &[BareHull] {
        &self.boundaries
    }
    /// Total enclosed area of all boundaries.
    pub fn area(&self) -> f64 {
        self.boundaries.iter().map(BareHull::area).sum()
    }
}

/// A taxon at one level, as supplied by the taxonomy collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaxonRecord {
    pub label: String,
    pub name: String,
    pub n_cells: u64,
    pub color: String,
    /// Leaf taxa under this one (itself, at the leaf level).
    pub leaves: Vec<String>,
}

/// Roll leaf boundaries up into one compound hull per taxon.
///
/// Taxa whose leaves contribute no boundary are skipped. Output order follows
/// `taxa`.
pub fn roll_up_level(
    taxa: &[TaxonRecord],
    leaf_hulls: &BTreeMap<String, Vec<BareHull>>,
) -> Vec<CompoundHull> {
    let mut out = Vec::with_capacity(taxa.len());
    for taxon in taxa {
        let candidates: Vec<BareHull> = taxon
            .leaves
            .iter()
            .filter_map(|leaf| leaf_hulls.get(leaf))
            .flat_map(|hs| hs.iter().cloned())
            .collect();
        let n_candidates = candidates.len();
        match CompoundHull::assemble(
            taxon.label.clone(),
            taxon.name.clone(),
            taxon.n_cells,
            taxon.color.clone(),
            candidates,
        ) {
            Some(c) => {
                debug!(
                    label = %taxon.label,
                    n_candidates,
                    n_boundaries = c.boundaries().len(),
                    "rolled up compound hull"
                );
                out.push(c);
            }
            None => debug!(label = %taxon.label, "no leaf boundaries; skipping taxon"),
        }
    }
    out
}
