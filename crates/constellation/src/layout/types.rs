//! Layout records: world-space inputs and their laid-out counterparts.
//!
//! Centroids are two distinct immutable types joined by a pure transform:
//! collaborators produce `WorldCentroid`, layout produces `Centroid`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geom::Pt2;
use super::smooth::PathSegment;

/// Output canvas and node size limits (pixels).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    pub max_radius: f64,
    pub min_radius: f64,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 1080.0,
            max_radius: 20.0,
            min_radius: 2.0,
        }
    }
}

/// Summary of a continuous per-cell statistic over one taxon.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stat {
    pub mean: f64,
    pub variance: f64,
}

/// Taxon node as supplied by collaborators (world space).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldCentroid {
    pub label: String,
    pub name: String,
    pub level: String,
    pub n_cells: u64,
    pub color: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub stats: BTreeMap<String, Stat>,
}

impl WorldCentroid {
    #[inline]
    pub fn world(&self) -> Pt2 {
        Pt2::new(self.x, self.y)
    }
}

/// Laid-out taxon node (pixel space).
#[derive(Clone, Debug, PartialEq)]
pub struct Centroid {
    pub label: String,
    pub name: String,
    pub level: String,
    pub n_cells: u64,
    pub color: String,
    pub pixel: Pt2,
    pub pixel_r: f64,
    pub stats: BTreeMap<String, Stat>,
}

impl Centroid {
    /// A copy with a different fill color.
    pub fn with_color(&self, color: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            ..self.clone()
        }
    }
}

/// Neighbor counts between two taxa at one level.
///
/// `src_neighbors` counts, over the k nearest neighbors of every source cell,
/// those belonging to the destination taxon (and symmetrically), so
/// `src_neighbors <= k_nn * src.n_cells`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSpec {
    pub src_label: String,
    pub dst_label: String,
    pub k_nn: u32,
    pub src_neighbors: u64,
    pub dst_neighbors: u64,
}

/// Laid-out connection: four ribbon corners and two bezier control points.
///
/// Corners run `src0 → dst0 → dst1 → src1`; `ctrl[0]` bends the
/// `src0 → dst0` side and `ctrl[1]` the `dst1 → src1` side.
#[derive(Clone, Debug, PartialEq)]
pub struct Ribbon {
    pub spec: ConnectionSpec,
    pub corners: [Pt2; 4],
    pub ctrl: [Pt2; 2],
}

/// A compound hull projected to pixel space with its smoothing precomputed.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelHull {
    pub label: String,
    pub name: String,
    pub n_cells: u64,
    pub color: String,
    /// One closed path per disjoint boundary.
    pub boundaries: Vec<Vec<PathSegment>>,
}

/// Layout failures; all are local to one element.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum LayoutError {
    /// Nothing to derive a world bounding box from.
    #[error("no finite world coordinates to lay out")]
    EmptyScene,
    /// A connection names a taxon that has no centroid.
    #[error("no centroid with label {label:?}")]
    UnknownCentroid { label: String },
    /// Both ends of a connection sit on the same pixel.
    #[error("centroids {src:?} and {dst:?} coincide; ribbon direction undefined")]
    CoincidentCentroids { src: String, dst: String },
    /// Neighbor count exceeds `k_nn * n_cells`.
    #[error("{label:?} has {neighbors} neighbors, above the bound {bound}")]
    NeighborCountOutOfRange {
        label: String,
        neighbors: u64,
        bound: u64,
    },
}
