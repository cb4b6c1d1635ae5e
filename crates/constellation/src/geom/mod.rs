//! 2D geometry for taxon boundaries.
//!
//! Purpose
//! - Pure functions over `Vector2<f64>`: rotation, cross products, segment
//!   crossings, signed area.
//! - Strict point-in-convex-polygon classification.
//! - `BareHull`: a simple, counter-clockwise, closed boundary, plus convex-hull
//!   construction from raw point clouds.
//!
//! Conventions
//! - Polygons are stored as open vertex lists; the closing edge
//!   `last → first` is implicit.
//! - World and pixel coordinates share the `Pt2` type but never share a
//!   structure: `BareHull` is world space, pixel boundaries live in `layout`.

mod cfg;
mod classify;
mod hull;
mod prim;

pub use classify::{classify, is_inside};
pub use hull::{convex_hull, convex_hull_indices, BareHull, HullError};
pub use prim::{
    cross, orient, rot, segment_intersection, signed_area, vertex_mean, Segment, SegmentHit,
};

pub(crate) use cfg::{DEDUP_EPS, DENOM_EPS};

/// A point or vector in the plane.
pub type Pt2 = nalgebra::Vector2<f64>;

#[cfg(test)]
mod tests;
