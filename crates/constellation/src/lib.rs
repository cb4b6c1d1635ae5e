//! Geometry engine for cell-type constellation plots.
//!
//! A constellation plot draws each taxon as a node sized by its cell count,
//! neighbor similarity between taxa as ribbons, and the region a taxon
//! occupies in the embedding as a smoothed boundary ("hull"). This crate owns
//! the geometry: building boundaries from point clouds, merging them as taxa
//! roll up a hierarchy, laying everything out in pixel space, and emitting
//! path data for a vector-graphics sink.
//!
//! Layout (leaf-first)
//! - `geom`: primitives, point classification, convex hulls, `BareHull`.
//! - `merge`: polygon union, `merge_all`, quality-gated leaf assembly.
//! - `layout`: world→pixel transform, node radii, ribbons, corner smoothing.
//! - `render`: path commands and the SVG sink.
//! - `store`: the persisted per-level tables.
//! - `color`, `synth`: continuous color ramps and synthetic data.
//!
//! Everything here is single-threaded and purely functional over its inputs;
//! callers may fan out across taxa or levels without locking.

pub mod color;
pub mod geom;
pub mod layout;
pub mod merge;
pub mod render;
pub mod store;
pub mod synth;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use geom::{BareHull, HullError, Pt2};
pub use merge::{merge, merge_all, CompoundHull, MergeError};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::color::{ColorRamp, Rgb};
    pub use crate::geom::{classify, is_inside, BareHull, HullError, Pt2, Segment};
    pub use crate::layout::{
        Canvas, Centroid, ConnectionSpec, LayoutError, LevelLayout, PixelHull, PixelTransform,
        Ribbon, Stat, WorldBounds, WorldCentroid,
    };
    pub use crate::merge::{
        assemble_leaf_hulls, merge, merge_all, roll_up_level, CompoundHull, GateCfg, MergeError,
        SubdivideCfg, TaxonRecord, TestPoints,
    };
    pub use crate::render::{Element, PathCommand};
    pub use crate::store::{LayoutCache, LevelTables};
    pub use nalgebra::Vector2;
}
