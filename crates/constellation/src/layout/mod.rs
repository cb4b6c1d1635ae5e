//! Pixel-space layout.
//!
//! Purpose
//! - Map world coordinates onto the canvas with one transform per render.
//! - Size nodes logarithmically by cell count.
//! - Build connection ribbons whose end widths encode neighbor fractions.
//! - Precompute smoothed boundary paths for compound hulls.
//!
//! Why
//! - Laid-out records are persisted and replayed without touching world
//!   geometry again, so everything a renderer needs is computed here.

mod ribbon;
mod scene;
mod smooth;
mod transform;
mod types;

pub use ribbon::{
    max_connection_ratio, neighbor_fraction, node_radius, ribbon, wedge_half_angle,
    MIN_RIBBON_WIDTH,
};
pub use scene::{
    fit_transform, lay_out_level, lay_out_ribbons, place_centroids, project_hull, LevelLayout,
};
pub use smooth::{
    corner_control_point, from_path_points, smooth_boundary, to_path_points, PathSegment,
    SMOOTHING_FACTOR,
};
pub use transform::{PixelTransform, WorldBounds};
pub use types::{
    Canvas, Centroid, ConnectionSpec, LayoutError, PixelHull, Ribbon, Stat, WorldCentroid,
};

#[cfg(test)]
mod tests;
