//! Lay out one taxonomy level: centroids, ribbons and hulls in pixel space.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::geom::Pt2;
use crate::merge::CompoundHull;

use super::ribbon::{max_connection_ratio, node_radius, ribbon};
use super::smooth::smooth_boundary;
use super::transform::{PixelTransform, WorldBounds};
use super::types::{
    Canvas, Centroid, ConnectionSpec, LayoutError, PixelHull, Ribbon, WorldCentroid,
};

/// Everything drawn for one taxonomy level.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LevelLayout {
    pub level: String,
    pub centroids: Vec<Centroid>,
    pub ribbons: Vec<Ribbon>,
    pub hulls: Vec<PixelHull>,
}

impl LevelLayout {
    pub fn centroid(&self, label: &str) -> Option<&Centroid> {
        self.centroids.iter().find(|c| c.label == label)
    }

    pub fn hull(&self, label: &str) -> Option<&PixelHull> {
        self.hulls.iter().find(|h| h.label == label)
    }
}

/// Transform fitted to every finite point given.
pub fn fit_transform<I>(points: I, canvas: &Canvas) -> Result<PixelTransform, LayoutError>
where
    I: IntoIterator<Item = Pt2>,
{
    let bounds = WorldBounds::from_points(points).ok_or(LayoutError::EmptyScene)?;
    Ok(PixelTransform::fit(bounds, canvas))
}

/// Pixel position and radius for each centroid; radii scale against the
/// largest count in `world`.
///
/// Centroids with a non-finite world coordinate are dropped with a warning.
pub fn place_centroids(
    world: &[WorldCentroid],
    transform: &PixelTransform,
    canvas: &Canvas,
) -> Vec<Centroid> {
    let placeable: Vec<&WorldCentroid> = world
        .iter()
        .filter(|c| {
            let ok = c.x.is_finite() && c.y.is_finite();
            if !ok {
                warn!(
                    label = %c.label,
                    x = c.x,
                    y = c.y,
                    "skipping centroid without finite position"
                );
            }
            ok
        })
        .collect();
    let max_n_cells = placeable.iter().map(|c| c.n_cells).max().unwrap_or(0);
    placeable
        .into_iter()
        .map(|c| Centroid {
            label: c.label.clone(),
            name: c.name.clone(),
            level: c.level.clone(),
            n_cells: c.n_cells,
            color: c.color.clone(),
            pixel: transform.to_pixel(c.world()),
            pixel_r: node_radius(c.n_cells, max_n_cells, canvas),
            stats: c.stats.clone(),
        })
        .collect()
}

/// Ribbons for every connection whose endpoints are laid out.
///
/// Connections that fail (unknown label, coincident centroids, neighbor
/// count out of range) are dropped with a warning; siblings are unaffected.
pub fn lay_out_ribbons(specs: &[ConnectionSpec], centroids: &[Centroid]) -> Vec<Ribbon> {
    let by_label: BTreeMap<&str, &Centroid> =
        centroids.iter().map(|c| (c.label.as_str(), c)).collect();
    let lookup = |label: &str| by_label.get(label).copied();
    let max_ratio = max_connection_ratio(specs, lookup);

    let mut out = Vec::with_capacity(specs.len());
    for spec in specs {
        let laid = match (lookup(&spec.src_label), lookup(&spec.dst_label)) {
            (Some(src), Some(dst)) => ribbon(spec, src, dst, max_ratio),
            (None, _) => Err(LayoutError::UnknownCentroid {
                label: spec.src_label.clone(),
            }),
            (_, None) => Err(LayoutError::UnknownCentroid {
                label: spec.dst_label.clone(),
            }),
        };
        match laid {
            Ok(r) => out.push(r),
            Err(err) => warn!(
                src = %spec.src_label,
                dst = %spec.dst_label,
                error = %err,
                "skipping connection"
            ),
        }
    }
    out
}

/// Project a compound hull and precompute its smoothed paths.
pub fn project_hull(hull: &CompoundHull, transform: &PixelTransform) -> PixelHull {
    let boundaries = hull
        .boundaries()
        .iter()
        .map(|b| {
            let pixels: Vec<Pt2> = b.points().iter().map(|p| transform.to_pixel(*p)).collect();
            smooth_boundary(&pixels)
        })
        .collect();
    PixelHull {
        label: hull.label().to_owned(),
        name: hull.name().to_owned(),
        n_cells: hull.n_cells(),
        color: hull.color().to_owned(),
        boundaries,
    }
}

/// Lay out one level against a shared transform.
pub fn lay_out_level(
    level: &str,
    world: &[WorldCentroid],
    specs: &[ConnectionSpec],
    hulls: &[CompoundHull],
    transform: &PixelTransform,
    canvas: &Canvas,
) -> LevelLayout {
    let centroids = place_centroids(world, transform, canvas);
    let ribbons = lay_out_ribbons(specs, &centroids);
    let hulls: Vec<PixelHull> = hulls.iter().map(|h| project_hull(h, transform)).collect();
    debug!(
        level,
        centroids = centroids.len(),
        ribbons = ribbons.len(),
        hulls = hulls.len(),
        "laid out level"
    );
    LevelLayout {
        level: level.to_owned(),
        centroids,
        ribbons,
        hulls,
    }
}
