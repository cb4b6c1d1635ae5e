//! Node radii and connection ribbons.
//!
//! A ribbon leaves each centroid through a wedge of half-angle θ around the
//! direction to the other centroid. θ scales with the neighbor fraction
//! relative to the largest fraction in the render, so the widest ribbon spans
//! a full half-circle. Thin ribbons are widened to a minimum visible chord.

use std::f64::consts::FRAC_PI_2;

use crate::geom::{rot, Pt2};

use super::types::{Canvas, Centroid, ConnectionSpec, LayoutError, Ribbon};

/// Narrowest chord (pixels) a ribbon may have where it meets a centroid.
pub const MIN_RIBBON_WIDTH: f64 = 0.25;

/// Bow of a ribbon's long sides, as a fraction of the side length.
const RIBBON_BOW: f64 = 0.1;

/// `max(min_radius, max_radius * log2(1 + n_cells / max_n_cells))`.
///
/// `max_n_cells` is the largest count among the centroids drawn together; a
/// zero maximum yields `min_radius`.
pub fn node_radius(n_cells: u64, max_n_cells: u64, canvas: &Canvas) -> f64 {
    if max_n_cells == 0 {
        return canvas.min_radius;
    }
    let r = canvas.max_radius * (1.0 + n_cells as f64 / max_n_cells as f64).log2();
    r.max(canvas.min_radius)
}

/// Neighbor fraction `neighbors / n_cells`, zero for an empty taxon.
#[inline]
pub fn neighbor_fraction(neighbors: u64, n_cells: u64) -> f64 {
    if n_cells == 0 {
        0.0
    } else {
        neighbors as f64 / n_cells as f64
    }
}

/// Largest neighbor fraction over both ends of every drawable connection.
///
/// Connections whose labels are missing from `lookup`, or that `ribbon` would
/// reject, are ignored.
pub fn max_connection_ratio<'a, F>(specs: &[ConnectionSpec], lookup: F) -> f64
where
    F: Fn(&str) -> Option<&'a Centroid>,
{
    let mut best = 0.0_f64;
    for spec in specs {
        let (Some(src), Some(dst)) = (lookup(&spec.src_label), lookup(&spec.dst_label)) else {
            continue;
        };
        if check_connection(spec, src, dst).is_err() {
            continue;
        }
        let r0 = neighbor_fraction(spec.src_neighbors, src.n_cells);
        let r1 = neighbor_fraction(spec.dst_neighbors, dst.n_cells);
        best = best.max(r0.max(r1));
    }
    best
}

/// Wedge half-angle at one end of a ribbon.
///
/// `(π/2) * fraction / max_ratio`, widened to `asin(MIN_RIBBON_WIDTH / 2r)`
/// when the chord `2r sin θ` would be narrower than the minimum. A node too
/// small to carry the minimum chord opens fully (θ = π/2).
pub fn wedge_half_angle(fraction: f64, max_ratio: f64, radius: f64) -> f64 {
    let mut theta = if max_ratio > 0.0 {
        (FRAC_PI_2 * fraction / max_ratio).clamp(0.0, FRAC_PI_2)
    } else {
        0.0
    };
    if 2.0 * radius <= MIN_RIBBON_WIDTH {
        return FRAC_PI_2;
    }
    if 2.0 * radius * theta.sin() < MIN_RIBBON_WIDTH {
        theta = (0.5 * MIN_RIBBON_WIDTH / radius).asin();
    }
    theta
}

fn check_bound(label: &str, neighbors: u64, k_nn: u32, n_cells: u64) -> Result<(), LayoutError> {
    let bound = u64::from(k_nn).saturating_mul(n_cells);
    if neighbors > bound {
        return Err(LayoutError::NeighborCountOutOfRange {
            label: label.to_owned(),
            neighbors,
            bound,
        });
    }
    Ok(())
}

/// Neighbor counts within `k_nn * n_cells` at both ends, and distinct
/// endpoints.
fn check_connection(
    spec: &ConnectionSpec,
    src: &Centroid,
    dst: &Centroid,
) -> Result<(), LayoutError> {
    check_bound(&src.label, spec.src_neighbors, spec.k_nn, src.n_cells)?;
    check_bound(&dst.label, spec.dst_neighbors, spec.k_nn, dst.n_cells)?;
    let norm = (dst.pixel - src.pixel).norm();
    if !(norm > 0.0 && norm.is_finite()) {
        return Err(LayoutError::CoincidentCentroids {
            src: src.label.clone(),
            dst: dst.label.clone(),
        });
    }
    Ok(())
}

/// Corner points and control points for one connection.
pub fn ribbon(
    spec: &ConnectionSpec,
    src: &Centroid,
    dst: &Centroid,
    max_ratio: f64,
) -> Result<Ribbon, LayoutError> {
    check_connection(spec, src, dst)?;

    let axis = dst.pixel - src.pixel;
    let u = axis / axis.norm();

    let theta_src = wedge_half_angle(
        neighbor_fraction(spec.src_neighbors, src.n_cells),
        max_ratio,
        src.pixel_r,
    );
    let theta_dst = wedge_half_angle(
        neighbor_fraction(spec.dst_neighbors, dst.n_cells),
        max_ratio,
        dst.pixel_r,
    );

    let src_mid = u * src.pixel_r;
    let dst_mid = -u * dst.pixel_r;
    let corners = [
        src.pixel + rot(src_mid, theta_src),
        dst.pixel + rot(dst_mid, -theta_dst),
        dst.pixel + rot(dst_mid, theta_dst),
        src.pixel + rot(src_mid, -theta_src),
    ];
    let ctrl = [
        side_control(corners[1], corners[0]),
        side_control(corners[2], corners[3]),
    ];
    Ok(Ribbon {
        spec: spec.clone(),
        corners,
        ctrl,
    })
}

/// Midpoint of `a`–`b`, pushed along the perpendicular of `a - b`.
fn side_control(a: Pt2, b: Pt2) -> Pt2 {
    0.5 * (a + b) + RIBBON_BOW * rot(a - b, FRAC_PI_2)
}
