//! World → pixel transform.

use crate::geom::Pt2;

use super::types::Canvas;

/// Axis-aligned world bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldBounds {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl WorldBounds {
    /// Bounds of all finite points; `None` if there are none.
    pub fn from_points<I: IntoIterator<Item = Pt2>>(points: I) -> Option<Self> {
        let mut bounds: Option<Self> = None;
        for p in points {
            if !(p.x.is_finite() && p.y.is_finite()) {
                continue;
            }
            bounds = Some(match bounds {
                None => Self {
                    xmin: p.x,
                    xmax: p.x,
                    ymin: p.y,
                    ymax: p.y,
                },
                Some(b) => Self {
                    xmin: b.xmin.min(p.x),
                    xmax: b.xmax.max(p.x),
                    ymin: b.ymin.min(p.y),
                    ymax: b.ymax.max(p.y),
                },
            });
        }
        bounds
    }
}

/// Linear map from world bounds onto the canvas inset by `max_radius`.
///
/// x maps onto `[margin, width - margin]`; y is flipped so world-up is
/// pixel-up, onto `[margin, height - margin]`. Fixed once per render.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelTransform {
    world_origin: Pt2,
    world_extent: Pt2,
    pixel_origin: Pt2,
    pixel_extent: Pt2,
}

impl PixelTransform {
    pub fn fit(bounds: WorldBounds, canvas: &Canvas) -> Self {
        let margin = canvas.max_radius;
        Self {
            world_origin: Pt2::new(bounds.xmin, bounds.ymin),
            world_extent: Pt2::new(bounds.xmax - bounds.xmin, bounds.ymax - bounds.ymin),
            pixel_origin: Pt2::new(margin, margin),
            pixel_extent: Pt2::new(
                (canvas.width - 2.0 * margin).max(0.0),
                (canvas.height - 2.0 * margin).max(0.0),
            ),
        }
    }

    /// Map a world point to pixels. A zero-extent axis maps to the middle of
    /// its pixel range.
    pub fn to_pixel(&self, p: Pt2) -> Pt2 {
        let fx = if self.world_extent.x > 0.0 {
            (p.x - self.world_origin.x) / self.world_extent.x
        } else {
            0.5
        };
        let fy = if self.world_extent.y > 0.0 {
            (self.world_origin.y + self.world_extent.y - p.y) / self.world_extent.y
        } else {
            0.5
        };
        Pt2::new(
            self.pixel_origin.x + self.pixel_extent.x * fx,
            self.pixel_origin.y + self.pixel_extent.y * fy,
        )
    }
}
