//! Path commands for a vector-graphics sink.
//!
//! Pure formatting of laid-out records: no geometry is computed here beyond
//! reading back what `layout` stored. Element order is hulls, then ribbons,
//! then centroids, so nodes draw on top.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::geom::Pt2;
use crate::layout::{neighbor_fraction, Centroid, PathSegment, PixelHull, Ribbon, Stat};

mod svg;

pub use svg::{render_svg, Colorbar, SvgOptions};

/// One drawing command in pixel space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    MoveTo(Pt2),
    LineTo(Pt2),
    CubicTo { c0: Pt2, c1: Pt2, to: Pt2 },
    QuadTo { ctrl: Pt2, to: Pt2 },
    Close,
}

impl PathCommand {
    fn write_svg(&self, out: &mut String) {
        // Writing to a String cannot fail.
        let _ = match self {
            PathCommand::MoveTo(p) => write!(out, "M {} {}", p.x, p.y),
            PathCommand::LineTo(p) => write!(out, "L {} {}", p.x, p.y),
            PathCommand::CubicTo { c0, c1, to } => write!(
                out,
                "C {} {} {} {} {} {}",
                c0.x, c0.y, c1.x, c1.y, to.x, to.y
            ),
            PathCommand::QuadTo { ctrl, to } => {
                write!(out, "Q {} {} {} {}", ctrl.x, ctrl.y, to.x, to.y)
            }
            PathCommand::Close => write!(out, "Z"),
        };
    }
}

/// SVG `d` attribute for a command list.
pub fn path_data(commands: &[PathCommand]) -> String {
    let mut out = String::new();
    for (i, c) in commands.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        c.write_svg(&mut out);
    }
    out
}

/// Closed path for one smoothed boundary: curves where control points exist,
/// lines elsewhere.
pub fn boundary_commands(path: &[PathSegment]) -> Vec<PathCommand> {
    let Some(first) = path.first() else {
        return Vec::new();
    };
    let mut out = Vec::with_capacity(path.len() + 2);
    out.push(PathCommand::MoveTo(first.start));
    for seg in path {
        out.push(match seg.ctrl {
            Some((c0, c1)) => PathCommand::CubicTo {
                c0,
                c1,
                to: seg.end,
            },
            None => PathCommand::LineTo(seg.end),
        });
    }
    out.push(PathCommand::Close);
    out
}

/// Four-corner ribbon: two curved long sides joined by straight ends.
pub fn ribbon_commands(r: &Ribbon) -> Vec<PathCommand> {
    let [c0, c1, c2, c3] = r.corners;
    vec![
        PathCommand::MoveTo(c0),
        PathCommand::QuadTo {
            ctrl: r.ctrl[0],
            to: c1,
        },
        PathCommand::LineTo(c2),
        PathCommand::QuadTo {
            ctrl: r.ctrl[1],
            to: c3,
        },
        PathCommand::LineTo(c0),
        PathCommand::Close,
    ]
}

/// A drawable item with the metadata a sink needs for hover text and links.
#[derive(Clone, Debug, PartialEq)]
pub enum Element {
    /// All boundaries of one compound hull.
    Hull {
        label: String,
        name: String,
        n_cells: u64,
        color: String,
        paths: Vec<Vec<PathCommand>>,
    },
    Ribbon {
        src_name: String,
        dst_name: String,
        src_fraction: f64,
        dst_fraction: f64,
        commands: Vec<PathCommand>,
    },
    Circle {
        label: String,
        name: String,
        n_cells: u64,
        color: String,
        center: Pt2,
        radius: f64,
        /// Statistic the fill color encodes, if any.
        stat: Option<(String, Stat)>,
    },
}

/// Elements for one rendered view.
///
/// Ribbons whose endpoints are not among `centroids` are left out.
/// `color_by` names the statistic shown in centroid hover text.
pub fn render_scene(
    centroids: &[Centroid],
    ribbons: &[Ribbon],
    hulls: &[PixelHull],
    color_by: Option<&str>,
) -> Vec<Element> {
    let by_label: BTreeMap<&str, &Centroid> =
        centroids.iter().map(|c| (c.label.as_str(), c)).collect();
    let mut out = Vec::with_capacity(hulls.len() + ribbons.len() + centroids.len());

    for h in hulls {
        out.push(Element::Hull {
            label: h.label.clone(),
            name: h.name.clone(),
            n_cells: h.n_cells,
            color: h.color.clone(),
            paths: h.boundaries.iter().map(|b| boundary_commands(b)).collect(),
        });
    }

    for r in ribbons {
        let (Some(src), Some(dst)) = (
            by_label.get(r.spec.src_label.as_str()),
            by_label.get(r.spec.dst_label.as_str()),
        ) else {
            continue;
        };
        out.push(Element::Ribbon {
            src_name: src.name.clone(),
            dst_name: dst.name.clone(),
            src_fraction: neighbor_fraction(r.spec.src_neighbors, src.n_cells)
                / f64::from(r.spec.k_nn.max(1)),
            dst_fraction: neighbor_fraction(r.spec.dst_neighbors, dst.n_cells)
                / f64::from(r.spec.k_nn.max(1)),
            commands: ribbon_commands(r),
        });
    }

    for c in centroids {
        let stat = color_by.and_then(|s| c.stats.get(s).map(|st| (s.to_owned(), *st)));
        out.push(Element::Circle {
            label: c.label.clone(),
            name: c.name.clone(),
            n_cells: c.n_cells,
            color: c.color.clone(),
            center: c.pixel,
            radius: c.pixel_r,
            stat,
        });
    }
    out
}
