//! Persisted layout tables.
//!
//! One JSON document per render configuration:
//! `{ fov: {width, height}, levels: { <level>: { centroids, connections, hulls } } }`.
//! Centroid and connection tables are column-oriented (parallel arrays);
//! ribbon corners and control points are flattened with per-row counts.
//! Hulls are keyed by label and store each boundary's pixel points together
//! with its `(start, ctrl, end, ctrl)` path quadruples, so a stored layout
//! renders without re-running any geometry.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::geom::Pt2;
use crate::layout::{
    from_path_points, to_path_points, Canvas, Centroid, ConnectionSpec, LevelLayout, PixelHull,
    Ribbon, Stat,
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{table}.{column} has {found} rows, expected {expected}")]
    ShapeMismatch {
        table: &'static str,
        column: String,
        expected: usize,
        found: usize,
    },
    #[error("hull {label:?} boundary {index}: path points are not quadruples")]
    BadPathPoints { label: String, index: usize },
    #[error("connection refers to unknown centroid {0:?}")]
    UnknownCentroid(String),
    #[error("no level {0:?} in layout cache")]
    UnknownLevel(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

type Xy = [f64; 2];

#[inline]
fn xy(p: Pt2) -> Xy {
    [p.x, p.y]
}

#[inline]
fn pt(a: Xy) -> Pt2 {
    Pt2::new(a[0], a[1])
}

fn check_len(table: &'static str, column: &str, expected: usize, found: usize) -> Result<(), StoreError> {
    if expected != found {
        return Err(StoreError::ShapeMismatch {
            table,
            column: column.to_owned(),
            expected,
            found,
        });
    }
    Ok(())
}

/// Canvas size the layout was computed for.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fov {
    pub width: f64,
    pub height: f64,
}

/// Per-centroid mean and variance of one statistic; `None` where a centroid
/// lacks it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatColumns {
    pub mean: Vec<Option<f64>>,
    pub variance: Vec<Option<f64>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CentroidTable {
    pub pixel_r: Vec<f64>,
    pub pixel_x: Vec<f64>,
    pub pixel_y: Vec<f64>,
    pub label: Vec<String>,
    pub name: Vec<String>,
    pub n_cells: Vec<u64>,
    pub color: Vec<String>,
    #[serde(default)]
    pub stats: BTreeMap<String, StatColumns>,
}

impl CentroidTable {
    pub fn from_centroids(centroids: &[Centroid]) -> Self {
        let mut t = Self::default();
        let stat_names: std::collections::BTreeSet<&String> =
            centroids.iter().flat_map(|c| c.stats.keys()).collect();
        for name in stat_names {
            let cols = StatColumns {
                mean: centroids
                    .iter()
                    .map(|c| c.stats.get(name).map(|s| s.mean))
                    .collect(),
                variance: centroids
                    .iter()
                    .map(|c| c.stats.get(name).map(|s| s.variance))
                    .collect(),
            };
            t.stats.insert(name.clone(), cols);
        }
        for c in centroids {
            t.pixel_r.push(c.pixel_r);
            t.pixel_x.push(c.pixel.x);
            t.pixel_y.push(c.pixel.y);
            t.label.push(c.label.clone());
            t.name.push(c.name.clone());
            t.n_cells.push(c.n_cells);
            t.color.push(c.color.clone());
        }
        t
    }

    pub fn len(&self) -> usize {
        self.label.len()
    }

    pub fn is_empty(&self) -> bool {
        self.label.is_empty()
    }

    fn validate(&self) -> Result<(), StoreError> {
        let n = self.len();
        for (column, found) in [
            ("pixel_r", self.pixel_r.len()),
            ("pixel_x", self.pixel_x.len()),
            ("pixel_y", self.pixel_y.len()),
            ("name", self.name.len()),
            ("n_cells", self.n_cells.len()),
            ("color", self.color.len()),
        ] {
            check_len("centroids", column, n, found)?;
        }
        for (stat, cols) in &self.stats {
            check_len("centroids", &format!("stats/{stat}/mean"), n, cols.mean.len())?;
            check_len("centroids", &format!("stats/{stat}/variance"), n, cols.variance.len())?;
        }
        Ok(())
    }

    pub fn to_centroids(&self, level: &str) -> Result<Vec<Centroid>, StoreError> {
        self.validate()?;
        Ok((0..self.len())
            .map(|i| {
                let stats = self
                    .stats
                    .iter()
                    .filter_map(|(name, cols)| match (cols.mean[i], cols.variance[i]) {
                        (Some(mean), Some(variance)) => {
                            Some((name.clone(), Stat { mean, variance }))
                        }
                        _ => None,
                    })
                    .collect();
                Centroid {
                    label: self.label[i].clone(),
                    name: self.name[i].clone(),
                    level: level.to_owned(),
                    n_cells: self.n_cells[i],
                    color: self.color[i].clone(),
                    pixel: Pt2::new(self.pixel_x[i], self.pixel_y[i]),
                    pixel_r: self.pixel_r[i],
                    stats,
                }
            })
            .collect())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionTable {
    pub src_label: Vec<String>,
    pub dst_label: Vec<String>,
    pub k_nn: Vec<u32>,
    pub src_neighbors: Vec<u64>,
    pub dst_neighbors: Vec<u64>,
    pub n_rendering_corners: Vec<usize>,
    pub n_bezier_points: Vec<usize>,
    pub rendering_corners: Vec<Xy>,
    pub bezier_control_points: Vec<Xy>,
}

impl ConnectionTable {
    pub fn from_ribbons(ribbons: &[Ribbon]) -> Self {
        let mut t = Self::default();
        for r in ribbons {
            t.src_label.push(r.spec.src_label.clone());
            t.dst_label.push(r.spec.dst_label.clone());
            t.k_nn.push(r.spec.k_nn);
            t.src_neighbors.push(r.spec.src_neighbors);
            t.dst_neighbors.push(r.spec.dst_neighbors);
            t.n_rendering_corners.push(r.corners.len());
            t.n_bezier_points.push(r.ctrl.len());
            t.rendering_corners.extend(r.corners.iter().map(|p| xy(*p)));
            t.bezier_control_points.extend(r.ctrl.iter().map(|p| xy(*p)));
        }
        t
    }

    pub fn len(&self) -> usize {
        self.src_label.len()
    }

    pub fn is_empty(&self) -> bool {
        self.src_label.is_empty()
    }

    pub fn to_ribbons(&self) -> Result<Vec<Ribbon>, StoreError> {
        let n = self.len();
        for (column, found) in [
            ("dst_label", self.dst_label.len()),
            ("k_nn", self.k_nn.len()),
            ("src_neighbors", self.src_neighbors.len()),
            ("dst_neighbors", self.dst_neighbors.len()),
            ("n_rendering_corners", self.n_rendering_corners.len()),
            ("n_bezier_points", self.n_bezier_points.len()),
        ] {
            check_len("connections", column, n, found)?;
        }
        let corners_total: usize = self.n_rendering_corners.iter().sum();
        let ctrl_total: usize = self.n_bezier_points.iter().sum();
        check_len("connections", "rendering_corners", corners_total, self.rendering_corners.len())?;
        check_len(
            "connections",
            "bezier_control_points",
            ctrl_total,
            self.bezier_control_points.len(),
        )?;

        let mut out = Vec::with_capacity(n);
        let (mut c0, mut b0) = (0usize, 0usize);
        for i in 0..n {
            let nc = self.n_rendering_corners[i];
            let nb = self.n_bezier_points[i];
            check_len("connections", "n_rendering_corners", 4, nc)?;
            check_len("connections", "n_bezier_points", 2, nb)?;
            let c = &self.rendering_corners[c0..c0 + nc];
            let b = &self.bezier_control_points[b0..b0 + nb];
            c0 += nc;
            b0 += nb;
            out.push(Ribbon {
                spec: ConnectionSpec {
                    src_label: self.src_label[i].clone(),
                    dst_label: self.dst_label[i].clone(),
                    k_nn: self.k_nn[i],
                    src_neighbors: self.src_neighbors[i],
                    dst_neighbors: self.dst_neighbors[i],
                },
                corners: [pt(c[0]), pt(c[1]), pt(c[2]), pt(c[3])],
                ctrl: [pt(b[0]), pt(b[1])],
            });
        }
        Ok(out)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundaryRecord {
    pub points: Vec<Xy>,
    pub path_points: Vec<Xy>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HullRecord {
    pub name: String,
    pub n_cells: u64,
    pub color: String,
    pub boundaries: Vec<BoundaryRecord>,
}

impl HullRecord {
    pub fn from_pixel_hull(h: &PixelHull) -> Self {
        Self {
            name: h.name.clone(),
            n_cells: h.n_cells,
            color: h.color.clone(),
            boundaries: h
                .boundaries
                .iter()
                .map(|b| BoundaryRecord {
                    points: b.iter().map(|s| xy(s.start)).collect(),
                    path_points: to_path_points(b).into_iter().map(xy).collect(),
                })
                .collect(),
        }
    }

    pub fn to_pixel_hull(&self, label: &str) -> Result<PixelHull, StoreError> {
        let boundaries = self
            .boundaries
            .iter()
            .enumerate()
            .map(|(index, b)| {
                let pts: Vec<Pt2> = b.path_points.iter().map(|a| pt(*a)).collect();
                from_path_points(&pts).ok_or_else(|| StoreError::BadPathPoints {
                    label: label.to_owned(),
                    index,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PixelHull {
            label: label.to_owned(),
            name: self.name.clone(),
            n_cells: self.n_cells,
            color: self.color.clone(),
            boundaries,
        })
    }
}

/// Tables for one taxonomy level.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelTables {
    pub centroids: CentroidTable,
    pub connections: ConnectionTable,
    pub hulls: BTreeMap<String, HullRecord>,
}

impl LevelTables {
    pub fn from_layout(layout: &LevelLayout) -> Self {
        Self {
            centroids: CentroidTable::from_centroids(&layout.centroids),
            connections: ConnectionTable::from_ribbons(&layout.ribbons),
            hulls: layout
                .hulls
                .iter()
                .map(|h| (h.label.clone(), HullRecord::from_pixel_hull(h)))
                .collect(),
        }
    }

    /// Rebuild laid-out records. Hulls come back ordered by label.
    pub fn to_layout(&self, level: &str) -> Result<LevelLayout, StoreError> {
        let centroids = self.centroids.to_centroids(level)?;
        let ribbons = self.connections.to_ribbons()?;
        for r in &ribbons {
            for label in [&r.spec.src_label, &r.spec.dst_label] {
                if !centroids.iter().any(|c| &c.label == label) {
                    return Err(StoreError::UnknownCentroid(label.clone()));
                }
            }
        }
        let hulls = self
            .hulls
            .iter()
            .map(|(label, h)| h.to_pixel_hull(label))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(LevelLayout {
            level: level.to_owned(),
            centroids,
            ribbons,
            hulls,
        })
    }
}

/// The whole persisted document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutCache {
    pub fov: Fov,
    pub levels: BTreeMap<String, LevelTables>,
}

impl LayoutCache {
    pub fn new(canvas: &Canvas) -> Self {
        Self {
            fov: Fov {
                width: canvas.width,
                height: canvas.height,
            },
            levels: BTreeMap::new(),
        }
    }

    /// Store a level, replacing any previous tables under the same name.
    pub fn insert_level(&mut self, layout: &LevelLayout) {
        self.levels
            .insert(layout.level.clone(), LevelTables::from_layout(layout));
    }

    pub fn level(&self, level: &str) -> Result<LevelLayout, StoreError> {
        self.levels
            .get(level)
            .ok_or_else(|| StoreError::UnknownLevel(level.to_owned()))?
            .to_layout(level)
    }

    pub fn write_json<W: Write>(&self, writer: W) -> Result<(), StoreError> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn read_json<R: Read>(reader: R) -> Result<Self, StoreError> {
        Ok(serde_json::from_reader(reader)?)
    }
}
