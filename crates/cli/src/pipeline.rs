use crate::cells::CellTable;
use anyhow::{bail, Result};
use constellation::geom::{BareHull, Pt2};
use constellation::layout::{
    fit_transform, lay_out_level, Canvas, ConnectionSpec, Stat, WorldCentroid,
};
use constellation::merge::{
    assemble_leaf_hulls, leaf_hulls, roll_up_level, subdivide, GateCfg, SubdivideCfg, TaxonRecord,
    TestPoints,
};
use constellation::color::{color_by_stat, ColorRamp};
use constellation::render::{render_scene, render_svg, Colorbar, SvgOptions};
use constellation::store::LayoutCache;
use std::collections::{BTreeMap, BTreeSet};

/// Fallback fill for taxa without a color column.
const DEFAULT_COLOR: &str = "#808080";

/// Knobs for one `build` run.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuildOpts {
    pub canvas: Canvas,
    pub subdivide: SubdivideCfg,
    /// Run the false-positive gate over each leaf's subset hulls.
    pub gate: Option<GateCfg>,
}

/// Per-label aggregate at one level.
#[derive(Clone, Default)]
struct Group {
    rows: Vec<usize>,
    color: Option<String>,
    leaves: BTreeSet<String>,
}

fn group_rows(table: &CellTable, level_idx: usize) -> BTreeMap<String, Group> {
    let (level, labels) = &table.labels[level_idx];
    let leaf_labels = &table.labels[table.labels.len() - 1].1;
    let colors = table.colors.get(level);
    let mut groups: BTreeMap<String, Group> = BTreeMap::new();
    for (row, label) in labels.iter().enumerate() {
        if label.is_empty() || !table.points[row].iter().all(|v| v.is_finite()) {
            continue;
        }
        let g = groups.entry(label.clone()).or_default();
        g.rows.push(row);
        if g.color.is_none() {
            g.color = colors
                .and_then(|c| c[row].clone())
                .filter(|c| !c.is_empty());
        }
        g.leaves.insert(leaf_labels[row].clone());
    }
    groups
}

fn mean_and_variance(values: impl Iterator<Item = f64>) -> Option<Stat> {
    let vals: Vec<f64> = values.filter(|v| v.is_finite()).collect();
    if vals.is_empty() {
        return None;
    }
    let n = vals.len() as f64;
    let mean = vals.iter().sum::<f64>() / n;
    let variance = vals.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some(Stat { mean, variance })
}

fn world_centroids(
    table: &CellTable,
    level: &str,
    groups: &BTreeMap<String, Group>,
) -> Vec<WorldCentroid> {
    groups
        .iter()
        .map(|(label, g)| {
            let sum = g
                .rows
                .iter()
                .fold(Pt2::zeros(), |acc, &r| acc + table.points[r]);
            let center = sum / g.rows.len() as f64;
            let stats = table
                .stats
                .iter()
                .filter_map(|(name, col)| {
                    mean_and_variance(g.rows.iter().map(|&r| col[r])).map(|s| (name.clone(), s))
                })
                .collect();
            WorldCentroid {
                label: label.clone(),
                name: label.clone(),
                level: level.to_owned(),
                n_cells: g.rows.len() as u64,
                color: g.color.clone().unwrap_or_else(|| DEFAULT_COLOR.to_owned()),
                x: center.x,
                y: center.y,
                stats,
            }
        })
        .collect()
}

/// Boundaries for every leaf taxon: subdivide, hull each subset, optionally
/// assemble the subset hulls through the gate.
fn build_leaf_hulls(
    table: &CellTable,
    leaves: &BTreeMap<String, Group>,
    opts: &BuildOpts,
) -> BTreeMap<String, Vec<BareHull>> {
    let leaf_col = &table.labels[table.labels.len() - 1].1;
    let mut out = BTreeMap::new();
    for (label, g) in leaves {
        let pts: Vec<Pt2> = g.rows.iter().map(|&r| table.points[r]).collect();
        let mut hulls = leaf_hulls(&subdivide(&pts, &opts.subdivide));
        if let Some(gate) = &opts.gate {
            let member: Vec<bool> = leaf_col.iter().map(|l| l == label).collect();
            if let Some(test) = TestPoints::select(&table.points, &member, gate.slop) {
                hulls = assemble_leaf_hulls(hulls, &test, gate);
            }
        }
        tracing::debug!(leaf = %label, n_points = pts.len(), n_hulls = hulls.len(), "leaf hulls");
        if !hulls.is_empty() {
            out.insert(label.clone(), hulls);
        }
    }
    out
}

/// Compute every level's layout against one shared transform.
pub fn build_cache(
    table: &CellTable,
    connections: &BTreeMap<String, Vec<ConnectionSpec>>,
    opts: &BuildOpts,
) -> Result<LayoutCache> {
    if table.labels.is_empty() {
        bail!("at least one taxonomy level is required");
    }
    if table.is_empty() {
        bail!("cell table has no rows");
    }
    let transform = fit_transform(table.points.iter().copied(), &opts.canvas)?;
    let leaf_idx = table.labels.len() - 1;
    let leaf_groups = group_rows(table, leaf_idx);
    let leaf_hulls = build_leaf_hulls(table, &leaf_groups, opts);

    let mut cache = LayoutCache::new(&opts.canvas);
    let no_connections = Vec::new();
    for (idx, (level, _)) in table.labels.iter().enumerate() {
        let groups = if idx == leaf_idx {
            leaf_groups.clone()
        } else {
            group_rows(table, idx)
        };
        let world = world_centroids(table, level, &groups);
        let taxa: Vec<TaxonRecord> = world
            .iter()
            .map(|c| TaxonRecord {
                label: c.label.clone(),
                name: c.name.clone(),
                n_cells: c.n_cells,
                color: c.color.clone(),
                leaves: groups
                    .get(&c.label)
                    .map(|g| g.leaves.iter().cloned().collect())
                    .unwrap_or_default(),
            })
            .collect();
        let hulls = roll_up_level(&taxa, &leaf_hulls);
        let specs = connections.get(level).unwrap_or(&no_connections);
        let layout = lay_out_level(level, &world, specs, &hulls, &transform, &opts.canvas);
        tracing::info!(
            level = %level,
            centroids = layout.centroids.len(),
            ribbons = layout.ribbons.len(),
            hulls = layout.hulls.len(),
            "level_summary"
        );
        cache.insert_level(&layout);
    }
    Ok(cache)
}

/// What to draw from a cached layout.
#[derive(Clone, Debug, Default)]
pub struct SvgView {
    pub centroid_level: String,
    /// Defaults to the centroid level.
    pub hull_level: Option<String>,
    pub color_by: Option<String>,
    pub fill_hulls: bool,
    pub base_url: Option<String>,
}

/// Replay one view of the cache into an SVG document.
pub fn render_cache(cache: &LayoutCache, view: &SvgView) -> Result<String> {
    let level = cache.level(&view.centroid_level)?;
    let hulls = match &view.hull_level {
        Some(h) if *h != view.centroid_level => cache.level(h)?.hulls,
        _ => level.hulls.clone(),
    };
    let ramp = ColorRamp::cool();
    let (centroids, colorbar) = match &view.color_by {
        Some(stat) => {
            let (recolored, range) = color_by_stat(&level.centroids, stat, &ramp);
            if range.is_none() {
                tracing::warn!(stat = %stat, "no centroid carries this statistic");
            }
            let bar = range.map(|(vmin, vmax)| Colorbar {
                label: stat.clone(),
                vmin,
                vmax,
                ramp: ramp.clone(),
            });
            (recolored, bar)
        }
        None => (level.centroids.clone(), None),
    };
    let elements = render_scene(&centroids, &level.ribbons, &hulls, view.color_by.as_deref());
    let opts = SvgOptions {
        width: cache.fov.width,
        height: cache.fov.height,
        fill_hulls: view.fill_hulls,
        base_url: view.base_url.clone(),
        colorbar,
    };
    Ok(render_svg(&elements, &opts))
}
