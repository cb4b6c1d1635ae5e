use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use constellation::layout::{Canvas, ConnectionSpec};
use constellation::merge::{GateCfg, SubdivideCfg};
use constellation::store::LayoutCache;
use constellation::synth::{generate, ReplayToken, SynthCfg, LEVELS};
use serde_json::json;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;

mod cells;
mod pipeline;
mod provenance;

use pipeline::{build_cache, render_cache, BuildOpts, SvgView};
use provenance::Sidecar;

#[derive(Parser)]
#[command(name = "constellation-cli")]
#[command(about = "Build constellation plot layouts and render them to SVG")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Lay out every taxonomy level of a cell table into a JSON layout cache
    Build {
        /// Cell table (.csv or .parquet) with x, y and one column per level
        #[arg(long)]
        cells: PathBuf,
        /// Taxonomy levels, coarse to fine; the last one holds the leaves
        #[arg(long, value_delimiter = ',', required = true)]
        levels: Vec<String>,
        /// JSON object mapping each level to its connection list
        #[arg(long)]
        connections: Option<PathBuf>,
        /// Assemble leaf hulls through the false-positive gate
        #[arg(long)]
        gate: bool,
        #[arg(long, default_value_t = 800.0)]
        width: f64,
        #[arg(long, default_value_t = 1080.0)]
        height: f64,
        #[arg(long, default_value_t = 20.0)]
        max_radius: f64,
        #[arg(long, default_value_t = 2.0)]
        min_radius: f64,
        /// Split leaf point sets larger than this before hulling
        #[arg(long, default_value_t = 500)]
        max_points: usize,
        /// Drop leaf subsets smaller than this
        #[arg(long, default_value_t = 10)]
        min_points: usize,
        #[arg(long)]
        out: PathBuf,
    },
    /// Write a synthetic cell table and connections, then build them
    Demo {
        #[arg(long)]
        out_dir: PathBuf,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Render one level of a layout cache as SVG
    Svg {
        #[arg(long)]
        layout: PathBuf,
        #[arg(long)]
        centroid_level: String,
        /// Level whose hulls are drawn; defaults to the centroid level
        #[arg(long)]
        hull_level: Option<String>,
        /// Recolor centroids by the mean of this statistic
        #[arg(long)]
        color_by: Option<String>,
        #[arg(long)]
        fill_hulls: bool,
        /// Link each taxon to `<base-url>/<label>`
        #[arg(long)]
        base_url: Option<String>,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print a small provenance JSON block
    Report,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Build {
            cells,
            levels,
            connections,
            gate,
            width,
            height,
            max_radius,
            min_radius,
            max_points,
            min_points,
            out,
        } => {
            let opts = BuildOpts {
                canvas: Canvas {
                    width,
                    height,
                    max_radius,
                    min_radius,
                },
                subdivide: SubdivideCfg {
                    max_points,
                    min_points,
                },
                gate: gate.then(GateCfg::default),
            };
            build(&cells, &levels, connections.as_deref(), &opts, &out)
        }
        Action::Demo { out_dir, seed } => demo(&out_dir, seed),
        Action::Svg {
            layout,
            centroid_level,
            hull_level,
            color_by,
            fill_hulls,
            base_url,
            out,
        } => {
            let view = SvgView {
                centroid_level,
                hull_level,
                color_by,
                fill_hulls,
                base_url,
            };
            svg(&layout, &view, &out)
        }
        Action::Report => report(),
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    Ok(())
}

fn read_connections(path: &Path) -> Result<BTreeMap<String, Vec<ConnectionSpec>>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing connections {}", path.display()))
}

fn build(
    cells: &Path,
    levels: &[String],
    connections: Option<&Path>,
    opts: &BuildOpts,
    out: &Path,
) -> Result<()> {
    tracing::info!(
        cells = %cells.display(),
        levels = ?levels,
        gate = opts.gate.is_some(),
        width = opts.canvas.width,
        height = opts.canvas.height,
        out = %out.display(),
        "build"
    );
    let table = cells::read_cells(cells, levels)?;
    let conns = match connections {
        Some(p) => read_connections(p)?,
        None => BTreeMap::new(),
    };
    let cache = build_cache(&table, &conns, opts)?;

    ensure_parent(out)?;
    let file = File::create(out).with_context(|| format!("creating {}", out.display()))?;
    cache.write_json(BufWriter::new(file))?;

    let mut sidecar = Sidecar::new(
        "build",
        json!({
            "levels": levels,
            "gate": opts.gate,
            "canvas": opts.canvas,
            "subdivide": opts.subdivide,
        }),
    )
    .input(cells);
    if let Some(p) = connections {
        sidecar = sidecar.input(p);
    }
    sidecar.write_next_to(out)?;
    Ok(())
}

fn demo(out_dir: &Path, seed: u64) -> Result<()> {
    tracing::info!(out_dir = %out_dir.display(), seed, "demo");
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;
    let data = generate(&SynthCfg::default(), ReplayToken::new(seed, 0));

    let cells = out_dir.join("cells.csv");
    cells::write_synth_cells(&cells, &data)?;
    let connections = out_dir.join("connections.json");
    std::fs::write(&connections, serde_json::to_vec_pretty(&data.connections)?)
        .with_context(|| format!("writing {}", connections.display()))?;

    let levels: Vec<String> = LEVELS.iter().map(|s| s.to_string()).collect();
    build(
        &cells,
        &levels,
        Some(&connections),
        &BuildOpts::default(),
        &out_dir.join("layout.json"),
    )
}

fn svg(layout: &Path, view: &SvgView, out: &Path) -> Result<()> {
    tracing::info!(
        layout = %layout.display(),
        centroid_level = %view.centroid_level,
        hull_level = ?view.hull_level,
        color_by = ?view.color_by,
        out = %out.display(),
        "svg"
    );
    let file = File::open(layout).with_context(|| format!("opening {}", layout.display()))?;
    let cache = LayoutCache::read_json(BufReader::new(file))
        .with_context(|| format!("loading layout {}", layout.display()))?;
    let doc = render_cache(&cache, view)?;

    ensure_parent(out)?;
    std::fs::write(out, doc).with_context(|| format!("writing {}", out.display()))?;
    Sidecar::new(
        "svg",
        json!({
            "centroid_level": view.centroid_level,
            "hull_level": view.hull_level,
            "color_by": view.color_by,
            "fill_hulls": view.fill_hulls,
            "base_url": view.base_url,
        }),
    )
    .input(layout)
    .write_next_to(out)?;
    Ok(())
}

fn report() -> Result<()> {
    let obj = json!({
        "engine_version": constellation::VERSION,
        "code_rev": provenance::current_git_rev(),
        "levels": LEVELS,
        "canvas": Canvas::default(),
        "gate": GateCfg::default(),
        "subdivide": SubdivideCfg::default(),
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}
