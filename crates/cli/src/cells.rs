use anyhow::{bail, Context, Result};
use constellation::geom::Pt2;
use constellation::synth::{SynthData, LEVELS};
use polars::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;

/// Cell coordinates with per-level labels, optional colors and numeric stats.
#[derive(Debug, Default)]
pub struct CellTable {
    pub points: Vec<Pt2>,
    /// Label column per taxonomy level, coarse to fine.
    pub labels: Vec<(String, Vec<String>)>,
    /// `<level>_color` column, when present.
    pub colors: BTreeMap<String, Vec<Option<String>>>,
    /// Every other numeric column; nulls are NaN.
    pub stats: BTreeMap<String, Vec<f64>>,
}

impl CellTable {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

fn load_frame(path: &Path) -> Result<DataFrame> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let lf = match ext.as_str() {
        "csv" => LazyCsvReader::new(path)
            .with_infer_schema_length(Some(100))
            .finish()?,
        "parquet" => LazyFrame::scan_parquet(path, ScanArgsParquet::default())?,
        other => bail!("unsupported cell table format {other:?} (want .csv or .parquet)"),
    };
    Ok(lf.collect()?)
}

fn f64_column(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let s = df
        .column(name)
        .with_context(|| format!("missing column {name:?}"))?
        .cast(&DataType::Float64)?;
    Ok(s.f64()?.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

fn str_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let s = df
        .column(name)
        .with_context(|| format!("missing column {name:?}"))?
        .cast(&DataType::String)?;
    Ok(s.str()?.into_iter().map(|v| v.map(str::to_owned)).collect())
}

/// Read a cell table (`.csv` or `.parquet`) with columns `x`, `y` and one
/// label column per entry of `levels`.
pub fn read_cells(path: &Path, levels: &[String]) -> Result<CellTable> {
    let df = load_frame(path).with_context(|| format!("reading {}", path.display()))?;
    tracing::info!(rows = df.height(), cols = df.width(), "cell_table_shape");

    let xs = f64_column(&df, "x")?;
    let ys = f64_column(&df, "y")?;
    let points = xs.into_iter().zip(ys).map(|(x, y)| Pt2::new(x, y)).collect();

    let mut labels = Vec::with_capacity(levels.len());
    let mut colors = BTreeMap::new();
    for level in levels {
        let col: Vec<String> = str_column(&df, level)?
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect();
        labels.push((level.clone(), col));
        let color_col = format!("{level}_color");
        if df.column(&color_col).is_ok() {
            colors.insert(level.clone(), str_column(&df, &color_col)?);
        }
    }

    let mut stats = BTreeMap::new();
    let names: Vec<String> = df.get_column_names().into_iter().map(|s| s.to_string()).collect();
    for name in names {
        let reserved = name == "x"
            || name == "y"
            || levels.iter().any(|l| *l == name || format!("{l}_color") == name);
        if reserved || !df.column(&name)?.dtype().is_numeric() {
            continue;
        }
        stats.insert(name.clone(), f64_column(&df, &name)?);
    }

    Ok(CellTable {
        points,
        labels,
        colors,
        stats,
    })
}

/// Write a synthetic constellation as a CSV cell table.
pub fn write_synth_cells(path: &Path, data: &SynthData) -> Result<()> {
    let xs: Vec<f64> = data.cells.iter().map(|c| c.x).collect();
    let ys: Vec<f64> = data.cells.iter().map(|c| c.y).collect();
    let depth: Vec<f64> = data.cells.iter().map(|c| c.depth).collect();
    let label = |i: usize| -> Vec<String> { data.cells.iter().map(|c| c.labels[i].clone()).collect() };
    let color = |i: usize| -> Vec<String> {
        data.cells
            .iter()
            .map(|c| data.colors.get(&c.labels[i]).cloned().unwrap_or_default())
            .collect()
    };
    let mut df = df!(
        "x" => xs,
        "y" => ys,
        LEVELS[0] => label(0),
        LEVELS[1] => label(1),
        LEVELS[2] => label(2),
        "class_color" => color(0),
        "subclass_color" => color(1),
        "cluster_color" => color(2),
        "depth" => depth
    )?;
    let mut file =
        std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    CsvWriter::new(&mut file).include_header(true).finish(&mut df)?;
    Ok(())
}
