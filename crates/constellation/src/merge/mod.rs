//! Hull merging: exact union, fixed-point reduction, gated leaf assembly.
//!
//! Purpose
//! - `merge`/`try_union`: union of two boundaries through their crossing graph.
//! - `merge_all`/`CompoundHull`: reduce a taxon's boundaries to a disjoint set.
//! - `roll_up_level`: one compound hull per taxon from its leaves' boundaries.
//! - `assemble_leaf_hulls`: heuristic, false-positive-gated merging used when
//!   leaf hulls come straight from noisy cell coordinates.
//! - `subdivide`/`leaf_hulls`: split a leaf's cloud before hulling it.
//!
//! Determinism
//! - Crossings are enumerated in segment-index order and ordered along each
//!   segment by distance from its start; walk starts are tried on the outer
//!   hull in ascending arena id. No hash ordering is involved anywhere.

mod compound;
mod gate;
mod subdivide;
mod union;

pub use compound::{merge_all, roll_up_level, CompoundHull, TaxonRecord};
pub use gate::{assemble_leaf_hulls, evaluate_merger, GateCfg, TestPoints};
pub use subdivide::{leaf_hulls, subdivide, SubdivideCfg};
pub use union::{merge, try_union, MergeError, Union};
