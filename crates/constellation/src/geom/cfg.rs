//! Tolerance defaults for 2D geometry (internal).
//!
//! Policy
//! - Fixed constants; the engine works on embedding coordinates of order 1–100
//!   and pixel coordinates of order 1–1000, so absolute tolerances suffice.

/// Guard for the cross product of two segment directions; below it the
/// segments are treated as parallel and never reported as crossing.
pub(crate) const DENOM_EPS: f64 = 1e-12;
/// Points closer than this are the same vertex during de-duplication.
pub(crate) const DEDUP_EPS: f64 = 1e-12;
