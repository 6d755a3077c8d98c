//! # Constants and type definitions for greenwave
//!
//! This module centralizes the **tuning constants** and **common type
//! definitions** used throughout the `greenwave` library. It also defines the
//! container type for storing the observation series of a single unit
//! (a pixel, a field, an area of interest).
//!
//! ## Overview
//!
//! - Fitter policy constants (round budget, step shrink, tolerances)
//! - Minimum sample counts for fitting and comparison
//! - Core type aliases used across the crate
//!
//! These definitions are used by all main modules, including the phenology
//! fitter and the series comparator.

use crate::observations::Observation;
use smallvec::SmallVec;

// -------------------------------------------------------------------------------------------------
// Fitter policy
// -------------------------------------------------------------------------------------------------

/// Number of coordinate-descent rounds per local search. The loop always runs
/// the full budget, there is no early exit on convergence.
pub const FIT_ROUNDS: usize = 120;

/// Geometric factor applied to every step size after a round with no improvement.
pub const STEP_SHRINK: f64 = 0.8;

/// Minimum RMSE improvement for a candidate to be accepted, guards against
/// churn on numerical noise.
pub const IMPROVEMENT_EPS: f64 = 1e-9;

/// Minimum number of observations required to fit the six-parameter
/// double-logistic model.
pub const MIN_FIT_OBSERVATIONS: usize = 4;

/// Minimum number of date-paired samples required for a series comparison.
pub const MIN_PAIRED_SAMPLES: usize = 5;

/// Floor applied to the total sum of squares in the R² denominator.
pub const SS_TOT_FLOOR: f64 = 1e-9;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Day of year, 1-based (1–365/366), fractional values allowed
pub type DayOfYear = f64;
/// Vegetation index value (NDVI is roughly in [-1, 1])
pub type IndexValue = f64;
/// Surface reflectance of a spectral band
pub type Reflectance = f64;

/// A small, inline-optimized container for the observations of a single unit.
pub type Series = SmallVec<[Observation; 8]>;
