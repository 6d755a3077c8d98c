//! # Double-logistic phenology estimation
//!
//! This module defines the [`PhenologyParams`] parameter set of the
//! double-logistic seasonal curve, the per-parameter [`ParamDomain`] table
//! (clamp bounds, restart perturbation amplitudes, initial coordinate-descent
//! steps), and the [`FitParams`] configuration struct with its builder, which
//! controls how the **random-restart coordinate-descent fitter** behaves.
//!
//! ## Purpose
//!
//! The [`FitParams`] object centralizes all tunable parameters used by
//! [`fit_phenology`](crate::phenology::fitter::fit_phenology). It allows you to:
//!
//! - Choose the number of random restarts (`runs`),
//! - Adjust the fixed round budget and step-shrink factor of the local search,
//! - Tune the minimum-improvement tolerance that guards against numerical churn,
//! - Set the minimum observation count below which fitting is refused,
//! - Set the RMSE threshold separating "good" from "poor" fits in batch summaries.
//!
//! ## Pipeline overview
//!
//! 1. **Initial guess** – percentile-based baseline/peak estimate plus fixed
//!    calendar defaults for the season transitions.
//!
//! 2. **Random restarts** – run 0 starts from the unperturbed guess; every
//!    later run perturbs each parameter by `1 + U(-pct, pct)` and re-clamps it
//!    to its domain.
//!
//! 3. **Local search** – coordinate descent with a shrinking per-parameter
//!    step, always running the full round budget. The lowest-RMSE result
//!    across all restarts wins; ties keep the earlier result.
//!
//! ## Example
//!
//! ```rust,no_run
//! use greenwave::phenology::FitParams;
//!
//! let params = FitParams::builder()
//!     .runs(16)
//!     .good_rmse(0.1)
//!     .build()
//!     .unwrap();
//!
//! // Pass the configuration to the fitter entry point
//! // let fit = greenwave::fit_phenology(&series, &mut rng, &params)?;
//! ```
//!
//! ## See also
//!
//! * [`fit_phenology`](crate::phenology::fitter::fit_phenology) – main fitting entry point
//! * [`double_logistic`](crate::phenology::model::double_logistic) – curve evaluation
use std::fmt;

use nalgebra::Vector6;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DayOfYear, IndexValue, FIT_ROUNDS, IMPROVEMENT_EPS, MIN_FIT_OBSERVATIONS, STEP_SHRINK,
};
use crate::greenwave_errors::GreenwaveError;

pub mod fitter;
pub mod model;
pub mod series_fit;

/// Fitted parameter set of the double-logistic seasonal curve.
///
/// Fields
/// -----------------
/// * `mn` – baseline (dormant-season) index value.
/// * `mx` – peak (growing-season) index value.
/// * `sos` – start of season, day-of-year midpoint of the green-up transition.
/// * `rsp` – logistic steepness of the green-up transition.
/// * `eos` – end of season, day-of-year midpoint of the senescence transition.
/// * `rau` – logistic steepness of the senescence transition.
/// * `rmse` – achieved fit error; `f64::INFINITY` until evaluated.
///
/// `mx > mn` is encouraged by the initial guess but not enforced by the model
/// evaluation itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhenologyParams {
    pub mn: IndexValue,
    pub mx: IndexValue,
    pub sos: DayOfYear,
    pub rsp: f64,
    pub eos: DayOfYear,
    pub rau: f64,
    pub rmse: f64,
}

impl PhenologyParams {
    /// Pack the six free parameters into a vector, in domain-table order
    /// `[mn, mx, sos, rsp, eos, rau]`. The `rmse` field is not part of the
    /// search space and is dropped.
    pub fn to_vector(&self) -> Vector6<f64> {
        Vector6::new(self.mn, self.mx, self.sos, self.rsp, self.eos, self.rau)
    }

    /// Rebuild a parameter set from a search-space vector and an RMSE value.
    pub fn from_vector(v: &Vector6<f64>, rmse: f64) -> Self {
        PhenologyParams {
            mn: v[0],
            mx: v[1],
            sos: v[2],
            rsp: v[3],
            eos: v[4],
            rau: v[5],
            rmse,
        }
    }
}

impl fmt::Display for PhenologyParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PhenologyParams(mn={:.3}, mx={:.3}, sos={:.1}, rsp={:.3}, eos={:.1}, rau={:.3}, rmse={:.4})",
            self.mn, self.mx, self.sos, self.rsp, self.eos, self.rau, self.rmse
        )
    }
}

/// Valid domain and search policy for one free parameter of the model.
///
/// The clamping bounds encode domain knowledge: index values roughly in
/// `[-0.5, 1.2]`, day-of-year in `[1, 366]`, logistic steepness in
/// `[0.001, 0.5]`. Keeping them in a table keyed by parameter keeps the
/// coordinate-descent loop generic over the parameter count.
#[derive(Debug, Clone, Copy)]
pub struct ParamDomain {
    pub name: &'static str,
    /// Lower clamp bound.
    pub min: f64,
    /// Upper clamp bound.
    pub max: f64,
    /// Restart perturbation amplitude: each restart scales the base guess by
    /// `1 + U(-perturb_pct, perturb_pct)`.
    pub perturb_pct: f64,
    /// Initial coordinate-descent step size.
    pub initial_step: f64,
}

impl ParamDomain {
    /// Clamp a candidate value to the valid domain.
    #[inline]
    pub fn clamp(&self, v: f64) -> f64 {
        v.clamp(self.min, self.max)
    }
}

/// Domain table for `[mn, mx, sos, rsp, eos, rau]`, in search-space order.
pub const PARAM_DOMAINS: [ParamDomain; 6] = [
    ParamDomain {
        name: "mn",
        min: -0.5,
        max: 0.8,
        perturb_pct: 0.5,
        initial_step: 0.02,
    },
    ParamDomain {
        name: "mx",
        min: 0.0,
        max: 1.2,
        perturb_pct: 0.5,
        initial_step: 0.02,
    },
    ParamDomain {
        name: "sos",
        min: 1.0,
        max: 250.0,
        perturb_pct: 0.25,
        initial_step: 6.0,
    },
    ParamDomain {
        name: "rsp",
        min: 0.001,
        max: 0.5,
        perturb_pct: 0.2,
        initial_step: 0.01,
    },
    ParamDomain {
        name: "eos",
        min: 100.0,
        max: 366.0,
        perturb_pct: 0.25,
        initial_step: 6.0,
    },
    ParamDomain {
        name: "rau",
        min: 0.001,
        max: 0.5,
        perturb_pct: 0.2,
        initial_step: 0.01,
    },
];

/// Configuration parameters controlling the behavior of
/// [`fit_phenology`](crate::phenology::fitter::fit_phenology).
///
/// Fields
/// -----------------
/// * `runs` – number of independent local-search restarts; run 0 is always
///   unperturbed, later runs start from a randomized copy of the base guess.
/// * `max_rounds` – coordinate-descent round budget per local search. The
///   loop always runs the full budget (fixed-budget optimizer, not a
///   threshold-convergence one).
/// * `step_shrink` – geometric factor applied to every step after a round
///   with no accepted improvement.
/// * `improvement_eps` – minimum RMSE gain for a candidate to be accepted.
/// * `min_observations` – fitting is refused below this observation count.
/// * `good_rmse` – RMSE threshold separating "good" from "poor" fits in
///   [`FitSummary`](crate::phenology::series_fit::FitSummary) batch scans.
///
/// Defaults
/// -----------------
/// * `runs`: 8
/// * `max_rounds`: 120
/// * `step_shrink`: 0.8
/// * `improvement_eps`: 1e-9
/// * `min_observations`: 4
/// * `good_rmse`: 0.15
///
/// The round budget and shrink factor are a deliberate simplicity/robustness
/// tradeoff over a gradient method; changing them changes fit quality and
/// running time in lockstep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitParams {
    pub runs: usize,
    pub max_rounds: usize,
    pub step_shrink: f64,
    pub improvement_eps: f64,
    pub min_observations: usize,
    pub good_rmse: f64,
}

impl FitParams {
    /// Construct a new [`FitParams`] with default values.
    ///
    /// This is equivalent to calling [`FitParams::default()`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new [`FitParamsBuilder`] to configure custom fitter parameters.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use greenwave::phenology::FitParams;
    ///
    /// let params = FitParams::builder()
    ///     .runs(16)
    ///     .improvement_eps(1e-10)
    ///     .build()
    ///     .unwrap();
    /// ```
    pub fn builder() -> FitParamsBuilder {
        FitParamsBuilder::new()
    }
}

impl Default for FitParams {
    fn default() -> Self {
        FitParams {
            runs: 8,
            max_rounds: FIT_ROUNDS,
            step_shrink: STEP_SHRINK,
            improvement_eps: IMPROVEMENT_EPS,
            min_observations: MIN_FIT_OBSERVATIONS,
            good_rmse: 0.15,
        }
    }
}

/// Builder for [`FitParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct FitParamsBuilder {
    params: FitParams,
}

impl FitParamsBuilder {
    /// Create a new builder initialized with default values.
    pub fn new() -> Self {
        Self {
            params: FitParams::default(),
        }
    }

    pub fn runs(mut self, v: usize) -> Self {
        self.params.runs = v;
        self
    }
    pub fn max_rounds(mut self, v: usize) -> Self {
        self.params.max_rounds = v;
        self
    }
    pub fn step_shrink(mut self, v: f64) -> Self {
        self.params.step_shrink = v;
        self
    }
    pub fn improvement_eps(mut self, v: f64) -> Self {
        self.params.improvement_eps = v;
        self
    }
    pub fn min_observations(mut self, v: usize) -> Self {
        self.params.min_observations = v;
        self
    }
    pub fn good_rmse(mut self, v: f64) -> Self {
        self.params.good_rmse = v;
        self
    }

    /// Return true iff x > 0.0 and comparable (i.e., not NaN).
    #[inline]
    fn gt0(x: f64) -> bool {
        x.partial_cmp(&0.0) == Some(std::cmp::Ordering::Greater)
    }

    /// Finalize the builder and produce a [`FitParams`] instance.
    ///
    /// Validation rules
    /// -----------------
    /// * `runs >= 1` – at least the unperturbed base run must execute.
    /// * `max_rounds >= 1`.
    /// * `0 < step_shrink < 1` – the step schedule must actually shrink.
    /// * `improvement_eps > 0`.
    /// * `min_observations >= 4` – a six-parameter model needs a minimum signal.
    /// * `good_rmse > 0`.
    ///
    /// Returns
    /// -----------------
    /// * `Ok(FitParams)` if all values are valid.
    /// * `Err(GreenwaveError::InvalidFitParameter)` otherwise.
    pub fn build(self) -> Result<FitParams, GreenwaveError> {
        let p = &self.params;

        if p.runs == 0 {
            return Err(GreenwaveError::InvalidFitParameter(
                "runs must be >= 1".into(),
            ));
        }
        if p.max_rounds == 0 {
            return Err(GreenwaveError::InvalidFitParameter(
                "max_rounds must be >= 1".into(),
            ));
        }
        if !(Self::gt0(p.step_shrink) && p.step_shrink < 1.0) {
            return Err(GreenwaveError::InvalidFitParameter(
                "step_shrink must be in (0, 1)".into(),
            ));
        }
        if !Self::gt0(p.improvement_eps) {
            return Err(GreenwaveError::InvalidFitParameter(
                "improvement_eps must be > 0".into(),
            ));
        }
        if p.min_observations < MIN_FIT_OBSERVATIONS {
            return Err(GreenwaveError::InvalidFitParameter(format!(
                "min_observations must be >= {MIN_FIT_OBSERVATIONS}"
            )));
        }
        if !Self::gt0(p.good_rmse) {
            return Err(GreenwaveError::InvalidFitParameter(
                "good_rmse must be > 0".into(),
            ));
        }

        Ok(self.params)
    }
}

impl fmt::Display for FitParams {
    /// Compact by default; pretty multi-line when using the alternate flag (`{:#}`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Phenology Fit Parameters")?;
            writeln!(f, "------------------------")?;
            writeln!(f, "runs             : {}", self.runs)?;
            writeln!(f, "max_rounds       : {}", self.max_rounds)?;
            writeln!(f, "step_shrink      : {:.2}", self.step_shrink)?;
            writeln!(f, "improvement_eps  : {:.1e}", self.improvement_eps)?;
            writeln!(f, "min_observations : {}", self.min_observations)?;
            write!(f, "good_rmse        : {:.3}", self.good_rmse)
        } else {
            write!(
                f,
                "FitParams(runs={}, max_rounds={}, step_shrink={:.2}, improvement_eps={:.1e}, min_observations={}, good_rmse={:.3})",
                self.runs,
                self.max_rounds,
                self.step_shrink,
                self.improvement_eps,
                self.min_observations,
                self.good_rmse,
            )
        }
    }
}

#[cfg(test)]
mod fit_params_test {
    use super::*;

    #[test]
    fn test_defaults_match_fitter_policy() {
        let p = FitParams::default();
        assert_eq!(p.runs, 8);
        assert_eq!(p.max_rounds, 120);
        assert_eq!(p.step_shrink, 0.8);
        assert_eq!(p.improvement_eps, 1e-9);
        assert_eq!(p.min_observations, 4);
    }

    #[test]
    fn test_builder_rejects_invalid_values() {
        assert!(FitParams::builder().runs(0).build().is_err());
        assert!(FitParams::builder().max_rounds(0).build().is_err());
        assert!(FitParams::builder().step_shrink(1.0).build().is_err());
        assert!(FitParams::builder().step_shrink(0.0).build().is_err());
        assert!(FitParams::builder().step_shrink(f64::NAN).build().is_err());
        assert!(FitParams::builder().improvement_eps(0.0).build().is_err());
        assert!(FitParams::builder().min_observations(3).build().is_err());
        assert!(FitParams::builder().good_rmse(-0.1).build().is_err());
    }

    #[test]
    fn test_builder_accepts_custom_values() {
        let p = FitParams::builder()
            .runs(16)
            .good_rmse(0.1)
            .build()
            .unwrap();
        assert_eq!(p.runs, 16);
        assert_eq!(p.good_rmse, 0.1);
    }

    #[test]
    fn test_vector_round_trip() {
        let p = PhenologyParams {
            mn: 0.15,
            mx: 0.8,
            sos: 80.0,
            rsp: 0.05,
            eos: 280.0,
            rau: 0.05,
            rmse: 0.01,
        };
        let back = PhenologyParams::from_vector(&p.to_vector(), p.rmse);
        assert_eq!(p, back);
    }

    #[test]
    fn test_domain_table_order_matches_vector_order() {
        let names: Vec<&str> = PARAM_DOMAINS.iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["mn", "mx", "sos", "rsp", "eos", "rau"]);
    }
}
