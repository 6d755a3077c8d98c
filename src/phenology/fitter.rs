//! # Random-restart coordinate-descent phenology fitter
//!
//! Fits the double-logistic seasonal curve to a cleaned, date-ordered
//! observation series by minimizing the root-mean-square error.
//!
//! ## Algorithm outline
//!
//! 1. Build a base guess: 10th/90th-percentile index values for baseline and
//!    peak, fixed calendar defaults for the transition parameters.
//! 2. Run `max(runs, 1)` independent local searches. Run 0 starts from the
//!    unperturbed base guess; every later run starts from a perturbed copy
//!    where each parameter is scaled by `1 + U(-pct, pct)` and re-clamped to
//!    its domain.
//! 3. Each local search is a coordinate descent with a shrinking per-parameter
//!    step: every round, each parameter in turn is probed at `±step`, the
//!    lower-RMSE candidate is accepted if it improves on the incumbent by more
//!    than the tolerance. A round without any improvement shrinks every step
//!    geometrically. The loop always runs the full round budget.
//! 4. The lowest-RMSE result across all restarts is returned, with its `rmse`
//!    field populated. Ties keep the earlier result.
//!
//! Randomness enters only through the restart perturbation, via a
//! caller-injected [`Rng`], so the base-only run (`runs = 1`) is fully
//! deterministic and reproducible across platforms.

use itertools::Itertools;
use nalgebra::Vector6;
use rand::Rng;

use crate::constants::{IndexValue, Series};
use crate::greenwave_errors::GreenwaveError;
use crate::phenology::model::double_logistic;
use crate::phenology::{FitParams, PhenologyParams, PARAM_DOMAINS};

/// Fit the double-logistic model to an observation series.
///
/// The series is expected to be deduplicated to one value per date (see
/// [`SeriesExt::dedup_daily`](crate::observations::SeriesExt::dedup_daily));
/// the fitter itself only reads dates and index values.
///
/// Arguments
/// -----------------
/// * `series`: the observation series to fit.
/// * `rng`: random number generator driving the restart perturbations
///   (e.g. a seeded [`StdRng`](rand::rngs::StdRng) for reproducible runs).
/// * `params`: fitter configuration, see [`FitParams`].
///
/// Return
/// ----------
/// * `Ok(PhenologyParams)` – the best fit found across all restarts, with its
///   achieved RMSE.
/// * `Err(GreenwaveError::EmptySeries)` – no observations at all.
/// * `Err(GreenwaveError::InsufficientObservations)` – fewer observations
///   than `params.min_observations`.
///
/// See also
/// ------------
/// * [`rmse`] – the objective being minimized.
/// * [`double_logistic`] – the fitted model.
pub fn fit_phenology(
    series: &Series,
    rng: &mut impl Rng,
    params: &FitParams,
) -> Result<PhenologyParams, GreenwaveError> {
    if series.is_empty() {
        return Err(GreenwaveError::EmptySeries);
    }
    if series.len() < params.min_observations {
        return Err(GreenwaveError::InsufficientObservations {
            required: params.min_observations,
            actual: series.len(),
        });
    }

    let base = initial_guess(series);

    let mut best = base;
    for run in 0..params.runs.max(1) {
        let start = if run == 0 { base } else { perturb(&base, rng) };
        let fit = local_search(start, series, params);
        // Strict inequality: ties keep the earlier result.
        if fit.rmse < best.rmse {
            best = fit;
        }
    }
    Ok(best)
}

/// Root-mean-square error of a parameter set against an observation series.
///
/// For each observation the error is
/// `double_logistic(params, day_of_year) - index`; the result is
/// `sqrt(mean(error²))`. Returns NaN on an empty series; the fitter never
/// calls it that way.
pub fn rmse(params: &PhenologyParams, series: &Series) -> f64 {
    let sum: f64 = series
        .iter()
        .map(|obs| {
            let e = double_logistic(params, obs.day_of_year()) - obs.index;
            e * e
        })
        .sum();
    (sum / series.len() as f64).sqrt()
}

/// Percentile-based starting point for the local search.
///
/// The 10th-percentile index value seeds the baseline and the 90th-percentile
/// the peak (indices `floor(0.1·n)` / `floor(0.9·n)`, clamped to the valid
/// range); the peak is forced to at least `mn + 0.1` to avoid a degenerate
/// flat model. Transition parameters start from fixed Northern-hemisphere
/// calendar defaults.
fn initial_guess(series: &Series) -> PhenologyParams {
    let values: Vec<IndexValue> = series
        .iter()
        .map(|obs| obs.index)
        .sorted_by(|a, b| a.total_cmp(b))
        .collect();
    let last = values.len() - 1;
    let mn = values[((values.len() as f64 * 0.1) as usize).min(last)];
    let mx = values[((values.len() as f64 * 0.9) as usize).min(last)];

    PhenologyParams {
        mn,
        mx: mx.max(mn + 0.1),
        sos: 80.0,
        rsp: 0.05,
        eos: 280.0,
        rau: 0.05,
        rmse: f64::INFINITY,
    }
}

/// Randomized restart point: each parameter of the base guess is scaled by
/// `1 + U(-pct, pct)` with its per-parameter amplitude, then clamped to its
/// domain.
fn perturb(base: &PhenologyParams, rng: &mut impl Rng) -> PhenologyParams {
    let v = base.to_vector();
    let mut out = Vector6::zeros();
    for (i, dom) in PARAM_DOMAINS.iter().enumerate() {
        let factor = 1.0 + rng.random_range(-dom.perturb_pct..dom.perturb_pct);
        out[i] = dom.clamp(v[i] * factor);
    }
    PhenologyParams::from_vector(&out, f64::INFINITY)
}

/// One candidate move: add `delta` to parameter `idx`, re-clamped to its domain.
#[inline]
fn tweak(v: &Vector6<f64>, idx: usize, delta: f64) -> Vector6<f64> {
    let mut out = *v;
    out[idx] = PARAM_DOMAINS[idx].clamp(out[idx] + delta);
    out
}

/// Coordinate descent with shrinking step sizes and a fixed round budget.
fn local_search(start: PhenologyParams, series: &Series, params: &FitParams) -> PhenologyParams {
    let mut current = start.to_vector();
    let mut current_rmse = rmse(&PhenologyParams::from_vector(&current, f64::INFINITY), series);
    let mut step: Vector6<f64> =
        Vector6::from_iterator(PARAM_DOMAINS.iter().map(|dom| dom.initial_step));

    for _ in 0..params.max_rounds {
        let mut improved = false;
        for i in 0..PARAM_DOMAINS.len() {
            let minus = tweak(&current, i, -step[i]);
            let plus = tweak(&current, i, step[i]);
            let minus_rmse = rmse(&PhenologyParams::from_vector(&minus, f64::INFINITY), series);
            let plus_rmse = rmse(&PhenologyParams::from_vector(&plus, f64::INFINITY), series);

            // The downhill candidate wins ties.
            let (candidate, candidate_rmse) = if minus_rmse <= plus_rmse {
                (minus, minus_rmse)
            } else {
                (plus, plus_rmse)
            };

            if candidate_rmse + params.improvement_eps < current_rmse {
                current = candidate;
                current_rmse = candidate_rmse;
                improved = true;
            }
        }
        if !improved {
            step *= params.step_shrink;
        }
    }

    PhenologyParams::from_vector(&current, current_rmse)
}
