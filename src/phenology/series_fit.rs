//! # Batch phenology fitting over series sets
//!
//! Run the phenology fitter over a [`SeriesSet`] (one observation series per
//! unit, e.g. per pixel or per field), collect **per-unit outcomes**, and
//! expose helpers to query results and summarize observation counts.
//!
//! ## Result model
//!
//! Batch outcomes are returned as a [`FullFitResult`]:
//!
//! ```text
//! SeriesKey → Result<PhenologyParams, GreenwaveError>
//! ```
//!
//! Failures are **per-series**: one series lacking observations does not
//! abort the batch. [`FitSummary::scan`] folds a result map into the
//! good / poor / skipped counts used for reporting.
//!
//! ## Progress UI (feature: `progress`)
//!
//! When compiled with the `progress` feature, [`SeriesSetFit::fit_all`]
//! renders a live progress bar via `indicatif`.

use std::collections::HashMap;
use std::fmt;

use ahash::RandomState;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[cfg(feature = "progress")]
use indicatif::{ProgressBar, ProgressStyle};

use crate::constants::Series;
use crate::greenwave_errors::GreenwaveError;
use crate::observations::SeriesKey;
use crate::phenology::fitter::fit_phenology;
use crate::phenology::{FitParams, PhenologyParams};

/// Set of observation series keyed by unit identifier.
///
/// Uses [`ahash`](https://docs.rs/ahash) for fast hashing.
pub type SeriesSet = HashMap<SeriesKey, Series, RandomState>;

/// Full batch fitting results: one entry per processed series, either the
/// fitted parameters or the per-series failure.
pub type FullFitResult = HashMap<SeriesKey, Result<PhenologyParams, GreenwaveError>, RandomState>;

/// Borrow the fitted parameters (if any) for a given key.
///
/// Return
/// ----------
/// * `Ok(Some(&PhenologyParams))` – a fit is present for the key.
/// * `Ok(None)` – key absent from the result map.
/// * `Err(&GreenwaveError)` – fitting failed for that key.
pub fn fit_result_for<'a>(
    all: &'a FullFitResult,
    key: &SeriesKey,
) -> Result<Option<&'a PhenologyParams>, &'a GreenwaveError> {
    match all.get(key) {
        None => Ok(None),
        Some(Err(e)) => Err(e),
        Some(Ok(fit)) => Ok(Some(fit)),
    }
}

/// Good / poor / skipped counts over a batch fitting run.
///
/// A fit is **good** when its RMSE is at or below the quality threshold,
/// **poor** otherwise, and a series is **skipped** when fitting returned an
/// error (insufficient observations, empty series).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitSummary {
    pub good: usize,
    pub poor: usize,
    pub skipped: usize,
}

impl FitSummary {
    /// Fold a batch result map into good/poor/skipped counts.
    ///
    /// Arguments
    /// ---------
    /// * `results`: the batch outcome map
    /// * `good_rmse`: RMSE threshold at or below which a fit counts as good
    pub fn scan(results: &FullFitResult, good_rmse: f64) -> Self {
        let mut summary = FitSummary {
            good: 0,
            poor: 0,
            skipped: 0,
        };
        for res in results.values() {
            match res {
                Ok(fit) if fit.rmse <= good_rmse => summary.good += 1,
                Ok(_) => summary.poor += 1,
                Err(_) => summary.skipped += 1,
            }
        }
        summary
    }

    /// Total number of series accounted for.
    pub fn total(&self) -> usize {
        self.good + self.poor + self.skipped
    }
}

impl fmt::Display for FitSummary {
    /// Compact by default; pretty multi-line when using the alternate flag (`{:#}`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Batch fit summary")?;
            writeln!(f, "-----------------")?;
            writeln!(f, "good    : {}", self.good)?;
            writeln!(f, "poor    : {}", self.poor)?;
            write!(f, "skipped : {}", self.skipped)
        } else {
            write!(
                f,
                "good={}, poor={}, skipped={}",
                self.good, self.poor, self.skipped
            )
        }
    }
}

/// Summary statistics for per-series observation counts.
///
/// Percentiles are computed using the *nearest-rank* method: the index is
/// `round(q × (N-1))` for quantile `q ∈ [0,1]`, clamped to valid range. This
/// convention makes results stable even for small sample sizes.
#[derive(Debug, Clone, Copy)]
pub struct ObsCountStats {
    pub min: usize,
    pub p25: usize,
    pub median: usize,
    pub p95: usize,
    pub max: usize,
}

impl fmt::Display for ObsCountStats {
    /// Compact by default; pretty multi-line when using the alternate flag (`{:#}`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Observation count per series — summary")?;
            writeln!(f, "--------------------------------------")?;
            writeln!(f, "min    : {}", self.min)?;
            writeln!(f, "p25    : {}", self.p25)?;
            writeln!(f, "median : {}", self.median)?;
            writeln!(f, "p95    : {}", self.p95)?;
            write!(f, "max    : {}", self.max)
        } else {
            write!(
                f,
                "min={}, p25={}, median={}, p95={}, max={}",
                self.min, self.p25, self.median, self.p95, self.max
            )
        }
    }
}

pub trait SeriesSetFit {
    /// Fit the phenology model on **every series** in the set and collect the
    /// results.
    ///
    /// All series are processed with the same configuration and random number
    /// generator. Errors are isolated: one series failing does not prevent
    /// others from being processed.
    ///
    /// Arguments
    /// -----------------
    /// * `rng`: Random number generator driving the restart perturbations.
    /// * `params`: Fitter configuration shared by all series.
    ///
    /// Return
    /// ----------
    /// * A [`FullFitResult`] mapping each key to either the fitted parameters
    ///   or a per-series error.
    fn fit_all(&self, rng: &mut impl Rng, params: &FitParams) -> FullFitResult;

    /// Count the total number of observations across all series.
    fn total_observations(&self) -> usize;

    /// Return the number of distinct series in the set.
    fn number_of_series(&self) -> usize;

    /// Compute distribution statistics for the number of observations per
    /// series.
    ///
    /// Return
    /// ----------
    /// * `None` if the set is empty.
    /// * `Some(ObsCountStats)` containing the summary statistics otherwise.
    fn obs_count_stats(&self) -> Option<ObsCountStats>;
}

impl SeriesSetFit for SeriesSet {
    #[cfg(feature = "progress")]
    fn fit_all(&self, rng: &mut impl Rng, params: &FitParams) -> FullFitResult {
        let pb = ProgressBar::new(self.len().max(1) as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "{bar:40.cyan/blue} {pos}/{len} ({percent:>3}%) | {per_sec} | ETA {eta_precise}",
            )
            .expect("indicatif template"),
        );

        let mut results: FullFitResult = HashMap::default();
        for (key, series) in self.iter() {
            results.insert(key.clone(), fit_phenology(series, rng, params));
            pb.inc(1);
        }

        pb.finish_and_clear();
        results
    }

    #[cfg(not(feature = "progress"))]
    fn fit_all(&self, rng: &mut impl Rng, params: &FitParams) -> FullFitResult {
        // Output map using the same fast hasher as SeriesSet.
        let mut results: FullFitResult = HashMap::default();

        for (key, series) in self.iter() {
            results.insert(key.clone(), fit_phenology(series, rng, params));
        }

        results
    }

    #[inline]
    fn total_observations(&self) -> usize {
        self.values().map(|series| series.len()).sum()
    }

    #[inline]
    fn number_of_series(&self) -> usize {
        self.len()
    }

    fn obs_count_stats(&self) -> Option<ObsCountStats> {
        let mut counts: Vec<usize> = self.values().map(|series| series.len()).collect();
        if counts.is_empty() {
            return None;
        }

        counts.sort_unstable();

        #[inline]
        fn q_index(n: usize, q: f64) -> usize {
            // Nearest-rank on [0, n-1]; robust for small n.
            let pos = q * (n as f64 - 1.0);
            let idx = pos.round() as isize;
            idx.clamp(0, (n as isize) - 1) as usize
        }

        let n = counts.len();
        Some(ObsCountStats {
            min: counts[0],
            p25: counts[q_index(n, 0.25)],
            median: counts[q_index(n, 0.50)],
            p95: counts[q_index(n, 0.95)],
            max: counts[n - 1],
        })
    }
}

#[cfg(test)]
mod series_fit_test {
    use super::*;
    use crate::observations::{DataSource, Observation};
    use hifitime::{Epoch, Unit};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seasonal_series(points: usize, amplitude: f64) -> Series {
        let start = Epoch::from_gregorian_utc_at_midnight(2025, 1, 1);
        (0..points)
            .map(|i| {
                let epoch = start + (i as f64 * 14.0) * Unit::Day;
                let day = crate::time::day_of_year(&epoch);
                let index = 0.15
                    + amplitude * ((day / 365.0 - 0.2) * std::f64::consts::PI).sin().max(0.0);
                Observation::new(epoch, index, 0.2, 0.3, DataSource::AwsEarthSearch)
            })
            .collect()
    }

    #[test]
    fn test_fit_all_isolates_failures() {
        let mut set: SeriesSet = HashMap::default();
        set.insert(SeriesKey::Int(1), seasonal_series(24, 0.65));
        set.insert(SeriesKey::Int(2), seasonal_series(2, 0.65));

        let mut rng = StdRng::seed_from_u64(42);
        let params = FitParams::builder().runs(2).build().unwrap();
        let results = set.fit_all(&mut rng, &params);

        assert_eq!(results.len(), 2);
        assert!(results[&SeriesKey::Int(1)].is_ok());
        assert!(results[&SeriesKey::Int(2)].is_err());

        let fit = fit_result_for(&results, &SeriesKey::Int(1)).unwrap().unwrap();
        assert!(fit.mx > fit.mn);
        assert!(fit_result_for(&results, &SeriesKey::Int(2)).is_err());
        assert_eq!(fit_result_for(&results, &SeriesKey::Int(3)), Ok(None));
    }

    #[test]
    fn test_fit_summary_scan() {
        let mut set: SeriesSet = HashMap::default();
        set.insert(SeriesKey::Int(1), seasonal_series(24, 0.65));
        set.insert(SeriesKey::Int(2), seasonal_series(3, 0.65));

        let mut rng = StdRng::seed_from_u64(42);
        let params = FitParams::default();
        let results = set.fit_all(&mut rng, &params);

        let summary = FitSummary::scan(&results, params.good_rmse);
        assert_eq!(summary.total(), 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.good + summary.poor, 1);
        assert_eq!(format!("{summary}"), format!("good={}, poor={}, skipped=1", summary.good, summary.poor));
    }

    #[test]
    fn test_obs_count_stats() {
        let mut set: SeriesSet = HashMap::default();
        for (i, n) in [2usize, 4, 8, 15, 20].iter().enumerate() {
            set.insert(SeriesKey::Int(i as u32), seasonal_series(*n, 0.65));
        }

        let stats = set.obs_count_stats().unwrap();
        assert_eq!(stats.min, 2);
        assert_eq!(stats.median, 8);
        assert_eq!(stats.max, 20);
        assert_eq!(set.total_observations(), 49);
        assert_eq!(set.number_of_series(), 5);

        let empty: SeriesSet = HashMap::default();
        assert!(empty.obs_count_stats().is_none());
    }
}
