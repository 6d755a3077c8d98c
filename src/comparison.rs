//! # Paired-series agreement statistics
//!
//! Quantify the agreement between two observation series assumed to represent
//! the same physical quantity from different imagery providers. Observations
//! are paired by calendar date; the paired samples yield bias, RMSE, and R².
//!
//! R² is computed with **series B as the reference**: the residual sum of
//! squares compares A against B while the total sum of squares uses B's own
//! variance. Bias and RMSE treat the pair symmetrically. This asymmetry is
//! intentional — B plays the role of the baseline source.

use std::collections::HashMap;
use std::fmt;

use ahash::RandomState;
use serde::{Deserialize, Serialize};

use crate::constants::{IndexValue, Series, MIN_PAIRED_SAMPLES, SS_TOT_FLOOR};
use crate::greenwave_errors::GreenwaveError;
use crate::observations::DataSource;

/// Agreement statistics between two date-paired observation series.
///
/// Fields
/// -----------------
/// * `source_a`, `source_b` – providers of the two compared series.
/// * `bias` – mean of `valueA - valueB` over the paired samples.
/// * `rmse` – root-mean-square of the paired differences.
/// * `r2` – coefficient of determination with B as reference, clamped to `[-1, 1]`.
/// * `sample_count` – number of date-matched pairs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesComparison {
    pub source_a: DataSource,
    pub source_b: DataSource,
    pub bias: f64,
    pub rmse: f64,
    pub r2: f64,
    pub sample_count: usize,
}

impl fmt::Display for SeriesComparison {
    /// Compact by default; pretty multi-line when using the alternate flag (`{:#}`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "{} vs {}", self.source_a, self.source_b)?;
            writeln!(f, "-------------------------------")?;
            writeln!(f, "bias    : {:+.4}", self.bias)?;
            writeln!(f, "rmse    : {:.4}", self.rmse)?;
            writeln!(f, "r2      : {:.4}", self.r2)?;
            write!(f, "samples : {}", self.sample_count)
        } else {
            write!(
                f,
                "{} vs {}: bias={:+.4}, rmse={:.4}, r2={:.4}, n={}",
                self.source_a, self.source_b, self.bias, self.rmse, self.r2, self.sample_count
            )
        }
    }
}

/// Compare two observation series by pairing them on calendar date.
///
/// Pairing builds a lookup from series B keyed by date; every observation of
/// series A with a same-date partner contributes one `(valueA, valueB)` pair.
/// Should B carry several observations on one date, the last one wins the
/// lookup slot.
///
/// The reported source identifiers are taken from the first element of each
/// input series; both series are assumed internally homogeneous in source.
///
/// Arguments
/// -----------------
/// * `a`: the compared series.
/// * `b`: the reference series (denominator of R² uses B's variance).
///
/// Return
/// ----------
/// * `Ok(SeriesComparison)` – paired-sample statistics.
/// * `Err(GreenwaveError::EmptySeries)` – either input series is empty.
/// * `Err(GreenwaveError::InsufficientOverlap)` – fewer than 5 date-matched
///   pairs; below this the statistics are considered unreliable.
pub fn compare_series(a: &Series, b: &Series) -> Result<SeriesComparison, GreenwaveError> {
    if a.is_empty() || b.is_empty() {
        return Err(GreenwaveError::EmptySeries);
    }

    let by_date: HashMap<(i32, u8, u8), IndexValue, RandomState> =
        b.iter().map(|obs| (obs.date_key(), obs.index)).collect();

    let pairs: Vec<(IndexValue, IndexValue)> = a
        .iter()
        .filter_map(|obs| by_date.get(&obs.date_key()).map(|vb| (obs.index, *vb)))
        .collect();

    if pairs.len() < MIN_PAIRED_SAMPLES {
        return Err(GreenwaveError::InsufficientOverlap {
            required: MIN_PAIRED_SAMPLES,
            actual: pairs.len(),
        });
    }

    let n = pairs.len() as f64;
    let bias = pairs.iter().map(|(va, vb)| va - vb).sum::<f64>() / n;
    let rmse = (pairs.iter().map(|(va, vb)| (va - vb).powi(2)).sum::<f64>() / n).sqrt();

    // R² with B as reference.
    let mean_b = pairs.iter().map(|(_, vb)| vb).sum::<f64>() / n;
    let ss_res: f64 = pairs.iter().map(|(va, vb)| (vb - va).powi(2)).sum();
    let ss_tot = pairs
        .iter()
        .map(|(_, vb)| (vb - mean_b).powi(2))
        .sum::<f64>()
        .max(SS_TOT_FLOOR);
    let r2 = (1.0 - ss_res / ss_tot).clamp(-1.0, 1.0);

    Ok(SeriesComparison {
        source_a: a[0].source,
        source_b: b[0].source,
        bias,
        rmse,
        r2,
        sample_count: pairs.len(),
    })
}
