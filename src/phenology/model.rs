//! Double-logistic seasonal curve evaluation.

use crate::constants::{DayOfYear, IndexValue};
use crate::phenology::PhenologyParams;

#[inline]
fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Evaluate the double-logistic seasonal curve at a given day of year.
///
/// The curve combines two sigmoid terms:
///
/// ```text
/// spring = sigmoid( rsp * (d - sos))     green-up, rises 0 → 1 near sos
/// autumn = sigmoid(-rau * (d - eos))     senescence, falls 1 → 0 near eos
/// result = mn + (mx - mn) * (spring + autumn - 1)
/// ```
///
/// Away from both transitions `spring + autumn - 1 ≈ 1`, giving the plateau
/// value `mx`; deep in dormancy both terms are small, giving `≈ mn`. The
/// result can exceed `[mn, mx]` slightly where the transitions overlap, which
/// is expected.
///
/// This is a total, pure function: defined for all real inputs, no error
/// conditions, bit-identical output for identical inputs.
///
/// Arguments
/// ---------
/// * `p`: the curve parameters
/// * `day_of_year`: the evaluation point (1–365/366, fractional values allowed)
///
/// Return
/// ------
/// * the modeled index value
pub fn double_logistic(p: &PhenologyParams, day_of_year: DayOfYear) -> IndexValue {
    let spring = sigmoid(p.rsp * (day_of_year - p.sos));
    let autumn = sigmoid(-p.rau * (day_of_year - p.eos));
    p.mn + (p.mx - p.mn) * (spring + autumn - 1.0)
}
