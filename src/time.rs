use hifitime::{Epoch, Unit};

use crate::constants::DayOfYear;

/// Day of year (1-based) of an epoch, using the UTC Gregorian calendar.
///
/// January 1st maps to `1.0`, December 31st to `365.0` (`366.0` on leap
/// years). Intra-day time is discarded: every timestamp of a given calendar
/// day maps to the same integral value.
///
/// Argument
/// --------
/// * `epoch`: the observation epoch
///
/// Return
/// ------
/// * the day of year as a float
pub fn day_of_year(epoch: &Epoch) -> DayOfYear {
    let (year, _, _, _, _, _, _) = epoch.to_gregorian_utc();
    let jan1 = Epoch::from_gregorian_utc_at_midnight(year, 1, 1);
    (*epoch - jan1).to_unit(Unit::Day).floor() + 1.0
}

/// Calendar date `(year, month, day)` of an epoch in UTC.
///
/// Used as the pairing key when matching two observation series by date.
pub fn calendar_date(epoch: &Epoch) -> (i32, u8, u8) {
    let (year, month, day, _, _, _, _) = epoch.to_gregorian_utc();
    (year, month, day)
}
