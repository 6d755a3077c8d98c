//! # Observations and series plumbing
//!
//! This module defines the [`Observation`] value object consumed by the
//! phenology fitter and the series comparator, the [`DataSource`] catalogue of
//! imagery providers, the [`SeriesKey`] identifier for a fitted unit, and the
//! [`SeriesExt`] extension trait that prepares a raw [`Series`] for fitting.
//!
//! ## Overview
//!
//! Observations are immutable once produced: a data-acquisition collaborator
//! creates them, the core only reads them. The fitter expects a cleaned,
//! date-ordered series with one value per calendar day; [`SeriesExt::dedup_daily`]
//! performs that aggregation by averaging same-date repeats.

use std::collections::HashMap;
use std::fmt;

use ahash::RandomState;
use hifitime::Epoch;
use serde::{Deserialize, Serialize};

use crate::constants::{DayOfYear, IndexValue, Reflectance, Series};
use crate::time::{calendar_date, day_of_year};

/// Catalogue of imagery providers an observation can originate from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataSource {
    AwsEarthSearch,
    PlanetaryComputer,
    CopernicusDataSpace,
    NasaEarthdataHls,
    GoogleEarthEngine,
}

impl DataSource {
    /// Human-readable provider name.
    pub fn label(&self) -> &'static str {
        match self {
            DataSource::AwsEarthSearch => "AWS Earth Search",
            DataSource::PlanetaryComputer => "Planetary Computer",
            DataSource::CopernicusDataSpace => "Copernicus Data Space",
            DataSource::NasaEarthdataHls => "NASA Earthdata HLS",
            DataSource::GoogleEarthEngine => "Google Earth Engine",
        }
    }

    /// Whether the provider can serve per-pixel reflectances.
    pub fn supports_pixels(&self) -> bool {
        !matches!(self, DataSource::CopernicusDataSpace)
    }

    /// Whether the provider requires credentials.
    pub fn requires_auth(&self) -> bool {
        matches!(
            self,
            DataSource::CopernicusDataSpace
                | DataSource::NasaEarthdataHls
                | DataSource::GoogleEarthEngine
        )
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Identifier of a fitted unit (a pixel, a field, an area of interest).
///
/// This can be:
/// - A numeric id (e.g. a pixel index)
/// - A string label (e.g. a field name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SeriesKey {
    /// Integer-based identifier
    Int(u32),
    /// String-based identifier
    String(String),
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesKey::Int(n) => write!(f, "{n}"),
            SeriesKey::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<u32> for SeriesKey {
    fn from(n: u32) -> Self {
        SeriesKey::Int(n)
    }
}

impl From<String> for SeriesKey {
    fn from(s: String) -> Self {
        SeriesKey::String(s)
    }
}

impl From<&str> for SeriesKey {
    fn from(s: &str) -> Self {
        SeriesKey::String(s.to_string())
    }
}

/// A single vegetation-index observation.
///
/// # Fields
///
/// * `epoch` - The observation date
/// * `index` - The vegetation index value (NDVI)
/// * `red` - The red band reflectance the index was derived from
/// * `nir` - The near-infrared band reflectance the index was derived from
/// * `source` - The imagery provider the observation came from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub epoch: Epoch,
    pub index: IndexValue,
    pub red: Reflectance,
    pub nir: Reflectance,
    pub source: DataSource,
}

impl Observation {
    /// Create a new observation
    ///
    /// Arguments
    /// ---------
    /// * `epoch`: the observation date
    /// * `index`: the vegetation index value
    /// * `red`: the red band reflectance
    /// * `nir`: the near-infrared band reflectance
    /// * `source`: the imagery provider
    ///
    /// Return
    /// ------
    /// * a new Observation struct
    pub fn new(
        epoch: Epoch,
        index: IndexValue,
        red: Reflectance,
        nir: Reflectance,
        source: DataSource,
    ) -> Self {
        Observation {
            epoch,
            index,
            red,
            nir,
            source,
        }
    }

    /// Create an observation directly from its band reflectances, computing
    /// the NDVI value on the fly.
    pub fn from_bands(epoch: Epoch, red: Reflectance, nir: Reflectance, source: DataSource) -> Self {
        Observation {
            epoch,
            index: crate::index_math::ndvi(nir, red),
            red,
            nir,
            source,
        }
    }

    /// Day of year (1-based) of this observation.
    pub fn day_of_year(&self) -> DayOfYear {
        day_of_year(&self.epoch)
    }

    /// Calendar date used as the pairing/aggregation key.
    pub(crate) fn date_key(&self) -> (i32, u8, u8) {
        calendar_date(&self.epoch)
    }
}

/// Series preparation helpers for the fitter and the comparator.
pub trait SeriesExt {
    /// Sort the series in place by observation epoch.
    fn sort_by_epoch(&mut self);

    /// Collapse same-date repeats into one observation per calendar day.
    ///
    /// Repeats are averaged on the index value; the band reflectances and
    /// source of the first observation of each day are kept. The result is
    /// sorted by epoch.
    ///
    /// Return
    /// ------
    /// * a new, date-ordered series with at most one observation per day
    fn dedup_daily(&self) -> Series;

    /// The index values of the series, in series order.
    fn index_values(&self) -> Vec<IndexValue>;
}

impl SeriesExt for Series {
    fn sort_by_epoch(&mut self) {
        self.sort_by(|a, b| a.epoch.cmp(&b.epoch));
    }

    fn dedup_daily(&self) -> Series {
        // Accumulate (first observation, index sum, count) per calendar day.
        let mut by_day: HashMap<(i32, u8, u8), (Observation, f64, usize), RandomState> =
            HashMap::default();
        for obs in self {
            by_day
                .entry(obs.date_key())
                .and_modify(|(_, sum, count)| {
                    *sum += obs.index;
                    *count += 1;
                })
                .or_insert((*obs, obs.index, 1));
        }

        let mut out: Series = by_day
            .into_values()
            .map(|(first, sum, count)| Observation {
                index: sum / count as f64,
                ..first
            })
            .collect();
        out.sort_by_epoch();
        out
    }

    fn index_values(&self) -> Vec<IndexValue> {
        self.iter().map(|obs| obs.index).collect()
    }
}

#[cfg(test)]
mod observations_test {
    use super::*;
    use smallvec::smallvec;

    fn obs(day: u8, index: f64) -> Observation {
        Observation::new(
            Epoch::from_gregorian_utc_at_midnight(2025, 4, day),
            index,
            0.2,
            0.3,
            DataSource::AwsEarthSearch,
        )
    }

    #[test]
    fn test_dedup_daily_averages_same_date_repeats() {
        let series: Series = smallvec![obs(2, 0.4), obs(1, 0.2), obs(2, 0.6), obs(3, 0.5)];
        let daily = series.dedup_daily();

        assert_eq!(daily.len(), 3);
        assert_eq!(daily[0].index, 0.2);
        assert_eq!(daily[1].index, 0.5);
        assert_eq!(daily[2].index, 0.5);
        assert!(daily[0].epoch < daily[1].epoch && daily[1].epoch < daily[2].epoch);
    }

    #[test]
    fn test_dedup_daily_keeps_first_observation_bands() {
        let mut late = obs(7, 0.8);
        late.red = 0.9;
        let series: Series = smallvec![obs(7, 0.4), late];
        let daily = series.dedup_daily();

        assert_eq!(daily.len(), 1);
        assert!((daily[0].index - 0.6).abs() < 1e-15);
        assert_eq!(daily[0].red, 0.2);
    }

    #[test]
    fn test_from_bands_computes_ndvi() {
        let o = Observation::from_bands(
            Epoch::from_gregorian_utc_at_midnight(2025, 4, 1),
            0.1,
            0.5,
            DataSource::PlanetaryComputer,
        );
        assert!((o.index - 0.4 / 0.6).abs() < 1e-15);
    }

    #[test]
    fn test_series_key_display_and_from() {
        assert_eq!(SeriesKey::from(42u32).to_string(), "42");
        assert_eq!(SeriesKey::from("field-a").to_string(), "field-a");
    }

    #[test]
    fn test_source_capabilities() {
        assert!(DataSource::AwsEarthSearch.supports_pixels());
        assert!(!DataSource::AwsEarthSearch.requires_auth());
        assert!(!DataSource::CopernicusDataSpace.supports_pixels());
        assert!(DataSource::GoogleEarthEngine.requires_auth());
    }
}
