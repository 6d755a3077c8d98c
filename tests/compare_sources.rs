use greenwave::phenology::FitParams;
use greenwave::{
    compare_series, DataSource, FitSummary, GreenwaveError, Observation, Series, SeriesKey,
    SeriesSet, SeriesSetFit,
};

use hifitime::{Epoch, Unit};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn seasonal_series(points: usize, peak: f64, source: DataSource) -> Series {
    let start = Epoch::from_gregorian_utc_at_midnight(2025, 1, 1);
    (0..points)
        .map(|i| {
            let epoch = start + (i as f64 * 10.0) * Unit::Day;
            let day = greenwave::time::day_of_year(&epoch);
            let index = 0.15 + peak * ((day / 365.0 - 0.2) * std::f64::consts::PI).sin().max(0.0);
            Observation::new(epoch, index, 0.2, 0.3, source)
        })
        .collect()
}

#[test]
fn test_compare_two_providers_of_same_scene() {
    // Same sampling dates, slightly different peak amplitude: small bias,
    // strong agreement.
    let a = seasonal_series(20, 0.65, DataSource::AwsEarthSearch);
    let b = seasonal_series(20, 0.62, DataSource::PlanetaryComputer);

    let cmp = compare_series(&a, &b).unwrap();
    assert_eq!(cmp.sample_count, 20);
    assert_eq!(cmp.source_a, DataSource::AwsEarthSearch);
    assert_eq!(cmp.source_b, DataSource::PlanetaryComputer);
    assert!(cmp.bias > 0.0, "A has the larger amplitude");
    assert!(cmp.rmse < 0.05);
    assert!(cmp.r2 > 0.9);
    assert!((-1.0..=1.0).contains(&cmp.r2));
}

#[test]
fn test_compare_no_overlap() {
    let a = seasonal_series(10, 0.65, DataSource::AwsEarthSearch);
    let mut b = seasonal_series(10, 0.65, DataSource::PlanetaryComputer);
    for obs in b.iter_mut() {
        obs.epoch += 5.0 * Unit::Day;
    }

    assert_eq!(
        compare_series(&a, &b),
        Err(GreenwaveError::InsufficientOverlap {
            required: 5,
            actual: 0
        })
    );
}

#[test]
fn test_compare_partial_overlap_counts_pairs_only() {
    let a = seasonal_series(20, 0.65, DataSource::AwsEarthSearch);
    // Same grid but shifted by 3 samples: 17 shared dates.
    let start = Epoch::from_gregorian_utc_at_midnight(2025, 1, 1);
    let b: Series = (3..20)
        .map(|i| {
            let epoch = start + (i as f64 * 10.0) * Unit::Day;
            Observation::new(epoch, 0.4, 0.2, 0.3, DataSource::PlanetaryComputer)
        })
        .collect();

    let cmp = compare_series(&a, &b).unwrap();
    assert_eq!(cmp.sample_count, 17);
}

#[test]
fn test_batch_fit_and_summary() {
    let mut set: SeriesSet = SeriesSet::default();
    set.insert(
        SeriesKey::from("field-a"),
        seasonal_series(30, 0.65, DataSource::AwsEarthSearch),
    );
    set.insert(
        SeriesKey::from("field-b"),
        seasonal_series(30, 0.45, DataSource::AwsEarthSearch),
    );
    // Too short to fit, must be skipped rather than aborting the batch.
    set.insert(
        SeriesKey::from("field-c"),
        seasonal_series(2, 0.65, DataSource::AwsEarthSearch),
    );

    let mut rng = StdRng::seed_from_u64(42);
    let params = FitParams::builder().runs(4).build().unwrap();
    let results = set.fit_all(&mut rng, &params);

    assert_eq!(results.len(), 3);
    assert!(results[&SeriesKey::from("field-a")].is_ok());
    assert!(results[&SeriesKey::from("field-b")].is_ok());
    assert!(results[&SeriesKey::from("field-c")].is_err());

    let summary = FitSummary::scan(&results, params.good_rmse);
    assert_eq!(summary.total(), 3);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.good, 2, "clean signals should fit well");

    let stats = set.obs_count_stats().unwrap();
    assert_eq!(stats.min, 2);
    assert_eq!(stats.max, 30);
    assert_eq!(set.total_observations(), 62);
}
