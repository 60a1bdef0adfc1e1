//! Property-based tests for bin selection and the temperature splines.
//!
//! These tests verify invariants that should hold for any set of baseline
//! temperatures and any minimum bin count.

use towt::binning::{Cutpoints, DynamicBinSelector};
use towt::spline::{DynamicSpline, StaticSpline, TemperatureSpline};
use proptest::prelude::*;

/// Temperatures in a realistic outdoor range.
fn temperatures_strategy(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-20.0..115.0_f64, 1..max_len)
}

/// Temperatures clustered into a few narrow ranges, which forces merging.
fn clustered_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec((0usize..7, 0.0..5.0_f64), 1..200).prop_map(|pairs| {
        let centers = [20.0, 40.0, 50.0, 60.0, 70.0, 80.0, 95.0];
        pairs.into_iter().map(|(i, off)| centers[i] + off).collect()
    })
}

fn assert_partition(cuts: &Cutpoints) -> Result<(), TestCaseError> {
    let bins = cuts.bins();
    prop_assert!(!bins.is_empty());
    prop_assert_eq!(bins[0].lower, f64::NEG_INFINITY);
    prop_assert_eq!(bins[bins.len() - 1].upper, f64::INFINITY);
    for (i, bin) in bins.iter().enumerate() {
        prop_assert_eq!(bin.index, i + 1);
        prop_assert!(bin.lower < bin.upper);
    }
    for pair in bins.windows(2) {
        prop_assert_eq!(pair[0].upper, pair[1].lower);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Final bins partition the real line with dense 1-based indices.
    #[test]
    fn bins_partition_the_real_line(temps in temperatures_strategy(300), min in 1usize..40) {
        let cuts = DynamicBinSelector::new(min).select_for_account(temps.clone()).unwrap();
        assert_partition(&cuts)?;
        prop_assert_eq!(cuts.total_count(), temps.len());
    }

    /// Either every bin meets the threshold or there is exactly one bin.
    #[test]
    fn bins_meet_the_threshold(temps in clustered_strategy(), min in 1usize..40) {
        let cuts = DynamicBinSelector::new(min).select_for_account(temps).unwrap();
        if cuts.max_bin() > 1 {
            for bin in cuts.bins() {
                prop_assert!(bin.count >= min, "bin {:?} below {}", bin, min);
            }
        }
    }

    /// Every temperature falls in exactly one final bin.
    #[test]
    fn each_temperature_has_one_bin(temps in temperatures_strategy(100), temp in -50.0..150.0_f64) {
        let cuts = DynamicBinSelector::new(10).select_for_account(temps).unwrap();
        let hits = cuts.bins().iter().filter(|b| b.contains(temp)).count();
        prop_assert_eq!(hits, 1);
    }

    #[test]
    fn selection_is_deterministic(temps in clustered_strategy(), min in 1usize..30) {
        let selector = DynamicBinSelector::new(min);
        let first = selector.select_for_account(temps.clone()).unwrap();
        let second = selector.select_for_account(temps).unwrap();
        prop_assert_eq!(first, second);
    }

    /// The dynamic basis sum has no jump at any knot.
    #[test]
    fn dynamic_basis_is_continuous(temps in clustered_strategy(), min in 1usize..20) {
        let cuts = DynamicBinSelector::new(min).select_for_account(temps).unwrap();
        let spline = DynamicSpline::new(cuts);
        let sum = |t: f64| -> f64 { spline.basis(t).iter().sum() };
        for knot in spline.cutpoints().knots() {
            let eps = 1e-7;
            prop_assert!((sum(knot - eps) - sum(knot + eps)).abs() < 1e-5);
        }
    }

    /// Below the top bin the dynamic basis sums back to the temperature.
    #[test]
    fn dynamic_basis_is_identity_below_top_knot(temps in clustered_strategy(), t in -20.0..115.0_f64) {
        let cuts = DynamicBinSelector::new(5).select_for_account(temps).unwrap();
        let spline = DynamicSpline::new(cuts);
        let sum: f64 = spline.basis(t).iter().sum();
        match spline.cutpoints().knots().last() {
            Some(&top) if t <= top => prop_assert!((sum - t).abs() < 1e-9),
            Some(&top) => prop_assert!((sum - top).abs() < 1e-9),
            None => prop_assert!(spline.basis(t).is_empty()),
        }
    }

    #[test]
    fn static_basis_sums_to_temperature(t in -40.0..130.0_f64) {
        let basis = StaticSpline.basis(t);
        prop_assert_eq!(basis.len(), 4);
        let sum: f64 = basis.iter().sum();
        prop_assert!((sum - t).abs() < 1e-9);
    }
}
