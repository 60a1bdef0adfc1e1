//! Fixed-knot temperature spline.

use super::TemperatureSpline;

/// Knots of the static spline.
pub const STATIC_KNOTS: [f64; 3] = [50.0, 60.0, 70.0];

/// Spline with knots at 50, 60 and 70 degrees and four basis columns:
/// below 50, the 50-60 increment, the 60-70 increment and the excess over 70.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StaticSpline;

impl TemperatureSpline for StaticSpline {
    fn column_names(&self) -> Vec<String> {
        (0..=STATIC_KNOTS.len()).map(|i| format!("bin_{}", i)).collect()
    }

    fn num_columns(&self) -> usize {
        STATIC_KNOTS.len() + 1
    }

    fn basis(&self, t: f64) -> Vec<f64> {
        let [k1, k2, k3] = STATIC_KNOTS;
        vec![
            t.min(k1),
            if t >= k1 { (k2 - k1).min(t - k1) } else { 0.0 },
            if t >= k2 { (k3 - k2).min(t - k2) } else { 0.0 },
            (t - k3).max(0.0),
        ]
    }
}
