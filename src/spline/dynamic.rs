//! Spline with account-specific knots from the bin selector.

use super::TemperatureSpline;
use crate::binning::Cutpoints;

/// Basis over an account's final bins.
///
/// With `K` final bins there are `K - 1` columns: column 1 is
/// `min(T, upper_1)` and column `b` is the part of `T` that falls inside bin
/// `b`, capped at the bin width. The topmost bin has no column of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicSpline {
    cutpoints: Cutpoints,
}

impl DynamicSpline {
    pub fn new(cutpoints: Cutpoints) -> Self {
        Self { cutpoints }
    }

    pub fn cutpoints(&self) -> &Cutpoints {
        &self.cutpoints
    }
}

impl TemperatureSpline for DynamicSpline {
    fn column_names(&self) -> Vec<String> {
        (1..self.cutpoints.max_bin())
            .map(|b| format!("bin_{}", b))
            .collect()
    }

    fn num_columns(&self) -> usize {
        self.cutpoints.max_bin().saturating_sub(1)
    }

    fn basis(&self, t: f64) -> Vec<f64> {
        let bins = self.cutpoints.bins();
        let mut out = Vec::with_capacity(self.num_columns());
        for (i, bin) in bins.iter().take(self.num_columns()).enumerate() {
            if i == 0 {
                out.push(t.min(bin.upper));
            } else if t >= bin.lower {
                out.push(bin.width().min(t - bin.lower));
            } else {
                out.push(0.0);
            }
        }
        out
    }
}
