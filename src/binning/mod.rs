//! Adaptive temperature bin selection.
//!
//! Starts from seven fixed temperature ranges and merges adjacent ranges that
//! hold fewer than a minimum number of baseline observations, giving every
//! account its own set of spline knots.
//!
//! # Example
//!
//! ```
//! use towt::binning::DynamicBinSelector;
//!
//! // 20 readings in each of the seven initial ranges
//! let temps: Vec<f64> = [20.0, 40.0, 50.0, 60.0, 70.0, 80.0, 95.0]
//!     .iter()
//!     .flat_map(|&t| std::iter::repeat(t).take(20))
//!     .collect();
//!
//! let cuts = DynamicBinSelector::new(20).select_for_account(temps).unwrap();
//! assert_eq!(cuts.max_bin(), 7);
//! assert_eq!(cuts.knots(), vec![30.0, 45.0, 55.0, 65.0, 75.0, 90.0]);
//! ```

mod cutpoints;
mod initial;
mod merge;

pub use cutpoints::{Cutpoints, FinalBin};
pub use initial::{
    aggregate_bins, aggregate_by_account, initial_bin_index, BinAggregate, INITIAL_BIN_COUNT,
    INITIAL_EDGES,
};
pub use merge::{anchor_positions, downward_pass, group_bins, upward_pass};

use crate::core::Observation;
use crate::error::{Result, TowtError};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Default minimum baseline observations per final bin.
pub const DEFAULT_MIN_COUNT: usize = 20;

/// Selects per-account temperature cutpoints from baseline observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DynamicBinSelector {
    min_count: usize,
}

impl Default for DynamicBinSelector {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_COUNT)
    }
}

impl DynamicBinSelector {
    pub fn new(min_count: usize) -> Self {
        Self { min_count }
    }

    pub fn min_count(&self) -> usize {
        self.min_count
    }

    /// Cutpoints for every account with baseline rows in `observations`.
    ///
    /// Treatment rows are ignored.
    pub fn select(&self, observations: &[Observation]) -> Result<BTreeMap<String, Cutpoints>> {
        let rows = observations
            .iter()
            .filter(|o| o.is_baseline())
            .map(|o| (o.account.as_str(), o.temperature));

        aggregate_by_account(rows)
            .into_iter()
            .map(|(account, bins)| {
                let cuts = self.resolve(bins).inspect_err(|e| {
                    warn!(account = %account, error = %e, "bin selection failed");
                })?;
                Ok((account, cuts))
            })
            .collect()
    }

    /// Cutpoints for a single account's baseline temperatures.
    pub fn select_for_account<I>(&self, temperatures: I) -> Result<Cutpoints>
    where
        I: IntoIterator<Item = f64>,
    {
        self.resolve(aggregate_bins(temperatures))
    }

    /// Run both merge passes over a full 7-bin sequence and group the result.
    pub fn resolve(&self, bins: Vec<BinAggregate>) -> Result<Cutpoints> {
        if bins.len() != INITIAL_BIN_COUNT {
            return Err(TowtError::DimensionMismatch {
                expected: INITIAL_BIN_COUNT,
                got: bins.len(),
            });
        }

        let total: usize = bins.iter().map(|b| b.count).sum();
        if total == 0 {
            return Err(TowtError::InsufficientData { needed: 1, got: 0 });
        }

        let merged = downward_pass(&upward_pass(&bins, self.min_count), self.min_count);
        let groups = group_bins(&merged);

        if groups.is_empty() {
            warn!(
                total,
                min_count = self.min_count,
                "no temperature bin reaches the minimum count; using a single bin"
            );
            return Ok(Cutpoints::full_range(total));
        }

        debug!(
            bins = groups.len(),
            total,
            min_count = self.min_count,
            "selected temperature bins"
        );
        Ok(Cutpoints::from_bins(groups))
    }
}
