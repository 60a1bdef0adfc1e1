//! Final (merged) temperature bins for one account.

/// A contiguous run of initial bins after merging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinalBin {
    /// Dense 1-based index in ascending temperature order.
    pub index: usize,
    pub lower: f64,
    pub upper: f64,
    /// Baseline observations in the merged range. Diagnostic only.
    pub count: usize,
}

impl FinalBin {
    /// Width of the bin; infinite for the open-ended bins.
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn contains(&self, temperature: f64) -> bool {
        temperature > self.lower && temperature <= self.upper
    }
}

/// Account-specific temperature cutpoints produced by the bin selector.
///
/// Bins are contiguous, non-overlapping and jointly cover `(-inf, inf)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Cutpoints {
    bins: Vec<FinalBin>,
}

impl Cutpoints {
    /// Wrap an ordered, contiguous sequence of final bins.
    ///
    /// Callers inside the crate guarantee the coverage invariant.
    pub(crate) fn from_bins(bins: Vec<FinalBin>) -> Self {
        debug_assert!(!bins.is_empty());
        debug_assert!(bins.windows(2).all(|w| w[0].upper == w[1].lower));
        Self { bins }
    }

    /// A single bin spanning every temperature.
    pub fn full_range(count: usize) -> Self {
        Self {
            bins: vec![FinalBin {
                index: 1,
                lower: f64::NEG_INFINITY,
                upper: f64::INFINITY,
                count,
            }],
        }
    }

    pub fn bins(&self) -> &[FinalBin] {
        &self.bins
    }

    /// Number of final bins (`K`).
    pub fn max_bin(&self) -> usize {
        self.bins.len()
    }

    /// Bin by 1-based index.
    pub fn bin(&self, index: usize) -> Option<&FinalBin> {
        index.checked_sub(1).and_then(|i| self.bins.get(i))
    }

    /// Interior knots: every upper bound except the last.
    pub fn knots(&self) -> Vec<f64> {
        self.bins
            .iter()
            .take(self.bins.len().saturating_sub(1))
            .map(|b| b.upper)
            .collect()
    }

    /// Sum of the diagnostic counts.
    pub fn total_count(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }
}
