//! Fixed initial temperature bins and per-account bin aggregates.

use std::collections::BTreeMap;

/// Number of fixed initial bins.
pub const INITIAL_BIN_COUNT: usize = 7;

/// Boundaries of the initial bins. Bin `b` (1-based) covers
/// `(INITIAL_EDGES[b - 1], INITIAL_EDGES[b]]`.
pub const INITIAL_EDGES: [f64; INITIAL_BIN_COUNT + 1] = [
    f64::NEG_INFINITY,
    30.0,
    45.0,
    55.0,
    65.0,
    75.0,
    90.0,
    f64::INFINITY,
];

/// 1-based index of the initial bin containing `temperature`.
///
/// Intervals are closed on the right, so 30.0 falls in bin 1 and 30.5 in bin 2.
/// NaN temperatures have no bin.
pub fn initial_bin_index(temperature: f64) -> Option<usize> {
    if temperature.is_nan() {
        return None;
    }
    (1..=INITIAL_BIN_COUNT).find(|&b| temperature <= INITIAL_EDGES[b])
}

/// Count and bounds for one initial bin of one account.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinAggregate {
    /// 1-based initial bin index.
    pub index: usize,
    /// Baseline observations in the bin (after any merging so far).
    pub count: usize,
    pub lower: f64,
    pub upper: f64,
    /// Count was pushed into the next bin up.
    pub absorbed_up: bool,
    /// Count was pushed into the next bin down.
    pub absorbed_down: bool,
}

impl BinAggregate {
    fn empty(index: usize) -> Self {
        Self {
            index,
            count: 0,
            lower: INITIAL_EDGES[index - 1],
            upper: INITIAL_EDGES[index],
            absorbed_up: false,
            absorbed_down: false,
        }
    }

    /// Whether the bin was merged into a neighbor by either pass.
    pub fn is_absorbed(&self) -> bool {
        self.absorbed_up || self.absorbed_down
    }
}

/// Build the complete 7-bin aggregate sequence for one account.
///
/// Every bin index is present, with a zero count where no temperature fell.
pub fn aggregate_bins<I>(temperatures: I) -> Vec<BinAggregate>
where
    I: IntoIterator<Item = f64>,
{
    let mut bins: Vec<BinAggregate> = (1..=INITIAL_BIN_COUNT).map(BinAggregate::empty).collect();
    for t in temperatures {
        if let Some(b) = initial_bin_index(t) {
            bins[b - 1].count += 1;
        }
    }
    bins
}

/// Aggregate initial bins for several accounts at once, keyed by account id.
pub fn aggregate_by_account<'a, I>(rows: I) -> BTreeMap<String, Vec<BinAggregate>>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut out: BTreeMap<String, Vec<BinAggregate>> = BTreeMap::new();
    for (account, t) in rows {
        let bins = out
            .entry(account.to_string())
            .or_insert_with(|| aggregate_bins(std::iter::empty()));
        if let Some(b) = initial_bin_index(t) {
            bins[b - 1].count += 1;
        }
    }
    out
}
