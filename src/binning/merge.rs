//! Merge passes over an account's ordered initial bins.
//!
//! Each pass takes the 7-bin sequence and returns a new one. The upward pass
//! must be fully resolved before the downward pass runs: a bin rescued from
//! below by the upward pass is no longer short when the downward pass reaches
//! it. Counts only move between neighbors and the donor is zeroed, so the
//! account total is conserved and no count can go negative.

use super::cutpoints::FinalBin;
use super::initial::BinAggregate;

/// Push every short bin into the bin above it, lowest bin first.
///
/// A bin that received counts from below is re-tested with the accumulated
/// count when its own turn comes, so shortfalls cascade upward.
pub fn upward_pass(bins: &[BinAggregate], min_count: usize) -> Vec<BinAggregate> {
    let mut out = bins.to_vec();
    for b in 1..out.len() {
        if out[b - 1].count < min_count {
            out[b].count += out[b - 1].count;
            out[b - 1].count = 0;
            out[b - 1].absorbed_up = true;
        }
    }
    out
}

/// Push every short bin into the bin below it, highest bin first.
pub fn downward_pass(bins: &[BinAggregate], min_count: usize) -> Vec<BinAggregate> {
    let mut out = bins.to_vec();
    for b in (0..out.len().saturating_sub(1)).rev() {
        if out[b + 1].count < min_count {
            out[b].count += out[b + 1].count;
            out[b + 1].count = 0;
            out[b + 1].absorbed_down = true;
        }
    }
    out
}

/// Position of the surviving bin each bin belongs to.
///
/// An absorbed bin joins the nearest survivor above it, or the nearest
/// survivor below when nothing above survived. Returns `None` for every
/// position when no bin survived.
pub fn anchor_positions(bins: &[BinAggregate]) -> Vec<Option<usize>> {
    let mut anchors: Vec<Option<usize>> = vec![None; bins.len()];

    let mut above = None;
    for i in (0..bins.len()).rev() {
        if !bins[i].is_absorbed() {
            above = Some(i);
        }
        anchors[i] = above;
    }

    let mut below = None;
    for i in 0..bins.len() {
        if !bins[i].is_absorbed() {
            below = Some(i);
        }
        if anchors[i].is_none() {
            anchors[i] = below;
        }
    }

    anchors
}

/// Collapse merged bins into dense final bins in ascending temperature order.
///
/// Returns an empty vector when no bin survived the merge passes.
pub fn group_bins(bins: &[BinAggregate]) -> Vec<FinalBin> {
    let anchors = anchor_positions(bins);
    let mut groups: Vec<(usize, FinalBin)> = Vec::new();

    for (bin, anchor) in bins.iter().zip(anchors) {
        let Some(anchor) = anchor else {
            continue;
        };
        match groups.iter_mut().find(|(a, _)| *a == anchor) {
            Some((_, group)) => {
                group.lower = group.lower.min(bin.lower);
                group.upper = group.upper.max(bin.upper);
                group.count += bin.count;
            }
            None => groups.push((
                anchor,
                FinalBin {
                    index: 0,
                    lower: bin.lower,
                    upper: bin.upper,
                    count: bin.count,
                },
            )),
        }
    }

    groups.sort_by_key(|(anchor, _)| *anchor);
    groups
        .into_iter()
        .enumerate()
        .map(|(i, (_, mut group))| {
            group.index = i + 1;
            group
        })
        .collect()
}
