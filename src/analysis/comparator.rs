//! Ranking and pairwise significance.
//!
//! Two candidates differ significantly only when their 95% confidence
//! intervals do not overlap. A faster point estimate alone is never enough to
//! declare a winner.

use std::collections::BTreeMap;

use crate::result::CandidateResult;
use crate::statistics::Stats;

/// Ranked results plus the fastest and slowest tie-sets.
#[derive(Debug, Clone)]
pub struct Ranking {
    /// Results ordered by rank (fastest first).
    pub results: Vec<CandidateResult>,
    /// Rank 1 alone if it beats rank 2 significantly, else every candidate
    /// indistinguishable from rank 1.
    pub fastest: Vec<String>,
    /// Last rank alone if the second-to-last beats it significantly, else every
    /// candidate indistinguishable from the last rank.
    pub slowest: Vec<String>,
}

/// Whether the confidence intervals `[mean ± moe]` of `a` and `b` overlap.
///
/// Touching intervals overlap. An unbounded margin overlaps everything.
pub fn intervals_overlap(a: &Stats, b: &Stats) -> bool {
    if !a.is_bounded() || !b.is_bounded() {
        return true;
    }
    let (a_lo, a_hi) = a.interval();
    let (b_lo, b_hi) = b.interval();
    a_lo <= b_hi && b_lo <= a_hi
}

/// Whether `a` and `b` are statistically distinguishable.
pub fn significantly_different(a: &Stats, b: &Stats) -> bool {
    !intervals_overlap(a, b)
}

/// Rank candidates by mean rate, descending.
///
/// `entries` must be in registration order: the sort is stable, so equal
/// rates keep that order.
pub fn rank(entries: Vec<(String, Stats)>) -> Ranking {
    let mut entries = entries;
    entries.sort_by(|(_, a), (_, b)| b.mean_rate.total_cmp(&a.mean_rate));

    let results: Vec<CandidateResult> = entries
        .iter()
        .enumerate()
        .map(|(i, (name, stats))| {
            let significantly_different_from: BTreeMap<String, bool> = entries
                .iter()
                .filter(|(other, _)| other != name)
                .map(|(other, other_stats)| {
                    (other.clone(), significantly_different(stats, other_stats))
                })
                .collect();

            CandidateResult {
                name: name.clone(),
                stats: *stats,
                rank: i + 1,
                significantly_different_from,
            }
        })
        .collect();

    let fastest = tie_set(&results, results.first(), results.get(1));
    let slowest = tie_set(
        &results,
        results.last(),
        results.len().checked_sub(2).and_then(|i| results.get(i)),
    );

    Ranking {
        results,
        fastest,
        slowest,
    }
}

/// The anchor alone if it is distinguishable from its neighbour, otherwise
/// every result indistinguishable from the anchor, in rank order.
fn tie_set(
    results: &[CandidateResult],
    anchor: Option<&CandidateResult>,
    neighbour: Option<&CandidateResult>,
) -> Vec<String> {
    let Some(anchor) = anchor else {
        return Vec::new();
    };
    match neighbour {
        Some(n) if significantly_different(&anchor.stats, &n.stats) => vec![anchor.name.clone()],
        Some(_) => results
            .iter()
            .filter(|r| r.name == anchor.name || !significantly_different(&anchor.stats, &r.stats))
            .map(|r| r.name.clone())
            .collect(),
        None => vec![anchor.name.clone()],
    }
}
