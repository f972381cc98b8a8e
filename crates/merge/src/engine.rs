//! Cross-key tournament reduction
//!
//! Consolidates an arbitrary multiset of fragments spanning many keys into
//! exactly one record per key, with the fewest possible merge-policy calls.
//!
//! # Algorithm
//!
//! ```text
//! key1: [a, b, c, d, e]        key2: [x, y]
//!
//! Round 1: pairs (a,b) (c,d) (x,y)     -> ONE batch_merge call
//!          key1: [ab, cd, e]   key2: [xy]
//! Round 2: pairs (ab,cd)               -> ONE batch_merge call
//!          key1: [abcd, e]
//! Round 3: pairs (abcd,e)              -> ONE batch_merge call
//!          key1: [abcde]
//! ```
//!
//! - Pairing is by current list position: `(0,1), (2,3), ...`; an odd
//!   trailing fragment carries over untouched to the next round.
//! - Each round gathers the pairs of ALL keys into one flat batch, so the
//!   number of batch calls is `ceil(log2(max n_k))`, not the sum over keys.
//! - Rounds are strictly sequential: round N pairs the output of round N-1.
//!
//! # Failure handling
//!
//! This is the fail-closed boundary for merge policies. A pair whose merge
//! fails, or every pair of a batch whose result count is wrong, becomes its
//! incoming fragment. Nothing propagates to the caller.

use crate::merger::Merger;
use concord_core::{Record, RecordKey};
use std::collections::HashMap;
use std::sync::Arc;

/// Counters describing one reduction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReduceReport {
    /// Synchronized rounds executed
    pub rounds: usize,
    /// `batch_merge` calls issued (one per round)
    pub batch_calls: usize,
    /// Pairs handed to the policy
    pub pairs_merged: usize,
    /// Pairs that degraded to their incoming fragment
    pub fallbacks: usize,
}

impl ReduceReport {
    /// Fold another report into this one
    pub fn absorb(&mut self, other: ReduceReport) {
        self.rounds += other.rounds;
        self.batch_calls += other.batch_calls;
        self.pairs_merged += other.pairs_merged;
        self.fallbacks += other.fallbacks;
    }
}

/// Number of tournament rounds needed for `n` fragments: `ceil(log2(n))`.
pub fn rounds_for(n: usize) -> usize {
    if n <= 1 {
        0
    } else {
        (usize::BITS - (n - 1).leading_zeros()) as usize
    }
}

/// Group fragments by key, preserving first-seen key order and submission
/// order within each key.
///
/// Fragments whose key cannot be extracted are dropped with a warning; the
/// number dropped is returned alongside the groups.
pub fn group_by_key<T, K>(
    fragments: impl IntoIterator<Item = T>,
    key_of: &(dyn Fn(&T) -> Option<K> + Send + Sync),
) -> (Vec<(K, Vec<T>)>, usize)
where
    T: Record,
    K: RecordKey,
{
    let mut groups: Vec<(K, Vec<T>)> = Vec::new();
    let mut positions: HashMap<K, usize> = HashMap::new();
    let mut dropped = 0;

    for fragment in fragments {
        match key_of(&fragment) {
            Some(key) => match positions.get(&key) {
                Some(&pos) => groups[pos].1.push(fragment),
                None => {
                    positions.insert(key.clone(), groups.len());
                    groups.push((key, vec![fragment]));
                }
            },
            None => {
                dropped += 1;
                tracing::warn!(
                    target: "concord::merge",
                    fragment = ?fragment,
                    "Key extraction failed, dropping fragment"
                );
            }
        }
    }

    (groups, dropped)
}

/// Per-key bookkeeping for one round: pairs contributed and the odd
/// fragment carried over.
struct LanePlan<T> {
    pairs: usize,
    carry: Option<T>,
}

/// Tournament reduction driver bound to one merge policy.
pub struct MergeEngine<T: Record> {
    merger: Arc<dyn Merger<T>>,
}

impl<T: Record> Clone for MergeEngine<T> {
    fn clone(&self) -> Self {
        Self {
            merger: Arc::clone(&self.merger),
        }
    }
}

impl<T: Record> MergeEngine<T> {
    /// Create an engine driving the given policy
    pub fn new(merger: Arc<dyn Merger<T>>) -> Self {
        Self { merger }
    }

    /// The policy this engine drives
    pub fn merger(&self) -> &Arc<dyn Merger<T>> {
        &self.merger
    }

    /// Group then reduce: one merged record per extractable key.
    pub fn merge<K: RecordKey>(
        &self,
        fragments: Vec<T>,
        key_of: &(dyn Fn(&T) -> Option<K> + Send + Sync),
    ) -> (Vec<(K, T)>, ReduceReport) {
        if fragments.is_empty() {
            return (Vec::new(), ReduceReport::default());
        }
        let total = fragments.len();
        let (groups, _dropped) = group_by_key(fragments, key_of);
        tracing::debug!(
            target: "concord::merge",
            fragments = total,
            keys = groups.len(),
            "Grouped fragments by key"
        );
        self.reduce(groups)
    }

    /// Reduce pre-grouped fragment lists, one result per non-empty group,
    /// in group order.
    pub fn reduce<K: RecordKey>(&self, groups: Vec<(K, Vec<T>)>) -> (Vec<(K, T)>, ReduceReport) {
        let mut report = ReduceReport::default();
        let mut lanes: Vec<(K, Vec<T>)> = groups
            .into_iter()
            .filter(|(_, fragments)| !fragments.is_empty())
            .collect();

        let max_rounds = lanes
            .iter()
            .map(|(_, fragments)| rounds_for(fragments.len()))
            .max()
            .unwrap_or(0);

        while lanes.iter().any(|(_, fragments)| fragments.len() > 1) {
            report.rounds += 1;

            let mut pairs: Vec<(T, T)> = Vec::new();
            let mut plans: Vec<Option<LanePlan<T>>> = Vec::with_capacity(lanes.len());

            for (_, fragments) in lanes.iter_mut() {
                if fragments.len() <= 1 {
                    plans.push(None);
                    continue;
                }
                let mut drained = std::mem::take(fragments).into_iter();
                let mut plan = LanePlan {
                    pairs: 0,
                    carry: None,
                };
                while let Some(existing) = drained.next() {
                    match drained.next() {
                        Some(incoming) => {
                            pairs.push((existing, incoming));
                            plan.pairs += 1;
                        }
                        None => plan.carry = Some(existing),
                    }
                }
                plans.push(Some(plan));
            }

            tracing::debug!(
                target: "concord::merge",
                round = report.rounds,
                max_rounds,
                pairs = pairs.len(),
                keys = plans.iter().filter(|p| p.is_some()).count(),
                policy = self.merger.name(),
                "Batch merging round"
            );

            let mut merged = self.run_batch(pairs, &mut report).into_iter();

            for ((_, fragments), plan) in lanes.iter_mut().zip(plans) {
                if let Some(plan) = plan {
                    fragments.extend(merged.by_ref().take(plan.pairs));
                    fragments.extend(plan.carry);
                }
            }
        }

        tracing::debug!(
            target: "concord::merge",
            keys = lanes.len(),
            rounds = report.rounds,
            fallbacks = report.fallbacks,
            "Tournament reduction completed"
        );

        let merged = lanes
            .into_iter()
            .filter_map(|(key, mut fragments)| fragments.pop().map(|record| (key, record)))
            .collect();
        (merged, report)
    }

    /// Issue exactly one `batch_merge` call and apply the fail-closed rule.
    fn run_batch(&self, pairs: Vec<(T, T)>, report: &mut ReduceReport) -> Vec<T> {
        report.batch_calls += 1;
        report.pairs_merged += pairs.len();

        let results = self.merger.batch_merge(&pairs);
        if results.len() != pairs.len() {
            tracing::warn!(
                target: "concord::merge",
                policy = self.merger.name(),
                expected = pairs.len(),
                actual = results.len(),
                "Batch merge returned wrong result count, keeping incoming fragments"
            );
            report.fallbacks += pairs.len();
            return pairs.into_iter().map(|(_, incoming)| incoming).collect();
        }

        let mut out = Vec::with_capacity(pairs.len());
        for ((_, incoming), result) in pairs.into_iter().zip(results) {
            match result {
                Ok(merged) => out.push(merged),
                Err(e) => {
                    tracing::warn!(
                        target: "concord::merge",
                        policy = self.merger.name(),
                        error = %e,
                        "Merge failed, keeping incoming fragment"
                    );
                    report.fallbacks += 1;
                    out.push(incoming);
                }
            }
        }
        out
    }
}
