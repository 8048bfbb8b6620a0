//! Split candidates and the per-node best-split slot.

use std::cmp::Ordering;
use std::sync::Mutex;

/// Finite stand-in for negative infinity.
///
/// Using `f32::MIN` instead of `NEG_INFINITY` keeps every gain comparison
/// total, so vetoed candidates order below any real one without NaN or
/// infinity special cases.
pub const GAIN_SENTINEL: f32 = f32::MIN;

// ============================================================================
// SplitCandidate
// ============================================================================

/// One proposed split of a frontier node.
///
/// The "no split" sentinel is `gain == GAIN_SENTINEL` with `column == -1`;
/// use [`SplitCandidate::is_valid`] to check. Candidates are totally
/// ordered: maximize gain, break ties on smaller column, then smaller
/// threshold, then larger `n_left`. The tie-break chain makes the winner
/// independent of proposal arrival order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitCandidate {
    /// Upper bin edge tested by the split; `value <= threshold` goes left.
    pub threshold: f32,
    /// Column index, or `-1` for the sentinel.
    pub column: i32,
    /// Impurity decrease; `GAIN_SENTINEL` vetoes the candidate.
    pub gain: f32,
    /// Rows routed left by the split.
    pub n_left: u32,
}

impl SplitCandidate {
    /// The "no valid split" sentinel.
    pub fn none() -> Self {
        Self {
            threshold: 0.0,
            column: -1,
            gain: GAIN_SENTINEL,
            n_left: 0,
        }
    }

    /// Whether a real split was found.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.gain > GAIN_SENTINEL && self.column >= 0
    }

    /// Whether `self` wins against `other` under the split ordering.
    ///
    /// Strict: equal candidates do not replace each other, so an installed
    /// winner is stable under re-proposal.
    #[inline]
    pub fn beats(&self, other: &Self) -> bool {
        match self.gain.partial_cmp(&other.gain).unwrap_or(Ordering::Equal) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => match other.column.cmp(&self.column) {
                Ordering::Greater => true,
                Ordering::Less => false,
                Ordering::Equal => {
                    match other
                        .threshold
                        .partial_cmp(&self.threshold)
                        .unwrap_or(Ordering::Equal)
                    {
                        Ordering::Greater => true,
                        Ordering::Less => false,
                        Ordering::Equal => self.n_left > other.n_left,
                    }
                }
            },
        }
    }
}

impl Default for SplitCandidate {
    fn default() -> Self {
        Self::none()
    }
}

// ============================================================================
// BestSplitSlot
// ============================================================================

/// Per-node "take best" slot for concurrent split proposals.
///
/// Every (node, column) work item proposes at most one candidate, so the
/// slot sees one short critical section per column and contention stays
/// negligible. Updates are serialized per node; because [`SplitCandidate::beats`]
/// is a total order, the slot converges to the same winner for any
/// interleaving of proposers.
#[derive(Debug, Default)]
pub struct BestSplitSlot {
    best: Mutex<SplitCandidate>,
}

impl BestSplitSlot {
    /// A slot holding the sentinel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reinstall the sentinel between batches.
    pub fn reset(&self) {
        *self.best.lock().unwrap() = SplitCandidate::none();
    }

    /// Propose a candidate; keeps whichever of (current, candidate) wins.
    pub fn update(&self, candidate: SplitCandidate) {
        let mut best = self.best.lock().unwrap();
        if candidate.beats(&best) {
            *best = candidate;
        }
    }

    /// Read the winning candidate.
    pub fn get(&self) -> SplitCandidate {
        *self.best.lock().unwrap()
    }
}

// ============================================================================
// Tests
// ============================================================================
