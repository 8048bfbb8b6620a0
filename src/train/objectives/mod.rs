//! Split objectives: mapping histograms to gains.
//!
//! # Overview
//!
//! An objective owns the numerically delicate part of split finding: given
//! a filled (node, column) histogram it scores every candidate bin and
//! returns the column's best [`SplitCandidate`]. Objectives also enforce
//! the two universal guards (`min_samples_leaf`, `min_impurity_decrease`)
//! by vetoing candidates with the gain sentinel, and supply the leaf
//! prediction for nodes that stop splitting.
//!
//! The builder is generic over the objective, so criterion dispatch is a
//! single `match` at entry and the search loop is monomorphized.

mod classification;
mod regression;

pub use classification::{EntropyObjective, GiniObjective};
pub use regression::{MaeObjective, MseObjective};

use crate::data::{Label, TrainingView};
use crate::train::histogram::HistSliceMut;
use crate::tree::SplitCandidate;

// ============================================================================
// SplitGuards
// ============================================================================

/// The two guards every objective enforces.
///
/// A candidate leaving fewer than `min_samples_leaf` rows on either side,
/// or gaining no more than `min_impurity_decrease`, is vetoed.
#[derive(Debug, Clone, Copy)]
pub struct SplitGuards {
    pub min_samples_leaf: u32,
    pub min_impurity_decrease: f32,
}

// ============================================================================
// SplitObjective
// ============================================================================

/// The impurity-gain contract.
///
/// `accumulate` and `evaluate` run back to back inside one (node, column)
/// work item, each item owning its exclusive histogram slice. Rows are
/// walked in slice order, so regression sums are reproducible for a fixed
/// grid and classification counts are exact.
pub trait SplitObjective: Send + Sync {
    /// Label type this objective trains against.
    type Label: Label;

    /// Whether the histogram carries label sums next to counts.
    const USES_LABEL_SUMS: bool;

    /// Fill the item's histogram slice from the node's rows for `col`.
    fn accumulate(
        &self,
        hist: &mut HistSliceMut<'_>,
        view: &TrainingView<'_, Self::Label>,
        rows: &[u32],
        col: usize,
    );

    /// Reduce the filled histogram to this column's best candidate.
    ///
    /// May overwrite the histogram slice (prefix sums, deviation passes);
    /// the slice is zeroed again before the next accumulation.
    fn evaluate(
        &self,
        hist: &mut HistSliceMut<'_>,
        view: &TrainingView<'_, Self::Label>,
        rows: &[u32],
        col: usize,
    ) -> SplitCandidate;

    /// Prediction for a node frozen as a leaf.
    fn predict_leaf(&self, view: &TrainingView<'_, Self::Label>, rows: &[u32]) -> f32;
}

/// In-place prefix sum over the bin axis of one class row.
#[inline]
pub(crate) fn prefix_sum_bins<T: Copy + std::ops::Add<Output = T>>(bins: &mut [T], n_bins: usize) {
    for b in 1..n_bins {
        bins[b] = bins[b] + bins[b - 1];
    }
}
