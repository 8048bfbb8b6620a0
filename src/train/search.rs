//! Parallel histogram accumulation and best-split reduction.
//!
//! # Overview
//!
//! One call covers one column block for the whole frontier batch. The work
//! grid is the cross product `(node_in_batch, column_in_block)`; every item
//! owns an exclusive histogram slice, walks its node's row slice in order,
//! and immediately reduces the filled histogram to the column's best
//! candidate, proposing it to the node's [`BestSplitSlot`].
//!
//! Because accumulation and evaluation happen inside the same item, a
//! (node, column) pair needs no cross-item completion tracking; the only
//! shared state is the per-node slot, and that is serialized.
//!
//! The best-split set produced for a batch depends only on the frontier
//! slice and the input view, never on worker scheduling: counts are exact,
//! float sums follow the fixed row order, and the slot's total order picks
//! the same winner for any proposal interleaving.

use rayon::prelude::*;

use super::histogram::HistogramSet;
use super::objectives::SplitObjective;
use crate::data::TrainingView;
use crate::tree::{BestSplitSlot, Node};

/// Run accumulate + evaluate for one column block over the batch.
///
/// # Arguments
///
/// * `frontier` - staged copies of the batch's frontier nodes
/// * `block_cols` - sampled column ids in this block
/// * `rowids` - the full sampled row id array (nodes index into it)
/// * `hist` - workspace histograms; zeroed here before use
/// * `slots` - one best-split slot per frontier node
pub fn search_column_block<O: SplitObjective>(
    objective: &O,
    view: &TrainingView<'_, O::Label>,
    rowids: &[u32],
    frontier: &[Node],
    block_cols: &[u32],
    hist: &mut HistogramSet,
    slots: &[BestSplitSlot],
) {
    let width = block_cols.len();
    let n_active = frontier.len() * width;
    debug_assert!(n_active <= hist.n_items());
    debug_assert!(frontier.len() <= slots.len());
    debug_assert_eq!(O::USES_LABEL_SUMS, hist.sums_per_item() > 0);

    hist.reset();
    hist.slices_mut(n_active)
        .into_par_iter()
        .enumerate()
        .for_each(|(item, mut slice)| {
            let node_idx = item / width;
            let col = block_cols[item % width] as usize;
            let node = &frontier[node_idx];
            let rows = &rowids[node.start..node.start + node.count];

            objective.accumulate(&mut slice, view, rows, col);
            let candidate = objective.evaluate(&mut slice, view, rows, col);
            if candidate.is_valid() {
                slots[node_idx].update(candidate);
            }
        });
}
