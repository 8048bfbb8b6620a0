//! Workspace sizing and pre-allocated build buffers.
//!
//! # Overview
//!
//! Nothing is allocated while a tree grows. [`WorkspaceLayout::compute`] is
//! a pure function from configuration and input shape to buffer geometry
//! and byte totals; [`TreeWorkspace::allocate`] materializes the buffers
//! once, caller-side, and the builder only borrows them for the duration
//! of `train()`. Between batches the workspace is reset (counters zeroed,
//! staging cleared) but never resized.
//!
//! Byte accounting mirrors an arena allocator: each region is padded to a
//! 512-byte boundary, and the totals split into the build-buffer share
//! (histograms, slots, staging, scatter) and the per-batch node-copy
//! share. A caller pooling workspaces across concurrent builds can reserve
//! straight from these totals.

use std::mem::size_of;

use super::histogram::HistogramSet;
use crate::config::DecisionTreeParams;
use crate::error::TrainError;
use crate::tree::{BestSplitSlot, Node, SplitCandidate};

/// Region alignment for the byte accounting.
pub const WORKSPACE_ALIGN: usize = 512;

/// Column block width cap; one block's histograms must stay workspace-resident.
const MAX_COL_BLOCK: usize = 64;

/// Below this depth the node reservation uses the closed form `2^(d+1) - 1`.
const CLOSED_FORM_DEPTH: u32 = 13;

/// Node reservation for deep trees, where the closed form explodes.
const DEEP_TREE_NODE_CAP: usize = 8191;

fn align_up(bytes: usize) -> usize {
    bytes.div_ceil(WORKSPACE_ALIGN) * WORKSPACE_ALIGN
}

// ============================================================================
// InputShape
// ============================================================================

/// The part of the input the workspace geometry depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputShape {
    /// Rows drawn by the per-tree sampler.
    pub n_sampled_rows: usize,
    /// Columns drawn by the per-tree sampler.
    pub n_sampled_cols: usize,
    /// Distinct classes; 1 for regression.
    pub n_classes: usize,
}

// ============================================================================
// WorkspaceLayout
// ============================================================================

/// Buffer geometry for one build configuration.
///
/// Computing the layout does no allocation and is idempotent: identical
/// parameters and shape always produce identical sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkspaceLayout {
    /// Hard cap on total nodes; past it the frontier is forced into leaves.
    pub max_nodes: usize,
    /// Frontier nodes served per batch.
    pub max_batch: usize,
    /// Columns per block; blocks are processed one after another.
    pub col_block_width: usize,
    /// Work items the histograms must serve: `max_batch * col_block_width`.
    pub n_hist_items: usize,
    /// Count cells per item: `n_classes * (n_bins + 1)`.
    pub counts_per_item: usize,
    /// Sum cells per item: `3 * (n_bins + 1)` for regression, else 0.
    pub sums_per_item: usize,
    /// Length of the row id scatter buffer.
    pub n_sampled_rows: usize,
}

impl WorkspaceLayout {
    /// Derive the layout from configuration and input shape.
    pub fn compute(params: &DecisionTreeParams, shape: &InputShape) -> Self {
        let max_nodes = if params.max_depth < CLOSED_FORM_DEPTH {
            (1usize << (params.max_depth + 1)) - 1
        } else {
            DEEP_TREE_NODE_CAP
        };

        // A frontier can never exceed the leaf capacity of the reservation.
        let max_batch = params.max_batch_size.min((max_nodes + 1) / 2).max(1);
        let col_block_width = shape.n_sampled_cols.clamp(1, MAX_COL_BLOCK);

        let bin_cells = params.n_bins + 1;
        let counts_per_item = shape.n_classes * bin_cells;
        let sums_per_item = if params.split_criterion.is_regression() {
            3 * bin_cells
        } else {
            0
        };

        Self {
            max_nodes,
            max_batch,
            col_block_width,
            n_hist_items: max_batch * col_block_width,
            counts_per_item,
            sums_per_item,
            n_sampled_rows: shape.n_sampled_rows,
        }
    }

    /// Build-buffer byte total over aligned regions.
    pub fn buffer_bytes(&self) -> usize {
        let counters = 3 * size_of::<u64>();
        let hist_counts = self.n_hist_items * self.counts_per_item * size_of::<u32>();
        let hist_sums = self.n_hist_items * self.sums_per_item * size_of::<f64>();
        let splits = self.max_batch * size_of::<SplitCandidate>();
        let curr_nodes = self.max_batch * size_of::<Node>();
        let next_nodes = 2 * self.max_batch * size_of::<Node>();
        let scatter = self.n_sampled_rows * size_of::<u32>();

        align_up(counters)
            + align_up(hist_counts)
            + align_up(hist_sums)
            + align_up(splits)
            + align_up(curr_nodes)
            + align_up(next_nodes)
            + align_up(scatter)
    }

    /// Byte total of the per-batch grown-node copies.
    pub fn staging_bytes(&self) -> usize {
        let total_counter = size_of::<u64>();
        let node_copies = 3 * self.max_batch * size_of::<Node>();
        align_up(total_counter) + align_up(node_copies)
    }
}

// ============================================================================
// TreeWorkspace
// ============================================================================

/// Pre-allocated buffers lent to the builder for one `train()` call.
///
/// A workspace is owned by exactly one build at a time. It may be reused
/// across builds (and across trees) as long as the layouts agree; a
/// workspace allocated for a larger same-geometry layout serves a smaller
/// one unchanged.
#[derive(Debug)]
pub struct TreeWorkspace {
    layout: WorkspaceLayout,
    pub(crate) hist: HistogramSet,
    pub(crate) slots: Vec<BestSplitSlot>,
    pub(crate) curr_nodes: Vec<Node>,
    pub(crate) next_nodes: Vec<Node>,
    pub(crate) scatter: Vec<u32>,
}

impl TreeWorkspace {
    /// Allocate buffers for a layout.
    pub fn allocate(layout: &WorkspaceLayout) -> Self {
        let mut slots = Vec::with_capacity(layout.max_batch);
        slots.resize_with(layout.max_batch, BestSplitSlot::new);
        Self {
            layout: *layout,
            hist: HistogramSet::new(
                layout.n_hist_items,
                layout.counts_per_item,
                layout.sums_per_item,
            ),
            slots,
            curr_nodes: Vec::with_capacity(layout.max_batch),
            next_nodes: Vec::with_capacity(2 * layout.max_batch),
            scatter: vec![0; layout.n_sampled_rows],
        }
    }

    /// The layout this workspace was allocated for.
    pub fn layout(&self) -> &WorkspaceLayout {
        &self.layout
    }

    /// Check that this workspace can serve `needed`.
    ///
    /// Per-item geometry must match exactly (histogram strides are baked
    /// into the arrays); everything else may be larger than needed.
    pub fn ensure_fits(&self, needed: &WorkspaceLayout) -> Result<(), TrainError> {
        let geometry_ok = self.layout.counts_per_item == needed.counts_per_item
            && self.layout.sums_per_item == needed.sums_per_item;
        let capacity_ok = self.hist.n_items() >= needed.n_hist_items
            && self.slots.len() >= needed.max_batch
            && self.scatter.len() >= needed.n_sampled_rows;
        if geometry_ok && capacity_ok {
            Ok(())
        } else {
            Err(TrainError::WorkspaceTooSmall {
                needed: needed.buffer_bytes(),
                got: self.layout.buffer_bytes(),
            })
        }
    }

    /// Reset per-batch state: sentinel the slots, clear the staging areas.
    pub(crate) fn reset_batch(&mut self, batch_size: usize) {
        for slot in &self.slots[..batch_size] {
            slot.reset();
        }
        self.curr_nodes.clear();
        self.next_nodes.clear();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SplitCriterion;

    fn shape() -> InputShape {
        InputShape {
            n_sampled_rows: 1000,
            n_sampled_cols: 20,
            n_classes: 3,
        }
    }

    #[test]
    fn layout_is_idempotent() {
        let params = DecisionTreeParams::default();
        let a = WorkspaceLayout::compute(&params, &shape());
        let b = WorkspaceLayout::compute(&params, &shape());
        assert_eq!(a, b);
        assert_eq!(a.buffer_bytes(), b.buffer_bytes());
        assert_eq!(a.staging_bytes(), b.staging_bytes());
    }

    #[test]
    fn node_reservation_uses_closed_form_for_shallow_trees() {
        let params = DecisionTreeParams {
            max_depth: 3,
            ..Default::default()
        };
        let layout = WorkspaceLayout::compute(&params, &shape());
        assert_eq!(layout.max_nodes, 15); // 2^4 - 1

        let params = DecisionTreeParams {
            max_depth: 0,
            ..Default::default()
        };
        let layout = WorkspaceLayout::compute(&params, &shape());
        assert_eq!(layout.max_nodes, 1);
        assert_eq!(layout.max_batch, 1);
    }

    #[test]
    fn node_reservation_caps_deep_trees() {
        for depth in [13, 20, 40] {
            let params = DecisionTreeParams {
                max_depth: depth,
                ..Default::default()
            };
            let layout = WorkspaceLayout::compute(&params, &shape());
            assert_eq!(layout.max_nodes, 8191);
        }
    }

    #[test]
    fn regions_are_aligned() {
        let params = DecisionTreeParams::default();
        let layout = WorkspaceLayout::compute(&params, &shape());
        assert_eq!(layout.buffer_bytes() % WORKSPACE_ALIGN, 0);
        assert_eq!(layout.staging_bytes() % WORKSPACE_ALIGN, 0);
        assert!(layout.buffer_bytes() > 0);
    }

    #[test]
    fn classification_layouts_carry_no_sum_cells() {
        let params = DecisionTreeParams::default();
        let layout = WorkspaceLayout::compute(&params, &shape());
        assert_eq!(layout.sums_per_item, 0);

        let params = DecisionTreeParams {
            split_criterion: SplitCriterion::Mae,
            ..Default::default()
        };
        let regression_shape = InputShape {
            n_classes: 1,
            ..shape()
        };
        let layout = WorkspaceLayout::compute(&params, &regression_shape);
        assert_eq!(layout.sums_per_item, 3 * (params.n_bins + 1));
    }

    #[test]
    fn column_block_is_clamped() {
        let params = DecisionTreeParams::default();
        let narrow = InputShape {
            n_sampled_cols: 5,
            ..shape()
        };
        assert_eq!(WorkspaceLayout::compute(&params, &narrow).col_block_width, 5);

        let wide = InputShape {
            n_sampled_cols: 500,
            ..shape()
        };
        assert_eq!(
            WorkspaceLayout::compute(&params, &wide).col_block_width,
            MAX_COL_BLOCK
        );
    }

    #[test]
    fn workspace_serves_equal_and_smaller_layouts() {
        let params = DecisionTreeParams::default();
        let layout = WorkspaceLayout::compute(&params, &shape());
        let ws = TreeWorkspace::allocate(&layout);

        assert!(ws.ensure_fits(&layout).is_ok());

        let smaller = WorkspaceLayout::compute(
            &params,
            &InputShape {
                n_sampled_rows: 10,
                ..shape()
            },
        );
        assert!(ws.ensure_fits(&smaller).is_ok());
    }

    #[test]
    fn workspace_rejects_larger_layouts() {
        let params = DecisionTreeParams::default();
        let small_shape = InputShape {
            n_sampled_rows: 10,
            ..shape()
        };
        let ws = TreeWorkspace::allocate(&WorkspaceLayout::compute(&params, &small_shape));

        let bigger = WorkspaceLayout::compute(&params, &shape());
        assert!(matches!(
            ws.ensure_fits(&bigger),
            Err(TrainError::WorkspaceTooSmall { .. })
        ));
    }

    #[test]
    fn workspace_rejects_mismatched_geometry() {
        let gini = DecisionTreeParams::default();
        let ws = TreeWorkspace::allocate(&WorkspaceLayout::compute(&gini, &shape()));

        let mse = DecisionTreeParams {
            split_criterion: SplitCriterion::Mse,
            ..Default::default()
        };
        let regression_shape = InputShape {
            n_classes: 1,
            ..shape()
        };
        let needed = WorkspaceLayout::compute(&mse, &regression_shape);
        assert!(ws.ensure_fits(&needed).is_err());
    }
}
