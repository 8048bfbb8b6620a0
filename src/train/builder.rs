//! Batched level-wise tree builder.
//!
//! # Overview
//!
//! The driver grows one tree by expanding the frontier, the contiguous
//! tail `[node_start, node_end)` of the node sequence, in batches of up
//! to `max_batch` nodes. Each batch makes one pass over the sampled
//! columns, block by block, filling histograms and reducing them to one
//! best split per frontier node; split application then freezes every
//! frontier node as either an internal node with two appended children or
//! a leaf.
//!
//! All buffers come from a caller-owned [`TreeWorkspace`]; the only
//! allocation the driver performs is the output node sequence itself,
//! reserved up front to the layout's node cap so it never reallocates
//! mid-build.
//!
//! # Example
//!
//! ```ignore
//! let mut builder = TreeBuilder::new(&params, view, objective, &mut rowids, &colids)?;
//! let mut workspace = TreeWorkspace::allocate(builder.layout());
//! let tree = builder.train(&mut workspace)?;
//! ```

use rayon::prelude::*;

use super::logger::TrainingLogger;
use super::objectives::{
    EntropyObjective, GiniObjective, MaeObjective, MseObjective, SplitObjective,
};
use super::partition::stable_partition;
use super::search::search_column_block;
use super::workspace::{InputShape, TreeWorkspace, WorkspaceLayout};
use crate::config::{DecisionTreeParams, SplitCriterion};
use crate::data::{BinCuts, ColMatrix, TrainingView};
use crate::error::TrainError;
use crate::tree::{Node, SplitCandidate, Tree};

// ============================================================================
// TreeBuilder
// ============================================================================

/// Grows one tree from a sampled, quantized input.
///
/// The builder is generic over the objective, so the entire search path is
/// monomorphized per criterion. It owns no buffers: the sampled row ids
/// are a mutable borrow it reorders in place, and everything else lives in
/// the workspace lent to [`TreeBuilder::train`].
pub struct TreeBuilder<'a, O: SplitObjective> {
    params: &'a DecisionTreeParams,
    view: TrainingView<'a, O::Label>,
    objective: O,
    rowids: &'a mut [u32],
    colids: &'a [u32],
    layout: WorkspaceLayout,
}

/// Frontier bookkeeping for one build.
struct GrowState {
    /// Leaves of the tree as currently grown; frontier nodes count as
    /// leaves until they split, so a split is a net gain of one.
    n_leaves: usize,
    /// Deepest node emitted so far.
    depth: u32,
    node_start: usize,
    node_end: usize,
}

impl<'a, O: SplitObjective> TreeBuilder<'a, O> {
    /// Bind a builder to its inputs, failing fast on misconfiguration.
    ///
    /// # Errors
    ///
    /// Parameter validation errors, [`TrainError::EmptySample`], or
    /// [`TrainError::EmptyColumnSample`]. Nothing is enqueued on failure.
    pub fn new(
        params: &'a DecisionTreeParams,
        view: TrainingView<'a, O::Label>,
        objective: O,
        rowids: &'a mut [u32],
        colids: &'a [u32],
    ) -> Result<Self, TrainError> {
        params.validate()?;
        if rowids.is_empty() {
            return Err(TrainError::EmptySample);
        }
        if colids.is_empty() {
            return Err(TrainError::EmptyColumnSample);
        }
        debug_assert!(rowids.iter().all(|&r| (r as usize) < view.data.n_rows()));
        debug_assert!(colids.iter().all(|&c| (c as usize) < view.data.n_cols()));

        let shape = InputShape {
            n_sampled_rows: rowids.len(),
            n_sampled_cols: colids.len(),
            n_classes: view.n_classes,
        };
        let layout = WorkspaceLayout::compute(params, &shape);

        Ok(Self {
            params,
            view,
            objective,
            rowids,
            colids,
            layout,
        })
    }

    /// The workspace layout this build needs.
    pub fn layout(&self) -> &WorkspaceLayout {
        &self.layout
    }

    /// Grow the tree.
    ///
    /// The workspace must fit [`TreeBuilder::layout`]. With `n_threads`
    /// positive the search grid runs on a dedicated pool of that size;
    /// otherwise it uses rayon's global pool.
    pub fn train(&mut self, workspace: &mut TreeWorkspace) -> Result<Tree, TrainError> {
        workspace.ensure_fits(&self.layout)?;

        if self.params.n_threads > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.params.n_threads)
                .build()
                .map_err(|e| TrainError::BadParam {
                    name: "n_threads",
                    reason: e.to_string(),
                })?;
            Ok(pool.install(|| self.grow(workspace)))
        } else {
            Ok(self.grow(workspace))
        }
    }

    fn grow(&mut self, ws: &mut TreeWorkspace) -> Tree {
        let mut logger = TrainingLogger::new(self.params.verbosity);
        logger.start_build(self.rowids.len(), self.colids.len());

        // Reserved to the cap, so appends never reallocate mid-build.
        let mut nodes: Vec<Node> = Vec::with_capacity(self.layout.max_nodes);
        nodes.push(Node::new_split_pending(0, self.rowids.len(), 0, 0));

        let mut state = GrowState {
            n_leaves: 1,
            depth: 0,
            node_start: 0,
            node_end: 1,
        };

        loop {
            let frontier = state.node_end - state.node_start;
            let new_nodes = self.process_batch(ws, &mut nodes, &mut state);
            logger.log_batch(frontier, new_nodes);

            state.node_start = state.node_end;
            state.node_end += (nodes.len() - state.node_end).min(self.layout.max_batch);
            if state.node_start == state.node_end {
                break;
            }
        }

        logger.finish_build(state.n_leaves, state.depth);
        Tree {
            nodes,
            num_leaves: state.n_leaves,
            depth: state.depth,
        }
    }

    /// Process one frontier batch; returns the number of appended children.
    fn process_batch(
        &mut self,
        ws: &mut TreeWorkspace,
        nodes: &mut Vec<Node>,
        state: &mut GrowState,
    ) -> usize {
        let batch_size = state.node_end - state.node_start;
        ws.reset_batch(batch_size);
        ws.curr_nodes
            .extend_from_slice(&nodes[state.node_start..state.node_end]);

        // Search: every column block over the whole batch.
        {
            let hist = &mut ws.hist;
            let slots = &ws.slots[..batch_size];
            let frontier = &ws.curr_nodes[..];
            for block in self.colids.chunks(self.layout.col_block_width) {
                search_column_block(
                    &self.objective,
                    &self.view,
                    &*self.rowids,
                    frontier,
                    block,
                    hist,
                    slots,
                );
            }
        }

        // Split application, phase one: freeze every frontier node.
        // Sequential in frontier order so child ids and leaf accounting
        // are deterministic.
        let mut pending: Vec<(usize, SplitCandidate)> = Vec::with_capacity(batch_size);
        let n_before = nodes.len();
        for i in 0..batch_size {
            let node_id = state.node_start + i;
            let node = nodes[node_id];
            let best = ws.slots[i].get();

            let leaf_cap_hit = self.params.max_leaves > 0
                && state.n_leaves as i64 >= self.params.max_leaves;
            let reservation_full =
                n_before + ws.next_nodes.len() + 2 > self.layout.max_nodes;
            let count = node.count as u32;
            let force_leaf = !best.is_valid()
                || node.depth + 1 > self.params.max_depth
                || leaf_cap_hit
                || count < self.params.min_samples_split
                || count < 2 * self.params.min_samples_leaf
                || reservation_full;

            if force_leaf {
                let rows = &self.rowids[node.start..node.start + node.count];
                let prediction = self.objective.predict_leaf(&self.view, rows);
                nodes[node_id].make_leaf(prediction);
            } else {
                let left_id = n_before + ws.next_nodes.len();
                nodes[node_id].make_split(best.column, best.threshold, left_id as i64);

                let n_left = best.n_left as usize;
                ws.next_nodes.push(Node::new_split_pending(
                    node.start,
                    n_left,
                    node.depth + 1,
                    left_id as u32,
                ));
                ws.next_nodes.push(Node::new_split_pending(
                    node.start + n_left,
                    node.count - n_left,
                    node.depth + 1,
                    left_id as u32 + 1,
                ));

                state.n_leaves += 1;
                state.depth = state.depth.max(node.depth + 1);
                pending.push((node_id, best));
            }
        }

        // Phase two: scatter each split parent's row slice. The slices are
        // disjoint and ascending, so they can be carved off and run in
        // parallel.
        if !pending.is_empty() {
            let view = self.view;
            let mut jobs = Vec::with_capacity(pending.len());
            let mut rows_rest: &mut [u32] = &mut *self.rowids;
            let mut scratch_rest: &mut [u32] = &mut ws.scatter;
            let mut offset = 0usize;
            for &(node_id, best) in &pending {
                let (start, count) = (nodes[node_id].start, nodes[node_id].count);
                debug_assert!(start >= offset);

                let (_, rest) = std::mem::take(&mut rows_rest).split_at_mut(start - offset);
                let (node_rows, rest) = rest.split_at_mut(count);
                rows_rest = rest;
                let (_, rest) = std::mem::take(&mut scratch_rest).split_at_mut(start - offset);
                let (node_scratch, rest) = rest.split_at_mut(count);
                scratch_rest = rest;

                offset = start + count;
                jobs.push((node_rows, node_scratch, best));
            }

            jobs.into_par_iter().for_each(|(rows, scratch, best)| {
                let col = best.column as usize;
                let n_left = stable_partition(rows, scratch, |row| {
                    view.data.get(row as usize, col) <= best.threshold
                });
                debug_assert_eq!(n_left, best.n_left as usize);
            });
        }

        let new_nodes = ws.next_nodes.len();
        nodes.extend_from_slice(&ws.next_nodes);
        new_nodes
    }
}

// ============================================================================
// Criterion dispatch
// ============================================================================

/// Train a classification tree with the criterion picked by `params`.
///
/// `rowids` is reordered in place; on return, each leaf's
/// `start..start + count` addresses its rows. The workspace must have been
/// allocated for the layout this configuration computes.
#[allow(clippy::too_many_arguments)]
pub fn train_classifier(
    params: &DecisionTreeParams,
    data: ColMatrix<'_>,
    labels: &[u32],
    cuts: &BinCuts,
    n_classes: usize,
    rowids: &mut [u32],
    colids: &[u32],
    workspace: &mut TreeWorkspace,
) -> Result<Tree, TrainError> {
    let view = TrainingView::new(data, labels, cuts, n_classes)?;
    match params.split_criterion {
        SplitCriterion::Gini => {
            let objective =
                GiniObjective::new(params.min_samples_leaf, params.min_impurity_decrease);
            TreeBuilder::new(params, view, objective, rowids, colids)?.train(workspace)
        }
        SplitCriterion::Entropy => {
            let objective =
                EntropyObjective::new(params.min_samples_leaf, params.min_impurity_decrease);
            TreeBuilder::new(params, view, objective, rowids, colids)?.train(workspace)
        }
        SplitCriterion::Mse | SplitCriterion::Mae => Err(TrainError::BadParam {
            name: "split_criterion",
            reason: "regression criterion with classification labels".to_string(),
        }),
    }
}

/// Train a regression tree with the criterion picked by `params`.
pub fn train_regressor(
    params: &DecisionTreeParams,
    data: ColMatrix<'_>,
    labels: &[f32],
    cuts: &BinCuts,
    rowids: &mut [u32],
    colids: &[u32],
    workspace: &mut TreeWorkspace,
) -> Result<Tree, TrainError> {
    let view = TrainingView::new(data, labels, cuts, 1)?;
    match params.split_criterion {
        SplitCriterion::Mse => {
            let objective =
                MseObjective::new(params.min_samples_leaf, params.min_impurity_decrease);
            TreeBuilder::new(params, view, objective, rowids, colids)?.train(workspace)
        }
        SplitCriterion::Mae => {
            let objective =
                MaeObjective::new(params.min_samples_leaf, params.min_impurity_decrease);
            TreeBuilder::new(params, view, objective, rowids, colids)?.train(workspace)
        }
        SplitCriterion::Gini | SplitCriterion::Entropy => Err(TrainError::BadParam {
            name: "split_criterion",
            reason: "classification criterion with regression labels".to_string(),
        }),
    }
}

/// Compute the workspace layout for a configuration without binding inputs.
///
/// Pure: identical arguments always produce identical sizes.
pub fn workspace_layout(params: &DecisionTreeParams, shape: &InputShape) -> WorkspaceLayout {
    WorkspaceLayout::compute(params, shape)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::QuantileCuts;

    fn build_gini(
        data: &[f32],
        n_rows: usize,
        n_cols: usize,
        labels: &[u32],
        n_classes: usize,
        params: &DecisionTreeParams,
    ) -> Tree {
        let matrix = ColMatrix::from_slice(data, n_rows, n_cols);
        let cuts = QuantileCuts::from_matrix(&matrix, params.n_bins).unwrap();
        let mut rowids: Vec<u32> = (0..n_rows as u32).collect();
        let colids: Vec<u32> = (0..n_cols as u32).collect();

        let shape = InputShape {
            n_sampled_rows: n_rows,
            n_sampled_cols: n_cols,
            n_classes,
        };
        let mut ws = TreeWorkspace::allocate(&workspace_layout(params, &shape));
        train_classifier(
            params, matrix, labels, &cuts, n_classes, &mut rowids, &colids, &mut ws,
        )
        .unwrap()
    }

    #[test]
    fn pure_split_grows_root_and_two_leaves() {
        let data = [0.1, 0.2, 0.8, 0.9];
        let labels = [0u32, 0, 1, 1];
        let params = DecisionTreeParams {
            max_depth: 2,
            n_bins: 2,
            ..Default::default()
        };

        let tree = build_gini(&data, 4, 1, &labels, 2, &params);

        assert_eq!(tree.num_nodes(), 3);
        assert_eq!(tree.num_leaves, 2);
        assert_eq!(tree.depth, 1);

        let root = &tree.nodes[0];
        assert!(!root.is_leaf);
        assert_eq!(root.split_feature, 0);
        assert_eq!(root.split_threshold, 0.2); // upper edge of the lower bin
        assert_eq!(root.left_child_id, 1);

        for child in &tree.nodes[1..] {
            assert!(child.is_leaf);
            assert_eq!(child.count, 2);
            assert_eq!(child.depth, 1);
        }
        assert_eq!(tree.nodes[1].prediction, 0.0);
        assert_eq!(tree.nodes[2].prediction, 1.0);
    }

    #[test]
    fn max_depth_zero_is_a_single_leaf() {
        let data = [0.1, 0.2, 0.8, 0.9];
        let labels = [0u32, 0, 1, 1];
        let params = DecisionTreeParams {
            max_depth: 0,
            n_bins: 2,
            ..Default::default()
        };

        let tree = build_gini(&data, 4, 1, &labels, 2, &params);

        assert_eq!(tree.num_nodes(), 1);
        assert_eq!(tree.num_leaves, 1);
        assert_eq!(tree.depth, 0);
        assert!(tree.nodes[0].is_leaf);
        assert_eq!(tree.nodes[0].split_feature, -1);
        assert_eq!(tree.nodes[0].left_child_id, -1);
    }

    #[test]
    fn uniform_labels_leave_the_root_alone() {
        let data = [0.1, 0.2, 0.8, 0.9];
        let labels = [1u32, 1, 1, 1];
        let params = DecisionTreeParams {
            n_bins: 2,
            ..Default::default()
        };

        let tree = build_gini(&data, 4, 1, &labels, 2, &params);

        assert_eq!(tree.num_leaves, 1);
        assert!(tree.nodes[0].is_leaf);
        assert_eq!(tree.nodes[0].prediction, 1.0);
    }

    #[test]
    fn min_samples_leaf_forces_the_root_leaf() {
        // The only bin boundary isolates the single class-1 row.
        let data = [0.1, 0.2, 0.3, 0.9];
        let labels = [0u32, 0, 0, 1];
        let params = DecisionTreeParams {
            n_bins: 2,
            min_samples_leaf: 2,
            ..Default::default()
        };
        let matrix = ColMatrix::from_slice(&data, 4, 1);
        let cuts = crate::data::BinCuts::new(vec![0.5, 1.0], 2, 1);
        let mut rowids: Vec<u32> = (0..4).collect();
        let colids = [0u32];
        let shape = InputShape {
            n_sampled_rows: 4,
            n_sampled_cols: 1,
            n_classes: 2,
        };
        let mut ws = TreeWorkspace::allocate(&workspace_layout(&params, &shape));

        let tree = train_classifier(
            &params, matrix, &labels, &cuts, 2, &mut rowids, &colids, &mut ws,
        )
        .unwrap();

        assert_eq!(tree.num_leaves, 1);
        assert!(tree.nodes[0].is_leaf);
        assert_eq!(tree.nodes[0].prediction, 0.0);
    }

    #[test]
    fn workspace_too_small_is_rejected_up_front() {
        let data = [0.1, 0.2, 0.8, 0.9];
        let labels = [0u32, 0, 1, 1];
        let params = DecisionTreeParams {
            n_bins: 2,
            ..Default::default()
        };
        let matrix = ColMatrix::from_slice(&data, 4, 1);
        let cuts = QuantileCuts::from_matrix(&matrix, 2).unwrap();
        let mut rowids: Vec<u32> = (0..4).collect();
        let colids = [0u32];

        // Workspace sized for a regression geometry.
        let mse = DecisionTreeParams {
            split_criterion: SplitCriterion::Mse,
            n_bins: 2,
            ..Default::default()
        };
        let shape = InputShape {
            n_sampled_rows: 4,
            n_sampled_cols: 1,
            n_classes: 1,
        };
        let mut ws = TreeWorkspace::allocate(&workspace_layout(&mse, &shape));

        let err = train_classifier(
            &params, matrix, &labels, &cuts, 2, &mut rowids, &colids, &mut ws,
        )
        .unwrap_err();
        assert!(matches!(err, TrainError::WorkspaceTooSmall { .. }));
    }

    #[test]
    fn criterion_and_label_kind_must_agree() {
        let data = [0.1, 0.2, 0.8, 0.9];
        let labels = [0u32, 0, 1, 1];
        let params = DecisionTreeParams {
            split_criterion: SplitCriterion::Mse,
            n_bins: 2,
            ..Default::default()
        };
        let matrix = ColMatrix::from_slice(&data, 4, 1);
        let cuts = QuantileCuts::from_matrix(&matrix, 2).unwrap();
        let mut rowids: Vec<u32> = (0..4).collect();
        let colids = [0u32];
        let shape = InputShape {
            n_sampled_rows: 4,
            n_sampled_cols: 1,
            n_classes: 2,
        };
        let mut ws = TreeWorkspace::allocate(&workspace_layout(&params, &shape));

        let err = train_classifier(
            &params, matrix, &labels, &cuts, 2, &mut rowids, &colids, &mut ws,
        )
        .unwrap_err();
        assert!(matches!(err, TrainError::BadParam { name: "split_criterion", .. }));
    }
}
