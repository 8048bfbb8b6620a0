//! Batched histogram storage.
//!
//! One [`HistogramSet`] backs an entire batch: a flat count array and a
//! flat sum array, both carved into equal per-item slices, one item per
//! `(node_in_batch, column_in_block)` pair. Items own their slices
//! exclusively for the duration of a column block, which is what makes the
//! accumulate pass embarrassingly parallel and its totals exact.
//!
//! The arrays live inside the workspace: they are sized once from the
//! layout and only ever zeroed between column blocks, never reallocated.

/// Mutable view over one work item's histogram.
///
/// `counts` holds per-bin row counts (per class for classification);
/// `sums` holds per-bin label sums plus the MAE deviation segments, and is
/// empty for classification criteria.
#[derive(Debug)]
pub struct HistSliceMut<'a> {
    pub counts: &'a mut [u32],
    pub sums: &'a mut [f64],
}

/// Per-batch histogram arrays, pre-sized and reset-only.
#[derive(Debug)]
pub struct HistogramSet {
    counts: Vec<u32>,
    sums: Vec<f64>,
    counts_per_item: usize,
    sums_per_item: usize,
    n_items: usize,
}

impl HistogramSet {
    /// Allocate storage for `n_items` work items.
    pub fn new(n_items: usize, counts_per_item: usize, sums_per_item: usize) -> Self {
        Self {
            counts: vec![0; n_items * counts_per_item],
            sums: vec![0.0; n_items * sums_per_item],
            counts_per_item,
            sums_per_item,
            n_items,
        }
    }

    /// Maximum number of work items this set can serve.
    #[inline]
    pub fn n_items(&self) -> usize {
        self.n_items
    }

    /// Count cells per work item.
    #[inline]
    pub fn counts_per_item(&self) -> usize {
        self.counts_per_item
    }

    /// Sum cells per work item.
    #[inline]
    pub fn sums_per_item(&self) -> usize {
        self.sums_per_item
    }

    /// Zero every cell. Called once per column block.
    pub fn reset(&mut self) {
        self.counts.fill(0);
        self.sums.fill(0.0);
    }

    /// Split the arrays into the first `n_active` per-item slices.
    ///
    /// The returned views are disjoint, so they can be consumed by a
    /// parallel iterator without further coordination.
    ///
    /// # Panics
    ///
    /// Panics if `n_active > n_items`.
    pub fn slices_mut(&mut self, n_active: usize) -> Vec<HistSliceMut<'_>> {
        assert!(n_active <= self.n_items);
        let counts = self.counts[..n_active * self.counts_per_item].chunks_mut(self.counts_per_item);
        if self.sums_per_item == 0 {
            counts
                .map(|item_counts| HistSliceMut {
                    counts: item_counts,
                    sums: &mut [],
                })
                .collect()
        } else {
            let sums = self.sums[..n_active * self.sums_per_item].chunks_mut(self.sums_per_item);
            counts
                .zip(sums)
                .map(|(item_counts, item_sums)| HistSliceMut {
                    counts: item_counts,
                    sums: item_sums,
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_are_disjoint_and_sized() {
        let mut set = HistogramSet::new(4, 3, 2);
        let mut slices = set.slices_mut(3);
        assert_eq!(slices.len(), 3);

        for (i, slice) in slices.iter_mut().enumerate() {
            assert_eq!(slice.counts.len(), 3);
            assert_eq!(slice.sums.len(), 2);
            slice.counts[0] = i as u32 + 1;
        }
        drop(slices);

        // Writes landed in distinct items.
        assert_eq!(set.counts[0], 1);
        assert_eq!(set.counts[3], 2);
        assert_eq!(set.counts[6], 3);
    }

    #[test]
    fn reset_zeroes_everything() {
        let mut set = HistogramSet::new(2, 2, 1);
        {
            let mut slices = set.slices_mut(2);
            slices[1].counts[1] = 7;
            slices[0].sums[0] = 1.5;
        }
        set.reset();
        assert!(set.counts.iter().all(|&c| c == 0));
        assert!(set.sums.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn classification_sets_carry_no_sums() {
        let mut set = HistogramSet::new(2, 4, 0);
        let slices = set.slices_mut(2);
        assert!(slices[0].sums.is_empty());
        assert!(slices[1].sums.is_empty());
    }

    mod integration {
        use super::*;
        use crate::data::{BinCuts, ColMatrix, TrainingView};
        use crate::train::objectives::{GiniObjective, SplitObjective};

        /// One item per column, filled through an objective's accumulate
        /// pass, lands class counts in the right cells.
        #[test]
        fn items_accumulate_per_column_class_counts() {
            let data = [
                0.1, 0.2, 0.8, 0.9, // column 0
                0.9, 0.8, 0.2, 0.1, // column 1, mirrored
            ];
            let matrix = ColMatrix::from_slice(&data, 4, 2);
            let cuts = BinCuts::new(vec![0.5, 1.0, 0.5, 1.0], 2, 2);
            let labels = [0u32, 0, 1, 1];
            let view = TrainingView::new(matrix, &labels, &cuts, 2).unwrap();
            let rows = [0u32, 1, 2, 3];
            let objective = GiniObjective::new(1, 0.0);

            // Two items, stride n_bins + 1, no sums for classification.
            let stride = 3;
            let mut set = HistogramSet::new(2, 2 * stride, 0);
            set.reset();
            for (col, slice) in set.slices_mut(2).iter_mut().enumerate() {
                objective.accumulate(slice, &view, &rows, col);
            }

            // Column 0: class 0 fills bin 0, class 1 fills bin 1.
            assert_eq!(set.counts[..2 * stride], [2, 0, 0, 0, 2, 0]);
            // Column 1 mirrors: class 0 fills bin 1, class 1 fills bin 0.
            assert_eq!(set.counts[2 * stride..], [0, 2, 0, 2, 0, 0]);
        }
    }
}
