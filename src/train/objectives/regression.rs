//! Regression objectives: mean squared error and mean absolute error.
//!
//! Both objectives accumulate the same (node, column) histogram: a row
//! count and a label sum per bin, prefix-summed in place at evaluation time
//! into `count_cdf` / `label_cdf`. MSE scores candidates straight off the
//! two CDFs. MAE cannot, since absolute deviations do not reduce to prefix
//! sums; it re-walks the node's rows once more, scoring every candidate
//! against its own left/right means.

use super::{prefix_sum_bins, SplitGuards, SplitObjective};
use crate::data::TrainingView;
use crate::train::histogram::HistSliceMut;
use crate::tree::SplitCandidate;

fn accumulate_label_sums(
    hist: &mut HistSliceMut<'_>,
    view: &TrainingView<'_, f32>,
    rows: &[u32],
    col: usize,
) {
    for &row in rows {
        let row = row as usize;
        let bin = view.bin(row, col);
        hist.counts[bin] += 1;
        hist.sums[bin] += f64::from(view.labels[row]);
    }
}

fn label_mean(view: &TrainingView<'_, f32>, rows: &[u32]) -> f32 {
    if rows.is_empty() {
        return 0.0;
    }
    let sum: f64 = rows.iter().map(|&r| f64::from(view.labels[r as usize])).sum();
    (sum / rows.len() as f64) as f32
}

// ============================================================================
// MseObjective
// ============================================================================

/// Squared-error impurity decrease.
///
/// With parent objective `-(sum y)^2 / n` and per-candidate left sum `l`
/// over `n_left` rows:
///
/// ```text
/// gain = (parent - (-l^2/n_left - r^2/n_right)) / n
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MseObjective {
    guards: SplitGuards,
}

impl MseObjective {
    pub fn new(min_samples_leaf: u32, min_impurity_decrease: f32) -> Self {
        Self {
            guards: SplitGuards {
                min_samples_leaf,
                min_impurity_decrease,
            },
        }
    }
}

impl SplitObjective for MseObjective {
    type Label = f32;
    const USES_LABEL_SUMS: bool = true;

    fn accumulate(
        &self,
        hist: &mut HistSliceMut<'_>,
        view: &TrainingView<'_, f32>,
        rows: &[u32],
        col: usize,
    ) {
        accumulate_label_sums(hist, view, rows, col);
    }

    fn evaluate(
        &self,
        hist: &mut HistSliceMut<'_>,
        view: &TrainingView<'_, f32>,
        rows: &[u32],
        col: usize,
    ) -> SplitCandidate {
        let n_bins = view.cuts.n_bins();
        prefix_sum_bins(&mut hist.counts[..n_bins], n_bins);
        prefix_sum_bins(&mut hist.sums[..n_bins], n_bins);
        let count_cdf = &hist.counts[..n_bins];
        let label_cdf = &hist.sums[..n_bins];

        let n_samples = rows.len() as u32;
        let n = f64::from(n_samples);
        let label_sum = label_cdf[n_bins - 1];
        let parent = -(label_sum * label_sum) / n;
        let mut best = SplitCandidate::none();

        for i in 0..n_bins {
            let n_left = count_cdf[i];
            let n_right = n_samples - n_left;
            if n_left < self.guards.min_samples_leaf || n_right < self.guards.min_samples_leaf {
                continue;
            }

            let left_sum = label_cdf[i];
            let right_sum = label_sum - left_sum;
            let children = -(left_sum * left_sum) / f64::from(n_left)
                - (right_sum * right_sum) / f64::from(n_right);
            let gain = ((parent - children) / n) as f32;
            if gain <= self.guards.min_impurity_decrease {
                continue;
            }

            let candidate = SplitCandidate {
                threshold: view.cuts.edge(col, i),
                column: col as i32,
                gain,
                n_left,
            };
            if candidate.beats(&best) {
                best = candidate;
            }
        }
        best
    }

    fn predict_leaf(&self, view: &TrainingView<'_, f32>, rows: &[u32]) -> f32 {
        label_mean(view, rows)
    }
}

// ============================================================================
// MaeObjective
// ============================================================================

/// Absolute-error impurity decrease.
///
/// Pass one builds the count/label CDFs like MSE. Pass two re-walks the
/// node's rows and, for every candidate `i`, accumulates
/// `|y - mean_left(i)|` or `|y - mean_right(i)|` depending on which side
/// the row falls, plus `|y - mean_parent|` once per row:
///
/// ```text
/// gain(i) = (parent_dev - left_dev(i) - right_dev(i)) / n
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MaeObjective {
    guards: SplitGuards,
}

impl MaeObjective {
    pub fn new(min_samples_leaf: u32, min_impurity_decrease: f32) -> Self {
        Self {
            guards: SplitGuards {
                min_samples_leaf,
                min_impurity_decrease,
            },
        }
    }
}

impl SplitObjective for MaeObjective {
    type Label = f32;
    const USES_LABEL_SUMS: bool = true;

    fn accumulate(
        &self,
        hist: &mut HistSliceMut<'_>,
        view: &TrainingView<'_, f32>,
        rows: &[u32],
        col: usize,
    ) {
        accumulate_label_sums(hist, view, rows, col);
    }

    fn evaluate(
        &self,
        hist: &mut HistSliceMut<'_>,
        view: &TrainingView<'_, f32>,
        rows: &[u32],
        col: usize,
    ) -> SplitCandidate {
        let n_bins = view.cuts.n_bins();
        let stride = n_bins + 1;
        prefix_sum_bins(&mut hist.counts[..n_bins], n_bins);
        prefix_sum_bins(&mut hist.sums[..n_bins], n_bins);

        let count_cdf = &hist.counts[..n_bins];
        // The sums buffer carries three segments: label CDF, then the
        // left/right deviation accumulators (still zero from the reset).
        let (label_cdf, deviations) = hist.sums.split_at_mut(stride);
        let (left_dev, right_dev) = deviations.split_at_mut(stride);
        let label_cdf = &label_cdf[..n_bins];

        let n_samples = rows.len() as u32;
        let n = f64::from(n_samples);
        let label_sum = label_cdf[n_bins - 1];
        let parent_mean = label_sum / n;
        let mut parent_dev = 0.0f64;

        for &row in rows {
            let row = row as usize;
            let y = f64::from(view.labels[row]);
            let bin = view.bin(row, col);
            parent_dev += (y - parent_mean).abs();
            for i in 0..n_bins {
                let n_left = count_cdf[i];
                if n_left == 0 || n_left == n_samples {
                    continue;
                }
                if bin <= i {
                    left_dev[i] += (y - label_cdf[i] / f64::from(n_left)).abs();
                } else {
                    let right_mean =
                        (label_sum - label_cdf[i]) / f64::from(n_samples - n_left);
                    right_dev[i] += (y - right_mean).abs();
                }
            }
        }

        let mut best = SplitCandidate::none();
        for i in 0..n_bins {
            let n_left = count_cdf[i];
            let n_right = n_samples - n_left;
            if n_left < self.guards.min_samples_leaf || n_right < self.guards.min_samples_leaf {
                continue;
            }

            let gain = ((parent_dev - left_dev[i] - right_dev[i]) / n) as f32;
            if gain <= self.guards.min_impurity_decrease {
                continue;
            }

            let candidate = SplitCandidate {
                threshold: view.cuts.edge(col, i),
                column: col as i32,
                gain,
                n_left,
            };
            if candidate.beats(&best) {
                best = candidate;
            }
        }
        best
    }

    fn predict_leaf(&self, view: &TrainingView<'_, f32>, rows: &[u32]) -> f32 {
        label_mean(view, rows)
    }
}

// ============================================================================
// Tests
// ============================================================================
