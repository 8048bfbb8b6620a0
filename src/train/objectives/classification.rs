//! Classification objectives: Gini impurity and entropy.
//!
//! The histogram for a (node, column) item is a per-class count grid,
//! `counts[class * bin_stride + bin]`, filled bin-local and prefix-summed
//! in place at evaluation time so `counts[class][i]` becomes the number of
//! class members on the left of candidate `i` (inclusive).

use super::{prefix_sum_bins, SplitGuards, SplitObjective};
use crate::data::TrainingView;
use crate::train::histogram::HistSliceMut;
use crate::tree::SplitCandidate;

/// Majority class over a row slice, smaller class id winning ties.
fn majority_class(view: &TrainingView<'_, u32>, rows: &[u32]) -> f32 {
    let mut counts = vec![0u32; view.n_classes];
    for &row in rows {
        counts[view.labels[row as usize] as usize] += 1;
    }
    let mut best = 0usize;
    for class in 1..counts.len() {
        if counts[class] > counts[best] {
            best = class;
        }
    }
    best as f32
}

fn accumulate_class_counts(
    hist: &mut HistSliceMut<'_>,
    view: &TrainingView<'_, u32>,
    rows: &[u32],
    col: usize,
) {
    let stride = view.cuts.n_bins() + 1;
    for &row in rows {
        let row = row as usize;
        let bin = view.bin(row, col);
        let class = view.labels[row] as usize;
        debug_assert!(class < view.n_classes, "label {} out of range", class);
        hist.counts[class * stride + bin] += 1;
    }
}

// ============================================================================
// GiniObjective
// ============================================================================

/// Gini impurity decrease.
///
/// For candidate bin `i` with per-class left counts `l_c`, right counts
/// `r_c` and `n` node samples:
///
/// ```text
/// gain = sum_c (l_c^2/n_left + r_c^2/n_right) / n  -  sum_c ((l_c+r_c)/n)^2
/// ```
#[derive(Debug, Clone, Copy)]
pub struct GiniObjective {
    guards: SplitGuards,
}

impl GiniObjective {
    pub fn new(min_samples_leaf: u32, min_impurity_decrease: f32) -> Self {
        Self {
            guards: SplitGuards {
                min_samples_leaf,
                min_impurity_decrease,
            },
        }
    }
}

impl SplitObjective for GiniObjective {
    type Label = u32;
    const USES_LABEL_SUMS: bool = false;

    fn accumulate(
        &self,
        hist: &mut HistSliceMut<'_>,
        view: &TrainingView<'_, u32>,
        rows: &[u32],
        col: usize,
    ) {
        accumulate_class_counts(hist, view, rows, col);
    }

    fn evaluate(
        &self,
        hist: &mut HistSliceMut<'_>,
        view: &TrainingView<'_, u32>,
        rows: &[u32],
        col: usize,
    ) -> SplitCandidate {
        let n_bins = view.cuts.n_bins();
        let stride = n_bins + 1;
        let counts = &mut *hist.counts;
        for class in 0..view.n_classes {
            prefix_sum_bins(&mut counts[class * stride..class * stride + n_bins], n_bins);
        }

        let n_samples = rows.len() as u32;
        let inv_n = 1.0 / f64::from(n_samples);
        let mut best = SplitCandidate::none();

        for i in 0..n_bins {
            let mut n_left = 0u32;
            for class in 0..view.n_classes {
                n_left += counts[class * stride + i];
            }
            let n_right = n_samples - n_left;
            if n_left < self.guards.min_samples_leaf || n_right < self.guards.min_samples_leaf {
                continue;
            }

            let mut children = 0.0f64;
            let mut parent = 0.0f64;
            for class in 0..view.n_classes {
                let l = f64::from(counts[class * stride + i]);
                let v = f64::from(counts[class * stride + n_bins - 1]);
                let r = v - l;
                children +=
                    (l * l / f64::from(n_left) + r * r / f64::from(n_right)) * inv_n;
                let p = v * inv_n;
                parent += p * p;
            }

            let gain = (children - parent) as f32;
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

    fn predict_leaf(&self, view: &TrainingView<'_, u32>, rows: &[u32]) -> f32 {
        majority_class(view, rows)
    }
}

// ============================================================================
// EntropyObjective
// ============================================================================

/// Information gain in bits, with `0 * log 0 == 0` guards.
///
/// ```text
/// gain = sum_c [ (l_c/n) log2(l_c/n_left)
///              + (r_c/n) log2(r_c/n_right)
///              - (v_c/n) log2(v_c/n) ]
/// ```
#[derive(Debug, Clone, Copy)]
pub struct EntropyObjective {
    guards: SplitGuards,
}

impl EntropyObjective {
    pub fn new(min_samples_leaf: u32, min_impurity_decrease: f32) -> Self {
        Self {
            guards: SplitGuards {
                min_samples_leaf,
                min_impurity_decrease,
            },
        }
    }
}

impl SplitObjective for EntropyObjective {
    type Label = u32;
    const USES_LABEL_SUMS: bool = false;

    fn accumulate(
        &self,
        hist: &mut HistSliceMut<'_>,
        view: &TrainingView<'_, u32>,
        rows: &[u32],
        col: usize,
    ) {
        accumulate_class_counts(hist, view, rows, col);
    }

    fn evaluate(
        &self,
        hist: &mut HistSliceMut<'_>,
        view: &TrainingView<'_, u32>,
        rows: &[u32],
        col: usize,
    ) -> SplitCandidate {
        let n_bins = view.cuts.n_bins();
        let stride = n_bins + 1;
        let counts = &mut *hist.counts;
        for class in 0..view.n_classes {
            prefix_sum_bins(&mut counts[class * stride..class * stride + n_bins], n_bins);
        }

        let n_samples = rows.len() as u32;
        let n = f64::from(n_samples);
        let mut best = SplitCandidate::none();

        for i in 0..n_bins {
            let mut n_left = 0u32;
            for class in 0..view.n_classes {
                n_left += counts[class * stride + i];
            }
            let n_right = n_samples - n_left;
            if n_left < self.guards.min_samples_leaf || n_right < self.guards.min_samples_leaf {
                continue;
            }

            let nl = f64::from(n_left);
            let nr = f64::from(n_right);
            let mut gain = 0.0f64;
            for class in 0..view.n_classes {
                let l = f64::from(counts[class * stride + i]);
                let v = f64::from(counts[class * stride + n_bins - 1]);
                let r = v - l;
                if l > 0.0 {
                    gain += (l / n) * (l / nl).log2();
                }
                if r > 0.0 {
                    gain += (r / n) * (r / nr).log2();
                }
                if v > 0.0 {
                    gain -= (v / n) * (v / n).log2();
                }
            }

            let gain = gain as f32;
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

    fn predict_leaf(&self, view: &TrainingView<'_, u32>, rows: &[u32]) -> f32 {
        majority_class(view, rows)
    }
}

// ============================================================================
// Tests
// ============================================================================
