//! Per-tree row and column sampling.
//!
//! The builder consumes a sampled row permutation and column subset; this
//! module is the collaborator that produces them. Sampling is seeded from
//! `(seed, tree_id)` with a counter-style mix, so any tree of a forest can
//! be re-drawn independently without per-tree host state.

use rand::prelude::*;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// RNG for one tree, derived from the forest seed and the tree id.
fn tree_rng(seed: u64, tree_id: u64) -> Xoshiro256PlusPlus {
    let mixed = seed.wrapping_add(tree_id.wrapping_mul(0x9E3779B97F4A7C15));
    Xoshiro256PlusPlus::seed_from_u64(mixed)
}

/// Sample `k` items from `0..n` without replacement via partial
/// Fisher-Yates; returned sorted for cache-friendly access.
fn sample_without_replacement(n: usize, k: usize, rng: &mut Xoshiro256PlusPlus) -> Vec<u32> {
    debug_assert!(k <= n);
    let mut indices: Vec<u32> = (0..n as u32).collect();
    for i in 0..k {
        let j = rng.gen_range(i..n);
        indices.swap(i, j);
    }
    let mut sampled = indices[..k].to_vec();
    sampled.sort_unstable();
    sampled
}

// ============================================================================
// RowSampler
// ============================================================================

/// Draws the per-tree row set.
#[derive(Debug, Clone, Copy)]
pub struct RowSampler {
    /// Sample with replacement (bagging) instead of a plain subset.
    pub bootstrap: bool,
}

impl RowSampler {
    /// Draw `n_samples` row ids from `0..n_rows`.
    ///
    /// With `bootstrap` the draw is with replacement, so duplicates are
    /// expected; without it the draw is a subset (identity when
    /// `n_samples >= n_rows`).
    pub fn sample(&self, n_rows: usize, n_samples: usize, seed: u64, tree_id: u64) -> Vec<u32> {
        let mut rng = tree_rng(seed, tree_id);
        if self.bootstrap {
            (0..n_samples)
                .map(|_| rng.gen_range(0..n_rows) as u32)
                .collect()
        } else if n_samples >= n_rows {
            (0..n_rows as u32).collect()
        } else {
            sample_without_replacement(n_rows, n_samples, &mut rng)
        }
    }
}

// ============================================================================
// ColumnSampler
// ============================================================================

/// Draws the per-tree column subset.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSampler {
    /// Fraction of columns drawn per tree, in `(0, 1]`.
    pub max_features: f32,
    /// Draw columns with replacement. Duplicate ids are kept; a repeated
    /// column just proposes the same candidates again.
    pub bootstrap_features: bool,
}

impl ColumnSampler {
    /// Draw `ceil(max_features * n_cols)` column ids, sorted.
    pub fn sample(&self, n_cols: usize, seed: u64, tree_id: u64) -> Vec<u32> {
        let k = ((n_cols as f32 * self.max_features).ceil() as usize).clamp(1, n_cols);
        // Offset the stream so row and column draws never share state.
        let mut rng = tree_rng(seed ^ 0x517C_C1B7_2722_0A95, tree_id);
        if self.bootstrap_features {
            let mut cols: Vec<u32> = (0..k).map(|_| rng.gen_range(0..n_cols) as u32).collect();
            cols.sort_unstable();
            cols
        } else if k == n_cols {
            (0..n_cols as u32).collect()
        } else {
            sample_without_replacement(n_cols, k, &mut rng)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
