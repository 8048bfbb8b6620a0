//! Quantile bin edges and value-to-bin lookup.
//!
//! # Overview
//!
//! Split candidates are evaluated at quantile boundaries, never at raw
//! feature values. [`BinCuts`] holds the per-column upper bin edges
//! (column-major, `n_bins x n_cols`) and maps a feature value to the bin
//! containing it. [`QuantileCuts`] is the collaborator-side provider that
//! computes the edge matrix from a training matrix once, before any tree is
//! grown; the builder itself never recomputes quantiles.
//!
//! A value `v` belongs to bin `b` when `edges[b-1] < v <= edges[b]`, with
//! values above the last edge clamped into the last bin.

use super::matrix::ColMatrix;
use crate::error::TrainError;

// ============================================================================
// BinCuts
// ============================================================================

/// Per-column quantile bin edges, column-major `n_bins x n_cols`.
///
/// `edge(col, b)` is the inclusive upper boundary of bin `b` for `col`.
/// Edges must be non-decreasing within a column; the builder relies on that
/// monotonicity when bisecting.
#[derive(Debug, Clone)]
pub struct BinCuts {
    /// `edges[col * n_bins + b]`
    edges: Vec<f32>,
    n_bins: usize,
    n_cols: usize,
}

impl BinCuts {
    /// Create cuts from a column-major edge matrix.
    ///
    /// # Panics
    ///
    /// Panics if `edges.len() != n_bins * n_cols`.
    pub fn new(edges: Vec<f32>, n_bins: usize, n_cols: usize) -> Self {
        assert_eq!(
            edges.len(),
            n_bins * n_cols,
            "edge matrix length {} does not match {}x{}",
            edges.len(),
            n_bins,
            n_cols
        );
        Self {
            edges,
            n_bins,
            n_cols,
        }
    }

    /// Bins per column.
    #[inline]
    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    /// Number of columns covered.
    #[inline]
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Upper edges for one column.
    #[inline]
    pub fn column_edges(&self, col: usize) -> &[f32] {
        let start = col * self.n_bins;
        &self.edges[start..start + self.n_bins]
    }

    /// Upper edge of one bin.
    #[inline]
    pub fn edge(&self, col: usize, bin: usize) -> f32 {
        debug_assert!(bin < self.n_bins);
        self.edges[col * self.n_bins + bin]
    }

    /// Map a feature value to its bin index.
    ///
    /// Bisects the column's edge slice for the first edge `>= value`;
    /// values above every edge are clamped into the last bin.
    #[inline]
    pub fn bin(&self, col: usize, value: f32) -> usize {
        let edges = self.column_edges(col);
        edges.partition_point(|&e| e < value).min(self.n_bins - 1)
    }
}

// ============================================================================
// QuantileCuts (provider)
// ============================================================================

/// Quantile edge provider.
///
/// Computes `n_bins` upper edges per column so that bins hold roughly equal
/// numbers of training values. The last edge of every column is the column
/// maximum, so every value lands in a bin.
pub struct QuantileCuts;

impl QuantileCuts {
    /// Compute the `n_bins x n_cols` edge matrix for a training matrix.
    ///
    /// # Errors
    ///
    /// - [`TrainError::InvalidBinCount`] when `n_bins == 0`.
    /// - [`TrainError::QuantileFailed`] when a column contains non-finite
    ///   values; edges over NaN or infinity would break monotonicity.
    pub fn from_matrix(data: &ColMatrix<'_>, n_bins: usize) -> Result<BinCuts, TrainError> {
        if n_bins == 0 {
            return Err(TrainError::InvalidBinCount(n_bins));
        }

        let n_rows = data.n_rows();
        let n_cols = data.n_cols();
        let mut edges = Vec::with_capacity(n_bins * n_cols);
        let mut sorted = Vec::with_capacity(n_rows);

        for col in 0..n_cols {
            let column = data.column(col);
            if column.iter().any(|v| !v.is_finite()) {
                return Err(TrainError::QuantileFailed(col));
            }

            sorted.clear();
            sorted.extend_from_slice(column);
            sorted.sort_unstable_by(|a, b| a.total_cmp(b));

            for b in 0..n_bins {
                // Edge b sits at the (b+1)/n_bins quantile of the column.
                let pos = ((b + 1) * n_rows).div_ceil(n_bins);
                let idx = pos.saturating_sub(1).min(n_rows.saturating_sub(1));
                edges.push(if n_rows == 0 { 0.0 } else { sorted[idx] });
            }
        }

        Ok(BinCuts::new(edges, n_bins, n_cols))
    }
}

// ============================================================================
// Tests
// ============================================================================
