//! Read-only view over the sampled, quantized training inputs.

use super::matrix::ColMatrix;
use super::quantize::BinCuts;
use crate::error::TrainError;

/// Marker for types usable as training labels.
///
/// Classification trains against `u32` class ids, regression against `f32`
/// targets. Nothing else qualifies.
pub trait Label: Copy + Send + Sync + 'static {}

impl Label for u32 {}
impl Label for f32 {}

/// Immutable descriptor over the training matrix, labels and bin edges.
///
/// Bound once per tree build. The view owns nothing and performs no work;
/// it validates the collaborator contract up front so the builder can
/// assume a consistent shape everywhere else.
///
/// The sampled row ids are deliberately *not* part of the view: the builder
/// reorders them in place while growing, so they travel as a separate
/// mutable borrow.
#[derive(Debug, Clone, Copy)]
pub struct TrainingView<'a, L: Label> {
    /// Column-major feature matrix, `n_rows x n_cols`.
    pub data: ColMatrix<'a>,
    /// One label per matrix row.
    pub labels: &'a [L],
    /// Quantile upper edges, `n_bins x n_cols`.
    pub cuts: &'a BinCuts,
    /// Distinct class count; 1 for regression.
    pub n_classes: usize,
}

impl<'a, L: Label> TrainingView<'a, L> {
    /// Bind a view, validating the collaborator contract.
    ///
    /// # Errors
    ///
    /// - [`TrainError::QuantileShapeMismatch`] when the edge matrix does not
    ///   cover every input column.
    /// - [`TrainError::InvalidClassCount`] when `n_classes < 1`.
    /// - [`TrainError::InvalidBinCount`] when the cuts carry zero bins.
    /// - [`TrainError::LabelCountMismatch`] when labels and rows disagree.
    pub fn new(
        data: ColMatrix<'a>,
        labels: &'a [L],
        cuts: &'a BinCuts,
        n_classes: usize,
    ) -> Result<Self, TrainError> {
        if cuts.n_cols() != data.n_cols() {
            return Err(TrainError::QuantileShapeMismatch {
                expected: data.n_cols(),
                got: cuts.n_cols(),
            });
        }
        if cuts.n_bins() == 0 {
            return Err(TrainError::InvalidBinCount(0));
        }
        if n_classes < 1 {
            return Err(TrainError::InvalidClassCount(n_classes));
        }
        if labels.len() != data.n_rows() {
            return Err(TrainError::LabelCountMismatch {
                expected: data.n_rows(),
                got: labels.len(),
            });
        }
        Ok(Self {
            data,
            labels,
            cuts,
            n_classes,
        })
    }

    /// Bin index of one matrix cell.
    #[inline]
    pub fn bin(&self, row: usize, col: usize) -> usize {
        self.cuts.bin(col, self.data.get(row, col))
    }
}
