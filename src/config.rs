//! Tree building configuration.
//!
//! [`DecisionTreeParams`] carries every knob the builder recognizes. Use
//! struct construction with `..Default::default()` for convenient
//! configuration:
//!
//! ```
//! use timber_rs::config::{DecisionTreeParams, SplitCriterion};
//!
//! let params = DecisionTreeParams {
//!     max_depth: 8,
//!     n_bins: 32,
//!     split_criterion: SplitCriterion::Entropy,
//!     ..Default::default()
//! };
//! assert!(params.validate().is_ok());
//! ```

use crate::error::TrainError;
use crate::train::Verbosity;

// ============================================================================
// SplitCriterion
// ============================================================================

/// Impurity criterion used to score candidate splits.
///
/// `Gini` and `Entropy` apply to classification, `Mse` and `Mae` to
/// regression. The criterion selects a monomorphized grow path; there is no
/// dynamic dispatch in the split-search loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitCriterion {
    /// Gini impurity (classification).
    #[default]
    Gini,
    /// Information gain in bits (classification).
    Entropy,
    /// Mean squared error (regression).
    Mse,
    /// Mean absolute error (regression). Needs a second histogram pass.
    Mae,
}

impl SplitCriterion {
    /// Whether this criterion scores class-count histograms.
    #[inline]
    pub fn is_classification(self) -> bool {
        matches!(self, SplitCriterion::Gini | SplitCriterion::Entropy)
    }

    /// Whether this criterion scores label-sum histograms.
    #[inline]
    pub fn is_regression(self) -> bool {
        !self.is_classification()
    }
}

// ============================================================================
// DecisionTreeParams
// ============================================================================

/// Parameters for a single tree build.
///
/// The structural limits (`max_depth`, `max_leaves`, `min_samples_split`,
/// `min_samples_leaf`) are checked at split-application time; hitting one
/// converts the node into a leaf rather than failing the build.
#[derive(Debug, Clone)]
pub struct DecisionTreeParams {
    /// Hard cap on node depth. Depth 0 means the tree is just the root leaf.
    pub max_depth: u32,
    /// Cap on the total number of leaves. `-1` disables the cap.
    pub max_leaves: i64,
    /// Upper bound on frontier nodes processed per batch.
    pub max_batch_size: usize,
    /// Number of histogram bins per column.
    pub n_bins: usize,
    /// Minimum sample count required to attempt a split.
    pub min_samples_split: u32,
    /// Minimum sample count required in each child.
    pub min_samples_leaf: u32,
    /// Minimum gain required to accept a split.
    pub min_impurity_decrease: f32,
    /// Impurity criterion.
    pub split_criterion: SplitCriterion,
    /// Fraction of columns sampled per tree, in `(0, 1]`. Applied by the
    /// per-tree sampler, not by the builder itself.
    pub max_features: f32,
    /// Sample rows with replacement when drawing the per-tree row set.
    pub bootstrap: bool,
    /// Sample columns with replacement. Consumed by the per-tree sampler;
    /// the builder itself ignores it.
    pub bootstrap_features: bool,
    /// Recompute quantile edges per tree instead of once per forest.
    /// Consumed by the quantile provider; the builder itself ignores it.
    pub quantile_per_tree: bool,
    /// Worker threads for the search grid. `0` uses rayon's global pool.
    pub n_threads: usize,
    /// Progress reporting level.
    pub verbosity: Verbosity,
}

impl Default for DecisionTreeParams {
    fn default() -> Self {
        Self {
            max_depth: 16,
            max_leaves: -1,
            max_batch_size: 4096,
            n_bins: 128,
            min_samples_split: 2,
            min_samples_leaf: 1,
            min_impurity_decrease: 0.0,
            split_criterion: SplitCriterion::default(),
            max_features: 1.0,
            bootstrap: true,
            bootstrap_features: false,
            quantile_per_tree: false,
            n_threads: 0,
            verbosity: Verbosity::Silent,
        }
    }
}

impl DecisionTreeParams {
    /// Validate the configuration.
    ///
    /// Fails fast on misconfiguration so no work is started with bad
    /// parameters.
    pub fn validate(&self) -> Result<(), TrainError> {
        if self.max_batch_size == 0 {
            return Err(bad_param("max_batch_size", "must be positive"));
        }
        if self.n_bins == 0 {
            return Err(TrainError::InvalidBinCount(self.n_bins));
        }
        if self.min_samples_split < 2 {
            return Err(bad_param("min_samples_split", "must be at least 2"));
        }
        if self.min_samples_leaf < 1 {
            return Err(bad_param("min_samples_leaf", "must be at least 1"));
        }
        if !self.min_impurity_decrease.is_finite() || self.min_impurity_decrease < 0.0 {
            return Err(bad_param(
                "min_impurity_decrease",
                "must be finite and non-negative",
            ));
        }
        if !(self.max_features > 0.0 && self.max_features <= 1.0) {
            return Err(bad_param("max_features", "must be in (0, 1]"));
        }
        if self.max_leaves == 0 || self.max_leaves < -1 {
            return Err(bad_param("max_leaves", "must be positive or -1"));
        }
        Ok(())
    }
}

fn bad_param(name: &'static str, reason: &str) -> TrainError {
    TrainError::BadParam {
        name,
        reason: reason.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================
