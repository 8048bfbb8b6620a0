//! Error types for tree building.

/// Errors surfaced by tree building.
///
/// Misconfiguration is rejected before any work is enqueued, so a failed
/// call never leaves a partially grown tree behind. Structural exhaustion
/// (hitting `max_leaves` or the node reservation mid-build) is not an
/// error; the remaining frontier is converted to leaves instead.
#[derive(Debug, thiserror::Error)]
pub enum TrainError {
    #[error("input matrix must be column-major")]
    RowMajorInput,

    #[error("quantile edges are required but were not provided")]
    MissingQuantiles,

    #[error("quantile edges have {got} columns, input has {expected}")]
    QuantileShapeMismatch { expected: usize, got: usize },

    #[error("quantile computation failed for column {0}: non-finite values")]
    QuantileFailed(usize),

    #[error("invalid class count {0}: at least 1 class is required")]
    InvalidClassCount(usize),

    #[error("invalid bin count {0}: at least 1 bin is required")]
    InvalidBinCount(usize),

    #[error("label count {got} does not match row count {expected}")]
    LabelCountMismatch { expected: usize, got: usize },

    #[error("invalid parameter `{name}`: {reason}")]
    BadParam {
        name: &'static str,
        reason: String,
    },

    #[error("workspace too small: layout needs {needed} bytes, workspace holds {got}")]
    WorkspaceTooSmall { needed: usize, got: usize },

    #[error("no sampled rows to train on")]
    EmptySample,

    #[error("no sampled columns to train on")]
    EmptyColumnSample,
}
