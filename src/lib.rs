//! timber-rs: a batched level-wise decision-tree builder for random forests.
//!
//! This crate grows one decision tree at a time, expanding every frontier
//! node of a level in the same pass over pre-quantized training data.
//! Split finding is histogram-based: per (node, column) bin statistics are
//! filled in parallel and reduced to one best split per node under a
//! deterministic tie-break order. All build-time buffers come from a
//! pre-sized, caller-owned workspace, so growth allocates nothing.
//!
//! Forest-level concerns (bagging across trees, aggregating predictions)
//! live with the caller; this crate supplies the per-tree builder plus the
//! collaborators it consumes: a quantile provider and per-tree samplers.

pub mod config;
pub mod data;
pub mod error;
pub mod sampling;
pub mod train;
pub mod tree;

pub use config::{DecisionTreeParams, SplitCriterion};
pub use error::TrainError;
pub use train::{
    train_classifier, train_regressor, workspace_layout, InputShape, TreeBuilder, TreeWorkspace,
    Verbosity, WorkspaceLayout,
};
pub use tree::{Node, SplitCandidate, Tree};
