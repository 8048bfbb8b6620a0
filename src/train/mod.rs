//! Tree training: the batched driver and its supporting machinery.

mod builder;
pub mod histogram;
mod logger;
pub mod objectives;
mod partition;
mod search;
mod workspace;

pub use builder::{train_classifier, train_regressor, workspace_layout, TreeBuilder};
pub use logger::{TrainingLogger, Verbosity};
pub use objectives::{
    EntropyObjective, GiniObjective, MaeObjective, MseObjective, SplitGuards, SplitObjective,
};
pub use partition::stable_partition;
pub use search::search_column_block;
pub use workspace::{InputShape, TreeWorkspace, WorkspaceLayout, WORKSPACE_ALIGN};
