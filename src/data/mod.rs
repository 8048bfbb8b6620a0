//! Training data access: matrices, quantile bins, and the input view.

mod matrix;
mod quantize;
mod view;

pub use matrix::{ColMatrix, DataLayout};
pub use quantize::{BinCuts, QuantileCuts};
pub use view::{Label, TrainingView};
