//! Raw-input carriers and the discretisation pipeline.
//!
//! The engine consumes a column-major `f64` matrix ([`ColMatrix`]) and a
//! per-object decision vector, quantises every column into a small
//! ordinal alphabet ([`discretize_column`]) and stores the result in a
//! read-only [`DiscretizedDataset`] shared by all workers.

mod dataset;
mod discretize;
mod matrix;

pub use dataset::DiscretizedDataset;
pub use discretize::{discretize_column, thresholds, DiscretizationSpec};
pub use matrix::{ColMajor, ColMatrix, DenseMatrix, Layout, RowMajor, RowMatrix};
