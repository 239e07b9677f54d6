//! mdfs: multidimensional feature selection for Rust.
//!
//! Computes, for every strictly increasing k-tuple of variables of a
//! numeric data matrix, how much information the tuple carries about a
//! binary decision beyond what its sub-tuples already carry, across
//! repeated stochastic discretisations, and aggregates the per-tuple
//! gains into per-variable summaries.
//!
//! # Key Types
//!
//! - [`run`] - validate, discretise and compute in one call
//! - [`MdfsConfig`] - configuration builder
//! - [`MdfsOutput`] - tagged result (max/min gains, matching tuples, pair matrix)
//! - [`data::DiscretizedDataset`] - prebuilt input for repeated runs via [`selection::compute`]
//!
//! # Example
//!
//! ```
//! use mdfs::data::ColMatrix;
//! use mdfs::{run, MdfsConfig, OutputMode};
//!
//! // 4 objects, 2 variables, column-major
//! let data = ColMatrix::from_vec(vec![0.0, 1.0, 2.0, 3.0, 3.0, 2.0, 1.0, 0.0], 4, 2);
//! let decision = [0, 0, 1, 1];
//!
//! let config = MdfsConfig::builder()
//!     .dimensions(2)
//!     .divisions(1)
//!     .pseudo(0.001)
//!     .output(OutputMode::MaxIg)
//!     .build();
//!
//! let output = run(&config, &data, &decision).unwrap();
//! let gains = output.variable_gains().unwrap().gains();
//! assert_eq!(gains.len(), 2);
//! ```

// Re-export approx traits for users who want to compare gains
pub use approx;

pub mod data;
pub mod selection;
pub mod utils;

mod config;
mod error;

/// Largest supported tuple size.
pub const MAX_DIMENSIONS: usize = 5;

// =============================================================================
// Convenience Re-exports
// =============================================================================

// Entry points
pub use selection::{compute, run};

// Configuration
pub use config::{MdfsConfig, OutputMode};

// Results
pub use selection::{MatchingTuples, MdfsOutput, PairGains, TupleList, VariableGains};

// Errors
pub use error::{ErrorKind, MdfsError};

// Shared utilities
pub use utils::{run_with_threads, Parallelism};
