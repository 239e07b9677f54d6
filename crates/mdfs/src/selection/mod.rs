//! The gain computation: tuple enumeration, the entropy kernel and the
//! parallel aggregation of per-tuple results.

mod counters;
mod entropy;
mod kernel;
mod output;
mod runner;
mod tuples;

pub use output::{MatchingTuples, MdfsOutput, PairGains, TupleList, VariableGains};
pub use runner::{compute, run};
pub use tuples::TupleGenerator;
