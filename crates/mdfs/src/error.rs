//! Error types for the entry-point validation.
//!
//! All failures are detected synchronously before any worker is spawned;
//! the compute itself never reports errors and never yields a partial
//! result.

// =============================================================================
// Error Kind
// =============================================================================

/// Coarse classification of validation failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The shapes of the supplied arrays are inconsistent with each other
    /// or with the requested tuple size.
    InputShape,
    /// A scalar parameter is outside its legal interval.
    ParameterRange,
    /// The requested output mode or auxiliary input is unsupported for
    /// this combination of decision classes and tuple size.
    ModeMismatch,
}

// =============================================================================
// Error Type
// =============================================================================

/// Validation error raised by [`run`](crate::selection::run) before any
/// computation starts.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MdfsError {
    /// Tuple size must be in 1..=5.
    #[error("dimensions must be in 1..=5, got {0}")]
    DimensionsOutOfRange(usize),

    /// Need at least as many variables as tuple positions.
    #[error("need at least {dimensions} variables, got {variables}")]
    TooFewVariables { variables: usize, dimensions: usize },

    /// Need at least two objects to discretise.
    #[error("need at least 2 objects, got {0}")]
    TooFewObjects(usize),

    /// Decision vector length must match the object count.
    #[error("decision length {decision} does not match object count {objects}")]
    DecisionLengthMismatch { decision: usize, objects: usize },

    /// Decision values are restricted to 0 and 1.
    #[error("decision values must be 0 or 1, got {0}")]
    DecisionValueOutOfRange(i32),

    /// A decision with class 1 present but class 0 absent has no contrast.
    #[error("decision contains class 1 only; an all-zero decision selects the no-decision mode")]
    SingleClassDecision,

    /// Interesting variables must be sorted, unique and within range.
    #[error("interesting_vars must be sorted, unique and below the variable count (offending id {0})")]
    InvalidInterestingVars(usize),

    /// Lower-order gains must cover every variable.
    #[error("lower_gains must have length {expected}, got {got}")]
    LowerGainsLengthMismatch { expected: usize, got: usize },

    /// divisions must fit the byte-sized bucket alphabet.
    #[error("divisions must be in 1..=255, got {0}")]
    DivisionsOutOfRange(usize),

    /// At least one discretisation replicate is required.
    #[error("discretizations must be >= 1")]
    NoDiscretizations,

    /// range controls the threshold jitter and must stay in [0, 1].
    #[error("range must be in [0, 1], got {0}")]
    RangeOutOfRange(f64),

    /// The pseudocount keeps every histogram cell positive.
    #[error("pseudo must be > 0, got {0}")]
    PseudoOutOfRange(f64),

    /// The pair matrix is only defined for two-variable tuples.
    #[error("the AllPairs output requires dimensions == 2, got {0}")]
    AllPairsRequiresPairs(usize),

    /// Lower-order gains only feed the two-variable fast path.
    #[error("lower_gains are only supported for dimensions == 2, got {0}")]
    LowerGainsRequirePairs(usize),
}

impl MdfsError {
    /// The coarse classification of this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DimensionsOutOfRange(_)
            | Self::TooFewVariables { .. }
            | Self::TooFewObjects(_)
            | Self::DecisionLengthMismatch { .. }
            | Self::DecisionValueOutOfRange(_)
            | Self::SingleClassDecision
            | Self::InvalidInterestingVars(_)
            | Self::LowerGainsLengthMismatch { .. } => ErrorKind::InputShape,

            Self::DivisionsOutOfRange(_)
            | Self::NoDiscretizations
            | Self::RangeOutOfRange(_)
            | Self::PseudoOutOfRange(_) => ErrorKind::ParameterRange,

            Self::AllPairsRequiresPairs(_) | Self::LowerGainsRequirePairs(_) => {
                ErrorKind::ModeMismatch
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_cover_all_variants() {
        assert_eq!(MdfsError::DimensionsOutOfRange(9).kind(), ErrorKind::InputShape);
        assert_eq!(MdfsError::RangeOutOfRange(1.5).kind(), ErrorKind::ParameterRange);
        assert_eq!(MdfsError::AllPairsRequiresPairs(3).kind(), ErrorKind::ModeMismatch);
    }

    #[test]
    fn messages_carry_values() {
        let err = MdfsError::DecisionLengthMismatch { decision: 3, objects: 5 };
        assert_eq!(err.to_string(), "decision length 3 does not match object count 5");
    }
}
