//! Configuration for an information-gain computation.

use bon::Builder;

use crate::error::MdfsError;

// =============================================================================
// Output Mode
// =============================================================================

/// Shape of the aggregated result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Per-variable running maximum over all tuples and replicates.
    #[default]
    MaxIg,
    /// Per-variable minimum across tuples within a replicate, maximised
    /// over replicates ("the gain that remains regardless of replicate").
    MinIg,
    /// Every (tuple, focal variable) whose gain clears the threshold,
    /// keeping the best replicate per key.
    MatchingTuples,
    /// Dense variable-by-variable running-max matrix; two-variable
    /// tuples only.
    AllPairs,
}

// =============================================================================
// Configuration
// =============================================================================

/// Parameters of a gain computation.
///
/// Use the builder for construction:
///
/// ```
/// use mdfs::MdfsConfig;
///
/// let config = MdfsConfig::builder()
///     .dimensions(2)
///     .divisions(1)
///     .discretizations(30)
///     .seed(1234)
///     .range(0.5)
///     .build();
/// ```
#[derive(Clone, Debug, Builder)]
#[builder(derive(Clone, Debug))]
pub struct MdfsConfig {
    /// Tuple size `k` (1..=5).
    pub dimensions: usize,

    /// Number of thresholds per variable; each variable maps into
    /// `divisions + 1` ordinal buckets (default: 1).
    #[builder(default = 1)]
    pub divisions: usize,

    /// Number of independent discretisation replicates (default: 1).
    #[builder(default = 1)]
    pub discretizations: usize,

    /// Seed of the discretisation threshold stream.
    #[builder(default = 0)]
    pub seed: u32,

    /// Threshold jitter in [0, 1]; 0 means rank-equidistant thresholds
    /// (default: 0.0).
    #[builder(default = 0.0)]
    pub range: f64,

    /// Additive per-class smoothing applied to every joint bucket
    /// (default: 0.25).
    #[builder(default = 0.25)]
    pub pseudo: f64,

    /// Gain threshold for [`OutputMode::MatchingTuples`]; values <= 0
    /// mean "no threshold" (default: 0.0).
    #[builder(default = 0.0)]
    pub ig_threshold: f64,

    /// Restrict the enumeration to tuples touching these variables.
    /// Must be sorted and duplicate-free; empty means no restriction.
    #[builder(default)]
    pub interesting_vars: Vec<usize>,

    /// With a non-empty `interesting_vars`: require every interesting
    /// variable in the tuple instead of at least one (default: false).
    #[builder(default = false)]
    pub require_all_vars: bool,

    /// Aggregation mode (default: [`OutputMode::MaxIg`]).
    #[builder(default)]
    pub output: OutputMode,

    /// Record, per variable, the tuple and replicate achieving its
    /// best gain (default: false; `MaxIg`/`MinIg` only).
    #[builder(default = false)]
    pub return_tuples: bool,

    /// Per-variable lower-order gains enabling the two-variable
    /// incremental path: `I(Y; X_i)` in decision mode, `H(X_i)` in
    /// no-decision mode. Length must equal the variable count.
    pub lower_gains: Option<Vec<f64>>,

    /// Worker threads: 0 = auto, 1 = sequential, n = exactly n.
    #[builder(default = 0)]
    pub n_threads: usize,
}

impl MdfsConfig {
    /// Check every data-independent parameter.
    ///
    /// Shape checks against the actual input run in
    /// [`run`](crate::selection::run).
    pub fn validate(&self) -> Result<(), MdfsError> {
        if self.dimensions < 1 || self.dimensions > crate::MAX_DIMENSIONS {
            return Err(MdfsError::DimensionsOutOfRange(self.dimensions));
        }
        if self.divisions < 1 || self.divisions > 255 {
            return Err(MdfsError::DivisionsOutOfRange(self.divisions));
        }
        if self.discretizations < 1 {
            return Err(MdfsError::NoDiscretizations);
        }
        if !(0.0..=1.0).contains(&self.range) || self.range.is_nan() {
            return Err(MdfsError::RangeOutOfRange(self.range));
        }
        if !(self.pseudo > 0.0) {
            return Err(MdfsError::PseudoOutOfRange(self.pseudo));
        }
        if self.output == OutputMode::AllPairs && self.dimensions != 2 {
            return Err(MdfsError::AllPairsRequiresPairs(self.dimensions));
        }
        if self.lower_gains.is_some() && self.dimensions != 2 {
            return Err(MdfsError::LowerGainsRequirePairs(self.dimensions));
        }
        Ok(())
    }

    /// The matching-tuple threshold with "unset" mapped to negative
    /// infinity, so rounding-induced negative gains still pass when no
    /// filter was requested.
    pub(crate) fn effective_ig_threshold(&self) -> f32 {
        if self.ig_threshold > 0.0 {
            self.ig_threshold as f32
        } else {
            f32::NEG_INFINITY
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn base() -> MdfsConfig {
        MdfsConfig::builder().dimensions(2).build()
    }

    #[test]
    fn builder_defaults() {
        let config = base();
        assert_eq!(config.divisions, 1);
        assert_eq!(config.discretizations, 1);
        assert_eq!(config.range, 0.0);
        assert_eq!(config.pseudo, 0.25);
        assert_eq!(config.output, OutputMode::MaxIg);
        assert!(config.interesting_vars.is_empty());
        assert!(config.lower_gains.is_none());
        assert!(config.validate().is_ok());
    }

    #[rstest]
    #[case(0)]
    #[case(6)]
    fn rejects_dimensions(#[case] dimensions: usize) {
        let config = MdfsConfig::builder().dimensions(dimensions).build();
        assert!(matches!(config.validate(), Err(MdfsError::DimensionsOutOfRange(_))));
    }

    #[rstest]
    #[case(0)]
    #[case(256)]
    fn rejects_divisions(#[case] divisions: usize) {
        let config = MdfsConfig::builder().dimensions(2).divisions(divisions).build();
        assert!(matches!(config.validate(), Err(MdfsError::DivisionsOutOfRange(_))));
    }

    #[rstest]
    #[case(-0.1)]
    #[case(1.1)]
    #[case(f64::NAN)]
    fn rejects_range(#[case] range: f64) {
        let config = MdfsConfig::builder().dimensions(2).range(range).build();
        assert!(matches!(config.validate(), Err(MdfsError::RangeOutOfRange(_))));
    }

    #[rstest]
    #[case(0.0)]
    #[case(-1.0)]
    #[case(f64::NAN)]
    fn rejects_pseudo(#[case] pseudo: f64) {
        let config = MdfsConfig::builder().dimensions(2).pseudo(pseudo).build();
        assert!(matches!(config.validate(), Err(MdfsError::PseudoOutOfRange(_))));
    }

    #[test]
    fn rejects_zero_discretizations() {
        let config = MdfsConfig::builder().dimensions(2).discretizations(0).build();
        assert!(matches!(config.validate(), Err(MdfsError::NoDiscretizations)));
    }

    #[test]
    fn all_pairs_requires_two_dimensions() {
        let config = MdfsConfig::builder()
            .dimensions(3)
            .output(OutputMode::AllPairs)
            .build();
        assert!(matches!(config.validate(), Err(MdfsError::AllPairsRequiresPairs(3))));
    }

    #[test]
    fn lower_gains_require_two_dimensions() {
        let config = MdfsConfig::builder()
            .dimensions(1)
            .lower_gains(vec![0.0; 4])
            .build();
        assert!(matches!(config.validate(), Err(MdfsError::LowerGainsRequirePairs(1))));
    }

    #[test]
    fn threshold_below_zero_means_unset() {
        let config = MdfsConfig::builder().dimensions(2).ig_threshold(-1.0).build();
        assert_eq!(config.effective_ig_threshold(), f32::NEG_INFINITY);

        let config = MdfsConfig::builder().dimensions(2).ig_threshold(0.5).build();
        assert_eq!(config.effective_ig_threshold(), 0.5);
    }
}
