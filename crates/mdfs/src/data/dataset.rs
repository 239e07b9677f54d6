//! Discretised dataset: the read-only input of the gain computation.

use crate::data::discretize::{discretize_column, DiscretizationSpec};
use crate::data::matrix::ColMatrix;
use crate::utils::Parallelism;

/// Discretised feature tensor plus decision summary.
///
/// Stores `[variable][discretization][object]` bytes: the object run of
/// one variable in one replicate is contiguous, which is what the
/// per-object counting loop of the kernel streams over. Built once from
/// the raw column matrix, immutable afterwards.
///
/// # Example
///
/// ```
/// use mdfs::data::{ColMatrix, DiscretizationSpec, DiscretizedDataset};
/// use mdfs::Parallelism;
///
/// let raw = ColMatrix::from_vec(vec![0.0, 1.0, 2.0, 3.0, 3.0, 2.0, 1.0, 0.0], 4, 2);
/// let spec = DiscretizationSpec::new(1, 2, 1, 0.0);
/// let dataset = DiscretizedDataset::discretize(&raw, &[0, 0, 1, 1], &spec, Parallelism::Sequential);
///
/// assert_eq!(dataset.n_variables(), 2);
/// assert_eq!(dataset.discretized(0, 0).len(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct DiscretizedDataset {
    /// `[variable][discretization][object]` bucket bytes.
    data: Vec<u8>,
    /// Per-object class labels (all zero in no-decision mode).
    decision: Vec<u8>,
    /// Objects per class; `class_counts[1] == 0` in no-decision mode.
    class_counts: [usize; 2],
    n_objects: usize,
    n_variables: usize,
    discretizations: usize,
    divisions: usize,
}

impl DiscretizedDataset {
    /// Discretise every `(variable, replicate)` pair of `raw`.
    ///
    /// Each variable is sorted once and reused across all its
    /// replicates; variables are independent, so the build runs under
    /// the `parallelism` hint.
    ///
    /// # Panics
    ///
    /// Panics if the decision length does not match the object count or
    /// a decision value is outside {0, 1}. The validated entry point
    /// ([`run`](crate::selection::run)) reports these as errors instead.
    pub fn discretize<S>(
        raw: &ColMatrix<f64, S>,
        decision: &[i32],
        spec: &DiscretizationSpec,
        parallelism: Parallelism,
    ) -> Self
    where
        S: AsRef<[f64]> + Sync,
    {
        let n_objects = raw.n_rows();
        let n_variables = raw.n_cols();
        assert_eq!(decision.len(), n_objects, "decision length mismatch");

        let block_len = spec.discretizations * n_objects;

        let blocks = parallelism.maybe_par_map(0..n_variables, |variable| {
            let values = raw.col_slice(variable);
            let mut sorted = values.to_vec();
            sorted.sort_by(|a, b| a.partial_cmp(b).expect("raw values must not be NaN"));

            let mut block = vec![0u8; block_len];
            for d in 0..spec.discretizations {
                discretize_column(
                    spec.seed,
                    d as u32,
                    variable as u32,
                    spec.divisions,
                    values,
                    &sorted,
                    spec.range,
                    &mut block[d * n_objects..(d + 1) * n_objects],
                );
            }
            block
        });

        let mut data = Vec::with_capacity(n_variables * block_len);
        for block in blocks {
            data.extend_from_slice(&block);
        }

        let mut class_counts = [0usize; 2];
        let decision: Vec<u8> = decision
            .iter()
            .map(|&label| {
                assert!(label == 0 || label == 1, "decision values must be 0 or 1");
                class_counts[label as usize] += 1;
                label as u8
            })
            .collect();

        Self {
            data,
            decision,
            class_counts,
            n_objects,
            n_variables,
            discretizations: spec.discretizations,
            divisions: spec.divisions,
        }
    }

    /// Build directly from pre-binned columns, single replicate.
    #[cfg(test)]
    pub(crate) fn from_buckets(columns: &[&[u8]], decision: &[i32], divisions: usize) -> Self {
        let n_objects = columns[0].len();
        let mut data = Vec::with_capacity(columns.len() * n_objects);
        for column in columns {
            assert_eq!(column.len(), n_objects);
            data.extend_from_slice(column);
        }
        let mut class_counts = [0usize; 2];
        let decision: Vec<u8> = decision
            .iter()
            .map(|&label| {
                class_counts[label as usize] += 1;
                label as u8
            })
            .collect();
        Self {
            data,
            decision,
            class_counts,
            n_objects,
            n_variables: columns.len(),
            discretizations: 1,
            divisions,
        }
    }

    /// Buckets of one variable in one replicate, `n_objects` bytes.
    #[inline]
    pub fn discretized(&self, variable: usize, discretization: usize) -> &[u8] {
        let offset = (variable * self.discretizations + discretization) * self.n_objects;
        &self.data[offset..offset + self.n_objects]
    }

    /// Per-object class labels.
    #[inline]
    pub fn decision(&self) -> &[u8] {
        &self.decision
    }

    /// Objects per class.
    #[inline]
    pub fn class_counts(&self) -> [usize; 2] {
        self.class_counts
    }

    /// 2 in decision mode, 1 when the decision is all-zero.
    #[inline]
    pub fn n_classes(&self) -> usize {
        if self.class_counts[1] > 0 {
            2
        } else {
            1
        }
    }

    #[inline]
    pub fn n_objects(&self) -> usize {
        self.n_objects
    }

    #[inline]
    pub fn n_variables(&self) -> usize {
        self.n_variables
    }

    #[inline]
    pub fn discretizations(&self) -> usize {
        self.discretizations
    }

    #[inline]
    pub fn divisions(&self) -> usize {
        self.divisions
    }

    /// Size of the per-variable bucket alphabet, `divisions + 1`.
    #[inline]
    pub fn n_levels(&self) -> usize {
        self.divisions + 1
    }
}
