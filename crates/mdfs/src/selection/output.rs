//! Aggregated result containers.
//!
//! One tagged container replaces a union over the four output shapes;
//! the worker pool funnels every accepted `(tuple, gains, replicate)`
//! triple through [`MdfsOutput::update`] under the aggregator lock.
//! Every update is a commutative fold (running max/min, upsert-by-max,
//! max into a matrix cell), so worker interleaving cannot change the
//! aggregate values.

use std::collections::BTreeMap;

use ndarray::Array2;

// =============================================================================
// Per-variable gains (MaxIg / MinIg)
// =============================================================================

/// Per-variable running best gain, with optional provenance records.
#[derive(Debug, Clone)]
pub struct VariableGains {
    gains: Vec<f32>,
    /// Row-major `n_variables x dimensions` tuple records.
    best_tuples: Option<Vec<i32>>,
    best_discretizations: Option<Vec<i32>>,
    dimensions: usize,
}

impl VariableGains {
    /// Negative infinity keeps rounding-negative gains representable.
    pub(crate) fn for_max(n_variables: usize, dimensions: usize, record_tuples: bool) -> Self {
        Self::with_init(n_variables, dimensions, record_tuples, f32::NEG_INFINITY)
    }

    pub(crate) fn for_min(n_variables: usize, dimensions: usize, record_tuples: bool) -> Self {
        Self::with_init(n_variables, dimensions, record_tuples, f32::INFINITY)
    }

    fn with_init(n_variables: usize, dimensions: usize, record_tuples: bool, init: f32) -> Self {
        Self {
            gains: vec![init; n_variables],
            best_tuples: record_tuples.then(|| vec![-1; n_variables * dimensions]),
            best_discretizations: record_tuples.then(|| vec![-1; n_variables]),
            dimensions,
        }
    }

    fn record(&mut self, variable: usize, tuple: &[usize], discretization: usize) {
        if let Some(tuples) = &mut self.best_tuples {
            let row = &mut tuples[variable * self.dimensions..(variable + 1) * self.dimensions];
            for (slot, &v) in row.iter_mut().zip(tuple) {
                *slot = v as i32;
            }
        }
        if let Some(discretizations) = &mut self.best_discretizations {
            discretizations[variable] = discretization as i32;
        }
    }

    pub(crate) fn update_max(&mut self, tuple: &[usize], igs: &[f32], discretization: usize) {
        for (position, &variable) in tuple.iter().enumerate() {
            if igs[position] > self.gains[variable] {
                self.gains[variable] = igs[position];
                self.record(variable, tuple, discretization);
            }
        }
    }

    pub(crate) fn update_min(&mut self, tuple: &[usize], igs: &[f32], discretization: usize) {
        for (position, &variable) in tuple.iter().enumerate() {
            if igs[position] < self.gains[variable] {
                self.gains[variable] = igs[position];
                self.record(variable, tuple, discretization);
            }
        }
    }

    /// Fold a per-replicate minimum into the global maximum-over-replicates.
    pub(crate) fn fold_max(&mut self, local: &VariableGains) {
        for variable in 0..self.gains.len() {
            if local.gains[variable] > self.gains[variable] {
                self.gains[variable] = local.gains[variable];
                if let (Some(into), Some(from)) = (&mut self.best_tuples, &local.best_tuples) {
                    let range = variable * self.dimensions..(variable + 1) * self.dimensions;
                    into[range.clone()].copy_from_slice(&from[range]);
                }
                if let (Some(into), Some(from)) =
                    (&mut self.best_discretizations, &local.best_discretizations)
                {
                    into[variable] = from[variable];
                }
            }
        }
    }

    /// The per-variable gains, widened to `f64`.
    pub fn gains(&self) -> Vec<f64> {
        self.gains.iter().map(|&g| g as f64).collect()
    }

    /// Row-major `n_variables x dimensions` best-tuple matrix, when
    /// recording was requested. Untouched variables keep `-1`.
    pub fn best_tuples(&self) -> Option<&[i32]> {
        self.best_tuples.as_deref()
    }

    /// Replicate id of each variable's best gain, when recording was
    /// requested.
    pub fn best_discretizations(&self) -> Option<&[i32]> {
        self.best_discretizations.as_deref()
    }
}

// =============================================================================
// Matching tuples
// =============================================================================

/// Aligned-arrays export of tuple-shaped results.
///
/// `tuples` is column-major over positions: entry `i` of position `j`
/// sits at `tuples[j * len + i]`, matching the output interface.
#[derive(Debug, Clone, PartialEq)]
pub struct TupleList {
    pub variables: Vec<i32>,
    pub gains: Vec<f64>,
    pub tuples: Vec<i32>,
}

/// Every (tuple, focal variable) whose gain cleared the threshold,
/// keeping the best replicate per key.
#[derive(Debug, Clone)]
pub struct MatchingTuples {
    /// `(tuple, focal variable) -> (gain, discretization)`; the ordered
    /// map makes the export deterministic regardless of worker
    /// interleaving.
    entries: BTreeMap<(Vec<usize>, usize), (f32, usize)>,
    dimensions: usize,
    threshold: f32,
    interesting_vars: Vec<usize>,
}

impl MatchingTuples {
    pub(crate) fn new(dimensions: usize, threshold: f32, interesting_vars: Vec<usize>) -> Self {
        Self {
            entries: BTreeMap::new(),
            dimensions,
            threshold,
            interesting_vars,
        }
    }

    pub(crate) fn update(&mut self, tuple: &[usize], igs: &[f32], discretization: usize) {
        for (position, &variable) in tuple.iter().enumerate() {
            if igs[position] <= self.threshold {
                continue;
            }
            if !self.interesting_vars.is_empty()
                && self.interesting_vars.binary_search(&variable).is_err()
            {
                continue;
            }
            let key = (tuple.to_vec(), variable);
            let value = (igs[position], discretization);
            self.entries
                .entry(key)
                .and_modify(|existing| {
                    if value.0 > existing.0 {
                        *existing = value;
                    }
                })
                .or_insert(value);
        }
    }

    /// Number of recorded (tuple, focal variable) entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries as `(tuple, focal variable, gain, discretization)`
    /// in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&[usize], usize, f64, usize)> + '_ {
        self.entries
            .iter()
            .map(|((tuple, variable), &(gain, discretization))| {
                (tuple.as_slice(), *variable, gain as f64, discretization)
            })
    }

    /// Export as three aligned arrays (see [`TupleList`]).
    pub fn to_list(&self) -> TupleList {
        let count = self.entries.len();
        let mut variables = Vec::with_capacity(count);
        let mut gains = Vec::with_capacity(count);
        let mut tuples = vec![0i32; count * self.dimensions];

        for (i, ((tuple, variable), (gain, _))) in self.entries.iter().enumerate() {
            variables.push(*variable as i32);
            gains.push(*gain as f64);
            for (j, &v) in tuple.iter().enumerate() {
                tuples[j * count + i] = v as i32;
            }
        }

        TupleList {
            variables,
            gains,
            tuples,
        }
    }
}

// =============================================================================
// All-pairs matrix
// =============================================================================

/// Dense variable-by-variable running-max gain matrix (pairs only).
///
/// Cell `(i, j)` holds the best gain attributed to variable `j` within
/// the tuple `(i, j)`; cells never touched (the diagonal in particular)
/// stay at negative infinity.
#[derive(Debug, Clone)]
pub struct PairGains {
    /// Row-major `n_variables x n_variables`.
    matrix: Vec<f32>,
    n_variables: usize,
}

impl PairGains {
    pub(crate) fn new(n_variables: usize) -> Self {
        Self {
            matrix: vec![f32::NEG_INFINITY; n_variables * n_variables],
            n_variables,
        }
    }

    pub(crate) fn update(&mut self, tuple: &[usize], igs: &[f32]) {
        debug_assert_eq!(tuple.len(), 2);
        let forward = tuple[0] * self.n_variables + tuple[1];
        let backward = tuple[1] * self.n_variables + tuple[0];
        if igs[0] > self.matrix[forward] {
            self.matrix[forward] = igs[0];
        }
        if igs[1] > self.matrix[backward] {
            self.matrix[backward] = igs[1];
        }
    }

    /// Gain of the ordered pair `(i, j)`.
    pub fn gain(&self, i: usize, j: usize) -> f64 {
        self.matrix[i * self.n_variables + j] as f64
    }

    /// The full matrix.
    pub fn to_matrix(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.n_variables, self.n_variables), |(i, j)| {
            self.gain(i, j)
        })
    }

    /// Aligned-arrays export with every unordered pair listed twice,
    /// once per focal variable.
    pub fn to_list(&self) -> TupleList {
        let count = self.n_variables * (self.n_variables - 1);
        let mut variables = Vec::with_capacity(count);
        let mut gains = Vec::with_capacity(count);
        let mut tuples = vec![0i32; count * 2];

        let mut entry = 0;
        for i in 0..self.n_variables {
            for j in (i + 1)..self.n_variables {
                for (focal, gain) in [(j, self.gain(i, j)), (i, self.gain(j, i))] {
                    variables.push(focal as i32);
                    gains.push(gain);
                    tuples[entry] = i as i32;
                    tuples[count + entry] = j as i32;
                    entry += 1;
                }
            }
        }

        TupleList {
            variables,
            gains,
            tuples,
        }
    }
}

// =============================================================================
// Tagged output container
// =============================================================================

/// The aggregated result of a run, tagged by output mode.
#[derive(Debug, Clone)]
pub enum MdfsOutput {
    MaxGains(VariableGains),
    MinGains(VariableGains),
    Matching(MatchingTuples),
    Pairs(PairGains),
}

impl MdfsOutput {
    /// Fold one accepted tuple result into the aggregate. Called under
    /// the aggregator lock; constant-time per tuple position.
    pub(crate) fn update(&mut self, tuple: &[usize], igs: &[f32], discretization: usize) {
        match self {
            Self::MaxGains(gains) => gains.update_max(tuple, igs, discretization),
            Self::MinGains(gains) => gains.update_min(tuple, igs, discretization),
            Self::Matching(matching) => matching.update(tuple, igs, discretization),
            Self::Pairs(pairs) => pairs.update(tuple, igs),
        }
    }

    /// Per-variable gains for the `MaxIg`/`MinIg` modes.
    pub fn variable_gains(&self) -> Option<&VariableGains> {
        match self {
            Self::MaxGains(gains) | Self::MinGains(gains) => Some(gains),
            _ => None,
        }
    }

    /// Recorded tuples for the `MatchingTuples` mode.
    pub fn matching_tuples(&self) -> Option<&MatchingTuples> {
        match self {
            Self::Matching(matching) => Some(matching),
            _ => None,
        }
    }

    /// The pair matrix for the `AllPairs` mode.
    pub fn pair_gains(&self) -> Option<&PairGains> {
        match self {
            Self::Pairs(pairs) => Some(pairs),
            _ => None,
        }
    }
}
