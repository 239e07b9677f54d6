//! Entry points: validation, the replicate loop and the worker pool.
//!
//! Replicates run sequentially; within a replicate a shared
//! [`TupleGenerator`] behind a mutex feeds the workers, each of which
//! owns its scratch buffers and pushes accepted results into the shared
//! [`MdfsOutput`] under the aggregator mutex. Both critical sections are
//! constant-time; the kernel itself runs lock-free on thread-local
//! state.

use std::sync::Mutex;

use crate::config::{MdfsConfig, OutputMode};
use crate::data::{ColMatrix, DiscretizationSpec, DiscretizedDataset};
use crate::error::MdfsError;
use crate::selection::counters::TupleScratch;
use crate::selection::entropy::decision_entropy;
use crate::selection::kernel::{process_tuple, single_variable_entropies, KernelParams};
use crate::selection::output::{MatchingTuples, MdfsOutput, PairGains, VariableGains};
use crate::selection::tuples::TupleGenerator;
use crate::utils::{run_with_threads, Parallelism};

// =============================================================================
// Entry points
// =============================================================================

/// Discretise `data` and compute the configured gains.
///
/// `data` is column-major (`N` objects x `V` variables); `decision`
/// holds one label per object, either {0, 1} or all-zero for the
/// no-decision mode. The thread pool is sized from `config.n_threads`.
///
/// All validation happens here, before any computation starts; the
/// compute itself cannot fail and yields no partial results.
///
/// # Example
///
/// ```
/// use mdfs::data::ColMatrix;
/// use mdfs::{run, MdfsConfig};
///
/// let data = ColMatrix::from_vec(vec![0.0, 1.0, 2.0, 3.0, 3.0, 2.0, 1.0, 0.0], 4, 2);
/// let config = MdfsConfig::builder().dimensions(2).pseudo(0.001).build();
/// let output = run(&config, &data, &[0, 0, 1, 1]).unwrap();
/// assert_eq!(output.variable_gains().unwrap().gains().len(), 2);
/// ```
pub fn run<S>(
    config: &MdfsConfig,
    data: &ColMatrix<f64, S>,
    decision: &[i32],
) -> Result<MdfsOutput, MdfsError>
where
    S: AsRef<[f64]> + Sync,
{
    validate_input(config, data.n_rows(), data.n_cols())?;
    validate_decision(decision, data.n_rows())?;

    let spec = DiscretizationSpec::new(
        config.seed,
        config.discretizations,
        config.divisions,
        config.range,
    );

    Ok(run_with_threads(config.n_threads, |parallelism| {
        let dataset = DiscretizedDataset::discretize(data, decision, &spec, parallelism);
        compute_validated(config, &dataset, parallelism)
    }))
}

/// Compute gains over a prebuilt [`DiscretizedDataset`].
///
/// Lets callers discretise once and evaluate several configurations
/// against the same dataset. The dataset's own replicate count and
/// bucket alphabet are authoritative; the discretisation fields of
/// `config` are not consulted. The caller controls the thread pool
/// (`parallelism` decides whether the current rayon pool is used).
pub fn compute(
    config: &MdfsConfig,
    dataset: &DiscretizedDataset,
    parallelism: Parallelism,
) -> Result<MdfsOutput, MdfsError> {
    validate_input(config, dataset.n_objects(), dataset.n_variables())?;
    Ok(compute_validated(config, dataset, parallelism))
}

// =============================================================================
// Validation
// =============================================================================

fn validate_input(
    config: &MdfsConfig,
    n_objects: usize,
    n_variables: usize,
) -> Result<(), MdfsError> {
    config.validate()?;

    if n_objects < 2 {
        return Err(MdfsError::TooFewObjects(n_objects));
    }
    if n_variables < config.dimensions {
        return Err(MdfsError::TooFewVariables {
            variables: n_variables,
            dimensions: config.dimensions,
        });
    }

    for window in config.interesting_vars.windows(2) {
        if window[1] <= window[0] {
            return Err(MdfsError::InvalidInterestingVars(window[1]));
        }
    }
    if let Some(&last) = config.interesting_vars.last() {
        if last >= n_variables {
            return Err(MdfsError::InvalidInterestingVars(last));
        }
    }

    if let Some(lower) = &config.lower_gains {
        if lower.len() != n_variables {
            return Err(MdfsError::LowerGainsLengthMismatch {
                expected: n_variables,
                got: lower.len(),
            });
        }
    }

    Ok(())
}

fn validate_decision(decision: &[i32], n_objects: usize) -> Result<(), MdfsError> {
    if decision.len() != n_objects {
        return Err(MdfsError::DecisionLengthMismatch {
            decision: decision.len(),
            objects: n_objects,
        });
    }
    let mut seen = [false; 2];
    for &label in decision {
        if label != 0 && label != 1 {
            return Err(MdfsError::DecisionValueOutOfRange(label));
        }
        seen[label as usize] = true;
    }
    if seen[1] && !seen[0] {
        return Err(MdfsError::SingleClassDecision);
    }
    Ok(())
}

// =============================================================================
// Orchestration
// =============================================================================

fn compute_validated(
    config: &MdfsConfig,
    dataset: &DiscretizedDataset,
    parallelism: Parallelism,
) -> MdfsOutput {
    let n_variables = dataset.n_variables();
    let n_levels = dataset.n_levels();
    let dimensions = config.dimensions;
    let n_cubes = n_levels.pow(dimensions as u32);
    let n_cubes_reduced = n_cubes / n_levels;

    let [class0, class1] = dataset.class_counts();
    let pseudo = if dataset.n_classes() == 2 {
        let cmin = class0.min(class1) as f64;
        [
            (class0 as f64 / cmin * config.pseudo) as f32,
            (class1 as f64 / cmin * config.pseudo) as f32,
        ]
    } else {
        [config.pseudo as f32, 0.0]
    };

    let user_lower: Option<Vec<f32>> = config
        .lower_gains
        .as_ref()
        .map(|lower| lower.iter().map(|&gain| gain as f32).collect());
    let needs_singles =
        dataset.n_classes() == 1 && dimensions >= 2 && user_lower.is_none();

    let shared = SharedParams {
        config,
        dataset,
        parallelism,
        n_cubes,
        n_cubes_reduced,
        pseudo,
        decision_entropy: decision_entropy(class0, class1),
        user_lower,
        needs_singles,
    };

    match config.output {
        OutputMode::MinIg => {
            // Per-replicate local minima, folded into the global
            // maximum-over-replicates: the gain that remains no matter
            // which replicate is chosen.
            let mut global =
                VariableGains::for_max(n_variables, dimensions, config.return_tuples);
            for discretization in 0..dataset.discretizations() {
                let local = MdfsOutput::MinGains(VariableGains::for_min(
                    n_variables,
                    dimensions,
                    config.return_tuples,
                ));
                let local = shared.run_replicate(discretization, local);
                if let MdfsOutput::MinGains(local) = local {
                    global.fold_max(&local);
                }
            }
            MdfsOutput::MinGains(global)
        }
        _ => {
            let mut output = new_output(config, n_variables);
            for discretization in 0..dataset.discretizations() {
                output = shared.run_replicate(discretization, output);
            }
            output
        }
    }
}

fn new_output(config: &MdfsConfig, n_variables: usize) -> MdfsOutput {
    match config.output {
        OutputMode::MaxIg | OutputMode::MinIg => MdfsOutput::MaxGains(VariableGains::for_max(
            n_variables,
            config.dimensions,
            config.return_tuples,
        )),
        OutputMode::MatchingTuples => MdfsOutput::Matching(MatchingTuples::new(
            config.dimensions,
            config.effective_ig_threshold(),
            config.interesting_vars.clone(),
        )),
        OutputMode::AllPairs => MdfsOutput::Pairs(PairGains::new(n_variables)),
    }
}

/// Replicate-independent state shared by the whole run.
struct SharedParams<'a> {
    config: &'a MdfsConfig,
    dataset: &'a DiscretizedDataset,
    parallelism: Parallelism,
    n_cubes: usize,
    n_cubes_reduced: usize,
    pseudo: [f32; 2],
    decision_entropy: f32,
    user_lower: Option<Vec<f32>>,
    needs_singles: bool,
}

impl SharedParams<'_> {
    /// Process every tuple of one replicate into `sink` and hand it
    /// back.
    fn run_replicate(&self, discretization: usize, sink: MdfsOutput) -> MdfsOutput {
        let singles = self.needs_singles.then(|| {
            single_variable_entropies(
                self.dataset,
                discretization,
                self.pseudo[0] * self.n_cubes_reduced as f32,
            )
        });
        let lower_gains = self.user_lower.as_deref().or(singles.as_deref());

        let params = KernelParams {
            n_objects: self.dataset.n_objects(),
            n_levels: self.dataset.n_levels(),
            n_cubes: self.n_cubes,
            n_cubes_reduced: self.n_cubes_reduced,
            pseudo: self.pseudo,
            decision_entropy: self.decision_entropy,
            lower_gains,
        };

        let context = ReplicateContext {
            dataset: self.dataset,
            discretization,
            dimensions: self.config.dimensions,
            interesting_vars: &self.config.interesting_vars,
            require_all_vars: self.config.require_all_vars,
            params,
            generator: Mutex::new(self.make_generator()),
            sink: Mutex::new(sink),
        };

        if self.parallelism.is_parallel() {
            rayon::broadcast(|_| context.drive_worker());
        } else {
            context.drive_worker();
        }

        context.sink.into_inner().expect("a worker panicked")
    }

    fn make_generator(&self) -> TupleGenerator {
        let interesting = &self.config.interesting_vars;
        if self.config.require_all_vars
            && !interesting.is_empty()
            && interesting.len() == self.config.dimensions
        {
            // All interesting variables must appear and they fill the
            // tuple: the universe collapses to a single combination.
            TupleGenerator::over_subset(self.config.dimensions, interesting.clone())
        } else {
            TupleGenerator::over_all(self.config.dimensions, self.dataset.n_variables())
        }
    }
}

/// Per-replicate worker context: the two mutexes and the kernel inputs.
struct ReplicateContext<'a> {
    dataset: &'a DiscretizedDataset,
    discretization: usize,
    dimensions: usize,
    interesting_vars: &'a [usize],
    require_all_vars: bool,
    params: KernelParams<'a>,
    generator: Mutex<TupleGenerator>,
    sink: Mutex<MdfsOutput>,
}

impl ReplicateContext<'_> {
    /// Jump table over the monomorphised worker loops.
    fn drive_worker(&self) {
        match self.dimensions {
            1 => self.worker_loop::<1>(),
            2 => self.worker_loop::<2>(),
            3 => self.worker_loop::<3>(),
            4 => self.worker_loop::<4>(),
            5 => self.worker_loop::<5>(),
            _ => unreachable!("dimensions validated to 1..=5"),
        }
    }

    fn worker_loop<const K: usize>(&self) {
        let mut scratch = TupleScratch::new(K, self.dataset.n_levels(), self.dataset.n_classes());
        loop {
            {
                let mut generator = self.generator.lock().expect("generator mutex poisoned");
                if !generator.has_next() {
                    break;
                }
                generator.next_into(&mut scratch.tuple);
            }

            if !tuple_accepted(&scratch.tuple, self.interesting_vars, self.require_all_vars) {
                continue;
            }

            process_tuple::<K>(self.dataset, self.discretization, &self.params, &mut scratch);

            let mut sink = self.sink.lock().expect("aggregator mutex poisoned");
            sink.update(&scratch.tuple, &scratch.igs, self.discretization);
        }
    }
}

/// Sorted-merge intersection test between a tuple and the interesting
/// set (both strictly increasing).
fn tuple_accepted(tuple: &[usize], interesting: &[usize], require_all: bool) -> bool {
    if interesting.is_empty() {
        return true;
    }
    let mut matches = 0;
    let (mut i, mut j) = (0, 0);
    while i < tuple.len() && j < interesting.len() {
        match tuple[i].cmp(&interesting[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                matches += 1;
                i += 1;
                j += 1;
            }
        }
    }
    if require_all {
        matches == interesting.len()
    } else {
        matches > 0
    }
}
