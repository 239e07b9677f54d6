//! Seeded stochastic discretisation of continuous columns.
//!
//! Thresholds are placed on rank positions of the sorted column, so the
//! resulting buckets are approximately equal-frequency; the `range`
//! parameter jitters the per-bucket widths around 1. The threshold
//! stream is fully determined by `(seed, discretization_id,
//! variable_id)`, which is what makes replicated runs and cross-backend
//! comparisons reproducible.
//!
//! The stream generator is pinned to `Xoshiro128PlusPlus`: a change of
//! generator silently changes every discretisation derived from
//! recorded seeds.

use rand::distributions::Uniform;
use rand::{Rng, RngCore, SeedableRng};
use rand_xoshiro::Xoshiro128PlusPlus;

// =============================================================================
// Discretisation parameters
// =============================================================================

/// Parameters of the discretisation step.
///
/// The tuple `(seed, discretization_id, variable_id)` fully determines
/// the thresholds used for one column in one replicate.
#[derive(Clone, Copy, Debug)]
pub struct DiscretizationSpec {
    /// Seed of the threshold stream.
    pub seed: u32,
    /// Number of independent replicates.
    pub discretizations: usize,
    /// Thresholds per column; values map into `divisions + 1` buckets.
    pub divisions: usize,
    /// Threshold jitter in [0, 1]; 0 yields rank-equidistant thresholds.
    pub range: f64,
}

impl DiscretizationSpec {
    pub fn new(seed: u32, discretizations: usize, divisions: usize, range: f64) -> Self {
        Self {
            seed,
            discretizations,
            divisions,
            range,
        }
    }
}

// =============================================================================
// Threshold stream
// =============================================================================

/// Derive the per-(replicate, variable) generator from the master seed.
///
/// Reseeding through two intermediate draws decorrelates nearby
/// replicate and variable ids, which would otherwise yield overlapping
/// streams.
fn threshold_stream(seed: u32, discretization_id: u32, variable_id: u32) -> Xoshiro128PlusPlus {
    let mut outer = Xoshiro128PlusPlus::seed_from_u64(u64::from(seed));
    let a = outer.next_u32();
    let mut middle = Xoshiro128PlusPlus::seed_from_u64(u64::from(a ^ discretization_id));
    let b = middle.next_u32();
    Xoshiro128PlusPlus::seed_from_u64(u64::from(b ^ variable_id))
}

/// Compute the `divisions` data-space thresholds for one column.
///
/// Draws `divisions + 1` jittered bucket widths, converts their
/// cumulative sums into rank positions of `sorted_values` and reads the
/// threshold values there. `sorted_values` must be the ascending sort of
/// the raw column.
pub fn thresholds(
    seed: u32,
    discretization_id: u32,
    variable_id: u32,
    divisions: usize,
    sorted_values: &[f64],
    range: f64,
) -> Vec<f64> {
    debug_assert!(!sorted_values.is_empty());

    let mut rng = threshold_stream(seed, discretization_id, variable_id);
    let jitter = Uniform::new_inclusive(1.0 - range, 1.0 + range);

    let weights: Vec<f64> = (0..=divisions).map(|_| rng.sample(jitter)).collect();
    let sum: f64 = weights.iter().sum();
    let step = sorted_values.len() as f64 / sum;

    let mut cumulative = 0.0;
    weights[..divisions]
        .iter()
        .map(|w| {
            cumulative += w;
            let position = ((cumulative * step).round() as usize).min(sorted_values.len() - 1);
            sorted_values[position]
        })
        .collect()
}

/// Discretise one column into `out`.
///
/// `values` is the raw column, `sorted_values` its non-destructive
/// ascending sort. Every output byte counts the thresholds strictly
/// below the raw value, so `out[o]` lies in `0..=divisions`.
pub fn discretize_column(
    seed: u32,
    discretization_id: u32,
    variable_id: u32,
    divisions: usize,
    values: &[f64],
    sorted_values: &[f64],
    range: f64,
    out: &mut [u8],
) {
    debug_assert_eq!(values.len(), sorted_values.len());
    debug_assert_eq!(values.len(), out.len());

    let cuts = thresholds(seed, discretization_id, variable_id, divisions, sorted_values, range);

    for (slot, value) in out.iter_mut().zip(values) {
        let mut bucket = 0u8;
        for cut in &cuts {
            bucket += u8::from(value > cut);
        }
        *slot = bucket;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn deterministic_for_equal_inputs() {
        let values: Vec<f64> = (0..40).map(|i| ((i * 37) % 40) as f64 / 3.0).collect();
        let mut sorted = values.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());

        let mut first = vec![0u8; values.len()];
        let mut second = vec![0u8; values.len()];
        discretize_column(7, 2, 5, 3, &values, &sorted, 0.5, &mut first);
        discretize_column(7, 2, 5, 3, &values, &sorted, 0.5, &mut second);

        assert_eq!(first, second);
    }

    #[test]
    fn replicates_and_variables_get_distinct_streams() {
        let sorted: Vec<f64> = (0..100).map(f64::from).collect();

        let base = thresholds(11, 0, 0, 5, &sorted, 1.0);
        let other_replicate = thresholds(11, 1, 0, 5, &sorted, 1.0);
        let other_variable = thresholds(11, 0, 1, 5, &sorted, 1.0);

        assert_ne!(base, other_replicate);
        assert_ne!(base, other_variable);
        assert_ne!(other_replicate, other_variable);
    }

    #[test]
    fn zero_range_is_rank_equidistant() {
        // 8 distinct values, 3 divisions, no jitter: cuts at rank
        // positions 2, 4, 6.
        let values: Vec<f64> = (0..8).map(f64::from).collect();
        let mut out = vec![0u8; 8];
        discretize_column(1, 0, 0, 3, &values, &values, 0.0, &mut out);

        assert_eq!(out, vec![0, 0, 0, 1, 1, 2, 2, 3]);
    }

    #[test]
    fn ties_share_a_bucket() {
        let values = vec![1.0, 1.0, 1.0, 1.0, 2.0, 2.0];
        let mut sorted = values.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());

        let mut out = vec![0u8; 6];
        discretize_column(3, 0, 0, 1, &values, &sorted, 0.0, &mut out);

        assert_eq!(&out[..4], &[out[0]; 4][..]);
        assert_eq!(&out[4..], &[out[4]; 2][..]);
    }

    proptest! {
        #[test]
        fn buckets_stay_in_alphabet(
            values in proptest::collection::vec(-1e6f64..1e6, 2..120),
            seed in any::<u32>(),
            divisions in 1usize..8,
            range in 0.0f64..=1.0,
        ) {
            let mut sorted = values.clone();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
            let mut out = vec![0u8; values.len()];
            discretize_column(seed, 0, 0, divisions, &values, &sorted, range, &mut out);

            // Every byte within the alphabet, every bucket count
            // accounted for.
            let mut counts = vec![0usize; divisions + 1];
            for &bucket in &out {
                prop_assert!((bucket as usize) <= divisions);
                counts[bucket as usize] += 1;
            }
            prop_assert_eq!(counts.iter().sum::<usize>(), values.len());
        }

        #[test]
        fn pure_function_of_ids(
            seed in any::<u32>(),
            discretization_id in 0u32..64,
            variable_id in 0u32..64,
        ) {
            let sorted: Vec<f64> = (0..50).map(f64::from).collect();
            let first = thresholds(seed, discretization_id, variable_id, 4, &sorted, 0.75);
            let second = thresholds(seed, discretization_id, variable_id, 4, &sorted, 0.75);
            prop_assert_eq!(first, second);
        }
    }
}
