//! Per-tuple information-gain kernel.
//!
//! One call processes one tuple in one discretisation replicate and
//! attributes a gain to every tuple position:
//!
//! - decision mode: `igs[v] = I(Y; X_v | other tuple variables)`,
//!   the drop in conditional decision entropy when `X_v` joins the
//!   conditioning set;
//! - no-decision mode: a mutual-information expression among the tuple
//!   variables built from plain entropies.
//!
//! Gains are reported in bits per object. They can dip marginally below
//! zero through `log2` rounding; downstream treats such values as
//! legitimate.

use crate::data::DiscretizedDataset;
use crate::selection::counters::{count_joint, reduce_counters, TupleScratch};
use crate::selection::entropy::{conditional_entropy, joint_entropy};

/// Replicate-independent kernel inputs, precomputed by the runner.
#[derive(Debug, Clone, Copy)]
pub(crate) struct KernelParams<'a> {
    pub n_objects: usize,
    pub n_levels: usize,
    pub n_cubes: usize,
    pub n_cubes_reduced: usize,
    /// Per-class cell pseudocounts, already scaled by the class ratio.
    pub pseudo: [f32; 2],
    /// `H(Y)` in bits; meaningful in decision mode only.
    pub decision_entropy: f32,
    /// Per-variable lower-order gains: `I(Y; X_i)` in decision mode,
    /// `H(X_i)` in no-decision mode. Enables the two-variable fast
    /// paths; always present in no-decision mode for `k >= 2`.
    pub lower_gains: Option<&'a [f32]>,
}

/// Compute `scratch.igs` for the tuple in `scratch.tuple`.
///
/// `K` is the tuple size, monomorphised so the per-object bucket
/// computation unrolls; the runner dispatches over `K in 1..=5`.
pub(crate) fn process_tuple<const K: usize>(
    dataset: &DiscretizedDataset,
    discretization: usize,
    params: &KernelParams<'_>,
    scratch: &mut TupleScratch,
) {
    let columns: [&[u8]; K] =
        std::array::from_fn(|v| dataset.discretized(scratch.tuple[v], discretization));
    let n = params.n_objects as f32;

    if dataset.n_classes() == 2 {
        count_joint::<K>(
            &columns,
            Some(dataset.decision()),
            params.n_levels,
            params.n_cubes,
            params.pseudo,
            &mut scratch.counters,
        );
        let (class0, class1) = scratch.counters.split_at(params.n_cubes);
        let h_joint = conditional_entropy(class0, class1);

        if K == 2 {
            if let Some(lower) = params.lower_gains {
                // I(Y; X_v | X_other) = H(Y) - I(Y; X_other) - H(Y | both),
                // reusing the caller's single-variable gains instead of
                // re-deriving the pairwise-shared marginals.
                scratch.igs[0] =
                    params.decision_entropy - lower[scratch.tuple[1]] - h_joint / n;
                scratch.igs[1] =
                    params.decision_entropy - lower[scratch.tuple[0]] - h_joint / n;
                return;
            }
        }

        let mut stride = 1;
        for v in 0..K {
            scratch.reduced.fill(0.0);
            let (reduced0, reduced1) = scratch.reduced.split_at_mut(params.n_cubes_reduced);
            reduce_counters(params.n_levels, params.n_cubes, class0, reduced0, stride);
            reduce_counters(params.n_levels, params.n_cubes, class1, reduced1, stride);
            let h_reduced = conditional_entropy(reduced0, reduced1);
            scratch.igs[v] = (h_reduced - h_joint) / n;
            stride *= params.n_levels;
        }
    } else {
        count_joint::<K>(
            &columns,
            None,
            params.n_levels,
            params.n_cubes,
            params.pseudo,
            &mut scratch.counters,
        );
        let total = n + params.pseudo[0] * params.n_cubes as f32;
        let h_all = joint_entropy(total, &scratch.counters[..params.n_cubes]);

        if K == 1 {
            scratch.igs[0] = h_all / n;
            return;
        }

        let lower = params
            .lower_gains
            .expect("single-variable entropies are precomputed for the no-decision mode");

        if K == 2 {
            // I(X_0; X_1) = H(X_0) + H(X_1) - H(X_0, X_1)
            let gain =
                lower[scratch.tuple[0]] + lower[scratch.tuple[1]] - h_all / n;
            scratch.igs[0] = gain;
            scratch.igs[1] = gain;
            return;
        }

        let mut stride = 1;
        for v in 0..K {
            scratch.reduced.fill(0.0);
            reduce_counters(
                params.n_levels,
                params.n_cubes,
                &scratch.counters[..params.n_cubes],
                &mut scratch.reduced[..params.n_cubes_reduced],
                stride,
            );
            let h_rest = joint_entropy(total, &scratch.reduced[..params.n_cubes_reduced]);
            // I(X_v; rest of the tuple)
            scratch.igs[v] = lower[scratch.tuple[v]] + h_rest / n - h_all / n;
            stride *= params.n_levels;
        }
    }
}

/// Per-variable plain entropies `H(X_i)` for one replicate, in bits per
/// object.
///
/// The per-cell pseudocount is scaled by `n_levels^(k-1)` so the pseudo
/// mass matches a k-dimensional joint histogram with one variable
/// summed out, keeping the no-decision gain expressions consistent.
pub(crate) fn single_variable_entropies(
    dataset: &DiscretizedDataset,
    discretization: usize,
    pseudo_cell: f32,
) -> Vec<f32> {
    let n_levels = dataset.n_levels();
    let n = dataset.n_objects() as f32;
    let total = n + pseudo_cell * n_levels as f32;

    (0..dataset.n_variables())
        .map(|variable| {
            let mut histogram = vec![pseudo_cell; n_levels];
            for &bucket in dataset.discretized(variable, discretization) {
                histogram[bucket as usize] += 1.0;
            }
            joint_entropy(total, &histogram) / n
        })
        .collect()
}
