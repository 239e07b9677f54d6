//! Joint histogram counting, marginal reduction and per-worker scratch.

// =============================================================================
// Scratch buffers
// =============================================================================

/// Thread-owned scratch of one worker, allocated once at pool startup
/// and reused across every tuple.
///
/// Sizes are fixed by `(dimensions, n_levels, n_classes)`:
/// `counters` holds `n_classes * n_levels^k` cells, `reduced` the same
/// with one variable summed out.
#[derive(Debug)]
pub(crate) struct TupleScratch {
    pub counters: Vec<f32>,
    pub reduced: Vec<f32>,
    pub igs: Vec<f32>,
    pub tuple: Vec<usize>,
}

impl TupleScratch {
    pub fn new(dimensions: usize, n_levels: usize, n_classes: usize) -> Self {
        let n_cubes = n_levels.pow(dimensions as u32);
        let n_cubes_reduced = n_cubes / n_levels;
        Self {
            counters: vec![0.0; n_classes * n_cubes],
            reduced: vec![0.0; n_classes * n_cubes_reduced],
            igs: vec![0.0; dimensions],
            tuple: vec![0; dimensions],
        }
    }
}

// =============================================================================
// Counting
// =============================================================================

/// Fill the joint histogram for one tuple.
///
/// The flat bucket index of an object is
/// `sum_v columns[v][o] * n_levels^v`, so tuple position `v` owns the
/// stride `n_levels^v`. With a decision the histogram is replicated per
/// class (`counters[class * n_cubes + bucket]`); without one only the
/// first `n_cubes` cells are used. Pseudocounts are added to every cell
/// after counting.
///
/// `K` is the tuple size; monomorphising over it lets the per-object
/// loop unroll.
pub(crate) fn count_joint<const K: usize>(
    columns: &[&[u8]; K],
    decision: Option<&[u8]>,
    n_levels: usize,
    n_cubes: usize,
    pseudo: [f32; 2],
    counters: &mut [f32],
) {
    let mut strides = [0usize; K];
    let mut stride = 1usize;
    for v in 0..K {
        strides[v] = stride;
        stride *= n_levels;
    }
    debug_assert_eq!(stride, n_cubes);

    let n_objects = columns[0].len();

    match decision {
        Some(labels) => {
            debug_assert_eq!(labels.len(), n_objects);
            counters[..2 * n_cubes].fill(0.0);
            for o in 0..n_objects {
                let mut bucket = 0usize;
                for v in 0..K {
                    bucket += columns[v][o] as usize * strides[v];
                }
                counters[labels[o] as usize * n_cubes + bucket] += 1.0;
            }
            let (class0, class1) = counters.split_at_mut(n_cubes);
            for cell in class0.iter_mut() {
                *cell += pseudo[0];
            }
            for cell in &mut class1[..n_cubes] {
                *cell += pseudo[1];
            }
        }
        None => {
            counters[..n_cubes].fill(0.0);
            for o in 0..n_objects {
                let mut bucket = 0usize;
                for v in 0..K {
                    bucket += columns[v][o] as usize * strides[v];
                }
                counters[bucket] += 1.0;
            }
            for cell in &mut counters[..n_cubes] {
                *cell += pseudo[0];
            }
        }
    }
}

// =============================================================================
// Marginal reduction
// =============================================================================

/// Sum out the tuple position owning `stride` from a joint histogram.
///
/// Accumulates into `out` (callers zero it first), visiting buckets in
/// index order so the float summation order is fixed. `out` has
/// `n_cubes / n_levels` cells.
pub(crate) fn reduce_counters(
    n_levels: usize,
    n_cubes: usize,
    input: &[f32],
    out: &mut [f32],
    stride: usize,
) {
    let mut v = 0;
    let mut c = 0;
    while c < n_cubes {
        for s in 0..stride {
            let mut acc = 0.0f32;
            for level in 0..n_levels {
                acc += input[c + s + level * stride];
            }
            out[v] += acc;
            v += 1;
        }
        c += stride * n_levels;
    }
    debug_assert_eq!(v, n_cubes / n_levels);
}
