//! Count-weighted entropy primitives.
//!
//! All functions work on raw (pseudocount-augmented) cell counts and
//! return count-weighted bits, i.e. `N` times the per-object entropy.
//! Empty cells contribute nothing: the `0 * log2(0) = 0` convention is
//! enforced with explicit guards rather than relying on float quirks.

/// Plain entropy of a histogram against a fixed total:
/// `-sum_b n_b * log2(n_b / total)`.
pub(crate) fn joint_entropy(total: f32, counters: &[f32]) -> f32 {
    let mut entropy = 0.0f32;
    for &count in counters {
        if count != 0.0 {
            entropy -= count * (count / total).log2();
        }
    }
    entropy
}

/// Conditional entropy of the decision given the cell, summed over
/// cells: `-sum_b sum_c n_cb * log2(n_cb / n_b)`.
pub(crate) fn conditional_entropy(class0: &[f32], class1: &[f32]) -> f32 {
    debug_assert_eq!(class0.len(), class1.len());
    let mut entropy = 0.0f32;
    for (&a, &b) in class0.iter().zip(class1) {
        let cell = a + b;
        if a != 0.0 {
            entropy -= a * (a / cell).log2();
        }
        if b != 0.0 {
            entropy -= b * (b / cell).log2();
        }
    }
    entropy
}

/// Entropy of the decision itself in bits per object.
pub(crate) fn decision_entropy(class0: usize, class1: usize) -> f32 {
    let total = (class0 + class1) as f32;
    let mut entropy = 0.0f32;
    for count in [class0 as f32, class1 as f32] {
        if count != 0.0 {
            entropy -= (count / total) * (count / total).log2();
        }
    }
    entropy
}
