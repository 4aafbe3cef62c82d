// src/sorting.rs

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::{check_len, Result};

/// Direction for eigenvalue ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Sorts `values` by value, remembering where each element came from.
///
/// The sorted values go to `out` when given, otherwise `values` is overwritten. When
/// `indices` is given it receives, for every sorted position, the original index of the
/// element now there. The sort is stable: equal values keep their original relative
/// order in either direction. Incomparable values (NaN) are treated as equal.
///
/// ```
/// use rowmajor_lapack::sorting::{sortf, SortOrder};
///
/// let mut values = [3.0_f32, 1.0, 2.0];
/// let mut indices = [0usize; 3];
/// sortf(&mut values, None, Some(&mut indices), SortOrder::Descending).unwrap();
/// assert_eq!(values, [3.0, 2.0, 1.0]);
/// assert_eq!(indices, [0, 2, 1]);
/// ```
pub fn sortf<T: PartialOrd + Copy>(
    values: &mut [T],
    out: Option<&mut [T]>,
    indices: Option<&mut [usize]>,
    order: SortOrder,
) -> Result<()> {
    let len = values.len();
    if let Some(out) = out.as_deref() {
        check_len("out", len, out.len())?;
    }
    if let Some(indices) = indices.as_deref() {
        check_len("indices", len, indices.len())?;
    }

    let pairs = sorted_pairs(values, order);

    let target = match out {
        Some(out) => out,
        None => values,
    };
    for (slot, &(value, _)) in target.iter_mut().zip(&pairs) {
        *slot = value;
    }
    if let Some(indices) = indices {
        for (slot, &(_, original)) in indices.iter_mut().zip(&pairs) {
            *slot = original;
        }
    }
    Ok(())
}

/// The permutation that sorts `values`, leaving `values` untouched.
pub fn sort_permutation<T: PartialOrd + Copy>(values: &[T], order: SortOrder) -> Vec<usize> {
    sorted_pairs(values, order)
        .into_iter()
        .map(|(_, original)| original)
        .collect()
}

/// Stable sort of `(value, original index)` pairs.
fn sorted_pairs<T: PartialOrd + Copy>(values: &[T], order: SortOrder) -> Vec<(T, usize)> {
    let mut pairs: Vec<(T, usize)> = values.iter().copied().zip(0..).collect();
    pairs.sort_by(|(a, _), (b, _)| {
        let ascending = a.partial_cmp(b).unwrap_or(Ordering::Equal);
        match order {
            SortOrder::Ascending => ascending,
            SortOrder::Descending => ascending.reverse(),
        }
    });
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascending_in_place_with_indices() {
        let mut values = [0.5_f64, -2.0, 7.0, 1.0];
        let mut indices = [0; 4];
        sortf(&mut values, None, Some(&mut indices), SortOrder::Ascending).unwrap();
        assert_eq!(values, [-2.0, 0.5, 1.0, 7.0]);
        assert_eq!(indices, [1, 0, 3, 2]);
    }

    #[test]
    fn separate_output_leaves_input_alone() {
        let mut values = [3.0_f32, 1.0, 2.0];
        let mut out = [0.0_f32; 3];
        sortf(&mut values, Some(&mut out), None, SortOrder::Descending).unwrap();
        assert_eq!(out, [3.0, 2.0, 1.0]);
        assert_eq!(values, [3.0, 1.0, 2.0]);
    }

    #[test]
    fn ties_keep_backend_order_in_both_directions() {
        let values = [2.0_f64, 1.0, 2.0, 1.0];
        assert_eq!(sort_permutation(&values, SortOrder::Ascending), vec![1, 3, 0, 2]);
        assert_eq!(sort_permutation(&values, SortOrder::Descending), vec![0, 2, 1, 3]);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let mut values = [1.0_f64, 2.0];
        let mut indices = [0; 3];
        assert!(sortf(&mut values, None, Some(&mut indices), SortOrder::Ascending).is_err());
        assert_eq!(values, [1.0, 2.0]);
    }

    #[test]
    fn order_round_trips_through_serde() {
        let json = serde_json::to_string(&SortOrder::Descending).unwrap();
        assert_eq!(json, "\"Descending\"");
        let back: SortOrder = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SortOrder::Descending);
        assert_eq!(SortOrder::default(), SortOrder::Ascending);
    }

    #[test]
    fn empty_input_is_fine() {
        let mut values: [f32; 0] = [];
        sortf(&mut values, None, None, SortOrder::Descending).unwrap();
        assert!(sort_permutation::<f64>(&[], SortOrder::Ascending).is_empty());
    }
}
