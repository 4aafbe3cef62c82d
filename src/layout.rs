// src/layout.rs

//! Conversions between the caller's row-major matrices and the backend's column-major
//! buffers, plus the output conventions built on top of them (diagonal embedding and
//! column reordering).
//!
//! Element `(i, j)` of a `rows x cols` matrix lives at `i * cols + j` in row-major order
//! and at `j * rows + i` in column-major order.

use crate::scalar::Element;

/// Writes the row-major `src` (`rows x cols`) into `dst` in column-major order.
pub fn to_column_major_into<T: Copy>(src: &[T], rows: usize, cols: usize, dst: &mut [T]) {
    debug_assert_eq!(src.len(), rows * cols);
    debug_assert_eq!(dst.len(), rows * cols);
    for i in 0..rows {
        for j in 0..cols {
            dst[j * rows + i] = src[i * cols + j];
        }
    }
}

/// Writes the column-major `src` (`rows x cols`) into `dst` in row-major order.
pub fn from_column_major_into<T: Copy>(src: &[T], rows: usize, cols: usize, dst: &mut [T]) {
    debug_assert_eq!(src.len(), rows * cols);
    debug_assert_eq!(dst.len(), rows * cols);
    for i in 0..rows {
        for j in 0..cols {
            dst[i * cols + j] = src[j * rows + i];
        }
    }
}

/// Allocating form of [`to_column_major_into`].
pub fn to_column_major<T: Copy>(src: &[T], rows: usize, cols: usize) -> Vec<T> {
    let mut dst = src.to_vec();
    to_column_major_into(src, rows, cols, &mut dst);
    dst
}

/// Allocating form of [`from_column_major_into`].
pub fn from_column_major<T: Copy>(src: &[T], rows: usize, cols: usize) -> Vec<T> {
    let mut dst = src.to_vec();
    from_column_major_into(src, rows, cols, &mut dst);
    dst
}

/// Row-major `dst` (`rows x cols`) receives column `column_order[j]` of the column-major
/// `src` (`rows x src_cols`) as its column `j`.
///
/// Used to hand back eigenvectors in sorted order.
pub fn from_column_major_permuted<T: Copy>(
    src: &[T],
    rows: usize,
    column_order: &[usize],
    dst: &mut [T],
) {
    let cols = column_order.len();
    debug_assert_eq!(dst.len(), rows * cols);
    for i in 0..rows {
        for (j, &source_col) in column_order.iter().enumerate() {
            dst[i * cols + j] = src[source_col * rows + i];
        }
    }
}

/// Zeroes the row-major `rows x cols` matrix `dst` and writes `values` along its main
/// diagonal. Only `min(rows, cols, values.len())` entries are placed.
pub fn scatter_diagonal<T: Element>(values: &[T], rows: usize, cols: usize, dst: &mut [T]) {
    debug_assert_eq!(dst.len(), rows * cols);
    dst.fill(T::zero());
    for (i, &value) in values.iter().enumerate().take(rows.min(cols)) {
        dst[i * cols + i] = value;
    }
}
