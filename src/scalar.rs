// src/scalar.rs

use ndarray_linalg::{c32, c64, Scalar};

/// A scalar the dense backend has kernels for: `f32`, `f64`, `c32` or `c64`.
///
/// Arithmetic, `re`, `conj`, `from_real` and `as_c` come from [`Scalar`].
pub trait Element: Scalar + Send + Sync {
    /// BLAS/LAPACK precision prefix (`s`, `d`, `c` or `z`).
    const PREFIX: char;

    /// Whether the value domain is complex.
    const IS_COMPLEX: bool;

    /// Singular values at or below this are left unscaled by the pseudo-inverse.
    fn pinv_tolerance() -> Self::Real;
}

macro_rules! impl_element {
    ($t:ty, $prefix:literal, $complex:literal, $tol:expr) => {
        impl Element for $t {
            const PREFIX: char = $prefix;
            const IS_COMPLEX: bool = $complex;

            fn pinv_tolerance() -> Self::Real {
                $tol
            }
        }
    };
}

impl_element!(f32, 's', false, 1.0e-5);
impl_element!(f64, 'd', false, 1.0e-9);
impl_element!(c32, 'c', true, 1.0e-5);
impl_element!(c64, 'z', true, 1.0e-9);
