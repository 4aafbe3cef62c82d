// src/vector.rs

//! Vector primitives on flat slices.
//!
//! Functions taking `c: Option<&mut [T]>` write to `c` when given and work in place on `a`
//! otherwise. All slices must have the same length.

use crate::error::{check_len, lapack_int, Result};
use crate::linalg_backends::{BackendBlas, Conjugation, LinAlgBackendProvider};
use crate::scalar::Element;

fn apply_elementwise<T: Element>(
    a: &mut [T],
    c: Option<&mut [T]>,
    op: impl Fn(usize, T) -> T,
) -> Result<()> {
    match c {
        Some(c) => {
            check_len("c", a.len(), c.len())?;
            for (i, (dst, &src)) in c.iter_mut().zip(a.iter()).enumerate() {
                *dst = op(i, src);
            }
        }
        None => {
            for (i, value) in a.iter_mut().enumerate() {
                *value = op(i, *value);
            }
        }
    }
    Ok(())
}

/// `c = a`.
pub fn vvcopy<T: Element>(a: &[T], c: &mut [T]) -> Result<()>
where
    LinAlgBackendProvider<T>: BackendBlas<T>,
{
    lapack_int("a", a.len())?;
    check_len("c", a.len(), c.len())?;
    LinAlgBackendProvider::<T>::new().copy(a, c);
    Ok(())
}

/// Element-wise product `c[i] = a[i] * b[i]`.
pub fn vvmul<T: Element>(a: &mut [T], b: &[T], c: Option<&mut [T]>) -> Result<()> {
    check_len("b", a.len(), b.len())?;
    apply_elementwise(a, c, |i, x| x * b[i])
}

/// Dot product. With [`Conjugation::Conjugate`], `a` is conjugated first (`aᴴ b`);
/// the flag has no effect on real types.
pub fn vvdot<T: Element>(a: &[T], b: &[T], conj: Conjugation) -> Result<T>
where
    LinAlgBackendProvider<T>: BackendBlas<T>,
{
    lapack_int("a", a.len())?;
    check_len("b", a.len(), b.len())?;
    Ok(LinAlgBackendProvider::<T>::new().dot(a, b, conj))
}

/// Scalar product `c[i] = a[i] * s`. In place this is the backend's `?scal`; otherwise
/// `a` is copied into `c` and `c` is scaled.
pub fn vsmul<T: Element>(a: &mut [T], s: T, c: Option<&mut [T]>) -> Result<()>
where
    LinAlgBackendProvider<T>: BackendBlas<T>,
{
    lapack_int("a", a.len())?;
    let backend = LinAlgBackendProvider::<T>::new();
    match c {
        Some(c) => {
            check_len("c", a.len(), c.len())?;
            backend.copy(a, c);
            backend.scal(s, c);
        }
        None => backend.scal(s, a),
    }
    Ok(())
}

/// Scalar division `c[i] = a[i] / s`.
///
/// A zero divisor zero-fills the output instead of producing infinities or NaNs.
pub fn vsdiv<T: Element>(a: &mut [T], s: T, c: Option<&mut [T]>) -> Result<()> {
    if s == T::zero() {
        return apply_elementwise(a, c, |_, _| T::zero());
    }
    apply_elementwise(a, c, |_, x| x / s)
}

/// Scalar addition `c[i] = a[i] + s`.
pub fn vsadd<T: Element>(a: &mut [T], s: T, c: Option<&mut [T]>) -> Result<()> {
    apply_elementwise(a, c, |_, x| x + s)
}

/// Scalar subtraction `c[i] = a[i] - s`.
pub fn vssub<T: Element>(a: &mut [T], s: T, c: Option<&mut [T]>) -> Result<()> {
    apply_elementwise(a, c, |_, x| x - s)
}
