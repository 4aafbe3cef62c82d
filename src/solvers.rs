// src/solvers.rs

//! Linear solves, pseudo-inverse and inverse of row-major matrices.
//!
//! Every driver writes into caller-owned buffers. When the backend reports a failure the
//! whole output is zero-filled before the error is returned.

use log::{debug, warn};

use crate::error::{check_info, check_len, element_count, FailureKind, Result};
use crate::layout::{from_column_major_into, to_column_major_into};
use crate::linalg_backends::{
    BackendBlas, BackendCholesky, BackendLu, BackendSvd, LinAlgBackendProvider, SvdJob, Transpose,
};
use crate::scalar::Element;
use crate::workspace::{log_stage, InverseScratch, SolveScratch, Stage, SvdScratch};

/// Runs `op` and zero-fills `out` if it fails.
fn zero_fill_on_error<T: Element>(out: &mut [T], op: impl FnOnce(&mut [T]) -> Result<()>) -> Result<()> {
    let outcome = op(&mut *out);
    if let Err(err) = &outcome {
        warn!("{}{}; zero-filling output", T::PREFIX, err);
        out.fill(T::zero());
    }
    outcome
}

/// Solves `A X = B` for the row-major `dim x dim` matrix `a` and the `dim x n_col`
/// right-hand sides `b`, writing `X` (`dim x n_col`) into `x`.
///
/// `b` is left untouched. A singular `A` zero-fills `x`.
pub fn glslv<T: Element>(a: &[T], dim: usize, b: &[T], n_col: usize, x: &mut [T]) -> Result<()>
where
    LinAlgBackendProvider<T>: BackendLu<T>,
{
    glslv_with(&LinAlgBackendProvider::<T>::new(), a, dim, b, n_col, x)
}

/// [`glslv`] on an explicit backend.
pub fn glslv_with<T, B>(backend: &B, a: &[T], dim: usize, b: &[T], n_col: usize, x: &mut [T]) -> Result<()>
where
    T: Element,
    B: BackendLu<T>,
{
    check_len("a", element_count("a", dim, dim)?, a.len())?;
    let rhs = element_count("b", dim, n_col)?;
    check_len("b", rhs, b.len())?;
    check_len("x", rhs, x.len())?;

    zero_fill_on_error(x, |x| {
        log_stage::<T>("gesv", Stage::AllocateInput);
        let mut scratch = SolveScratch::<T>::new(dim, n_col, true);
        to_column_major_into(a, dim, dim, &mut scratch.a);
        to_column_major_into(b, dim, n_col, &mut scratch.b);

        log_stage::<T>("gesv", Stage::Execute);
        let info = backend.gesv(&mut scratch);

        log_stage::<T>("gesv", Stage::Finalize);
        check_info("gesv", info, FailureKind::Singular)?;
        from_column_major_into(&scratch.b, dim, n_col, x);
        Ok(())
    })
}

/// Solves `A X = B` for a symmetric (Hermitian) positive-definite `a` by Cholesky
/// factorization. Only the upper triangle of `a` is read.
///
/// A matrix that is not positive definite zero-fills `x`.
pub fn slslv<T: Element>(a: &[T], dim: usize, b: &[T], n_col: usize, x: &mut [T]) -> Result<()>
where
    LinAlgBackendProvider<T>: BackendCholesky<T>,
{
    slslv_with(&LinAlgBackendProvider::<T>::new(), a, dim, b, n_col, x)
}

/// [`slslv`] on an explicit backend.
pub fn slslv_with<T, B>(backend: &B, a: &[T], dim: usize, b: &[T], n_col: usize, x: &mut [T]) -> Result<()>
where
    T: Element,
    B: BackendCholesky<T>,
{
    check_len("a", element_count("a", dim, dim)?, a.len())?;
    let rhs = element_count("b", dim, n_col)?;
    check_len("b", rhs, b.len())?;
    check_len("x", rhs, x.len())?;

    zero_fill_on_error(x, |x| {
        log_stage::<T>("posv", Stage::AllocateInput);
        let mut scratch = SolveScratch::<T>::new(dim, n_col, false);
        to_column_major_into(a, dim, dim, &mut scratch.a);
        to_column_major_into(b, dim, n_col, &mut scratch.b);

        log_stage::<T>("posv", Stage::Execute);
        let info = backend.posv(&mut scratch);

        log_stage::<T>("posv", Stage::Finalize);
        check_info("posv", info, FailureKind::NotPositiveDefinite)?;
        from_column_major_into(&scratch.b, dim, n_col, x);
        Ok(())
    })
}

/// Pseudo-inverse of the row-major `dim1 x dim2` matrix `a`, written to `out`
/// (`dim2 x dim1`).
///
/// Built from the economy SVD as `V S⁺ Uᴴ`. A singular value above
/// [`Element::pinv_tolerance`] contributes its reciprocal; one at or below it contributes
/// itself, so near-zero singular values stay near zero instead of blowing up.
pub fn pinv<T: Element>(a: &[T], dim1: usize, dim2: usize, out: &mut [T]) -> Result<()>
where
    LinAlgBackendProvider<T>: BackendSvd<T> + BackendBlas<T>,
{
    pinv_with(&LinAlgBackendProvider::<T>::new(), a, dim1, dim2, out)
}

/// [`pinv`] on an explicit backend.
pub fn pinv_with<T, B>(backend: &B, a: &[T], dim1: usize, dim2: usize, out: &mut [T]) -> Result<()>
where
    T: Element,
    B: BackendSvd<T> + BackendBlas<T>,
{
    let count = element_count("a", dim1, dim2)?;
    check_len("a", count, a.len())?;
    check_len("out", count, out.len())?;

    zero_fill_on_error(out, |out| {
        let (m, n) = (dim1, dim2);

        log_stage::<T>("gesvd", Stage::AllocateInput);
        let mut scratch = SvdScratch::<T>::new(SvdJob::Thin, m, n);
        to_column_major_into(a, m, n, &mut scratch.a);

        log_stage::<T>("gesvd", Stage::QueryWorkspace);
        let lwork = backend.gesvd_query(&mut scratch)?;
        debug!("{}gesvd {}x{} (thin): lwork = {}", T::PREFIX, m, n, lwork);

        log_stage::<T>("gesvd", Stage::AllocateWorkspace);
        scratch.allocate_work(lwork);

        log_stage::<T>("gesvd", Stage::Execute);
        let info = backend.gesvd(&mut scratch);

        log_stage::<T>("gesvd", Stage::Finalize);
        check_info("gesvd", info, FailureKind::NonConvergence)?;

        let tolerance = T::pinv_tolerance();
        let k = scratch.k();
        for (i, &sigma) in scratch.s.iter().enumerate() {
            let scale = if sigma > tolerance {
                T::one() / T::from_real(sigma)
            } else {
                T::from_real(sigma)
            };
            backend.scal(scale, &mut scratch.u[i * m..(i + 1) * m]);
        }

        // (Vᴴ)ᴴ (U S⁺)ᴴ = V S⁺ Uᴴ, an n x m column-major product.
        let ldvt = scratch.ldvt();
        let ldu = scratch.ldu();
        let mut product = vec![T::zero(); n * m];
        backend.gemm(
            Transpose::ConjTrans,
            Transpose::ConjTrans,
            n,
            m,
            k,
            T::one(),
            &scratch.vt,
            ldvt,
            &scratch.u,
            ldu,
            T::zero(),
            &mut product,
            n.max(1),
        );
        from_column_major_into(&product, n, m, out);
        Ok(())
    })
}

/// Inverts the row-major `dim x dim` matrix `a` in place by LU factorization.
///
/// A singular matrix zero-fills `a`.
pub fn inv<T: Element>(a: &mut [T], dim: usize) -> Result<()>
where
    LinAlgBackendProvider<T>: BackendLu<T>,
{
    inv_with(&LinAlgBackendProvider::<T>::new(), a, dim)
}

/// [`inv`] on an explicit backend.
pub fn inv_with<T, B>(backend: &B, a: &mut [T], dim: usize) -> Result<()>
where
    T: Element,
    B: BackendLu<T>,
{
    check_len("a", element_count("a", dim, dim)?, a.len())?;

    // A row-major buffer read as column-major is Aᵀ, and inv(Aᵀ) = inv(A)ᵀ, so the
    // inverse can be computed without converting either way.
    zero_fill_on_error(a, |a| {
        log_stage::<T>("getri", Stage::AllocateInput);
        let mut scratch = InverseScratch::<T>::new(dim);
        let info = backend.getrf(a, &mut scratch);
        check_info("getrf", info, FailureKind::Singular)?;

        log_stage::<T>("getri", Stage::QueryWorkspace);
        let lwork = backend.getri_query(a, &mut scratch)?;
        debug!("{}getri {}x{}: lwork = {}", T::PREFIX, dim, dim, lwork);

        log_stage::<T>("getri", Stage::AllocateWorkspace);
        scratch.allocate_work(lwork);

        log_stage::<T>("getri", Stage::Execute);
        let info = backend.getri(a, &mut scratch);

        log_stage::<T>("getri", Stage::Finalize);
        check_info("getri", info, FailureKind::Singular)
    })
}
