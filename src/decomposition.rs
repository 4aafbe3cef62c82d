// src/decomposition.rs

//! Singular value and eigenvalue decompositions of row-major matrices.
//!
//! Each driver copies its input into a column-major scratch buffer, runs the backend's
//! workspace query, allocates the workspace, executes, and then either converts the
//! results back to row-major or, when the backend reports a failure, zero-fills the
//! declared outputs. Scratch memory is released on every path when the driver returns.

use log::{debug, warn};
use ndarray::Array2;
use ndarray_linalg::Scalar;
use num_traits::Zero;

use crate::error::{check_info, check_len, element_count, FailureKind, Result};
use crate::layout::{from_column_major_permuted, scatter_diagonal, to_column_major_into};
use crate::linalg_backends::{BackendEig, BackendEigh, BackendSvd, LinAlgBackendProvider, SvdJob};
use crate::scalar::Element;
use crate::sorting::{sort_permutation, SortOrder};
use crate::workspace::{log_stage, EigScratch, EighScratch, Stage, SvdScratch};

/// Full singular value decomposition `A = U S Vᴴ` of a `dim1 x dim2` matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct SvdFactors<T: Element> {
    /// Left singular vectors, `dim1 x dim1`.
    pub u: Array2<T>,
    /// Singular values on the diagonal of an otherwise zero `dim1 x dim2` matrix,
    /// in non-increasing order.
    pub s: Array2<T>,
    /// Right singular vectors, `dim2 x dim2`.
    pub v: Array2<T>,
}

impl<T: Element> SvdFactors<T> {
    /// The singular values, read back off the diagonal of `s`.
    pub fn singular_values(&self) -> Vec<T::Real> {
        self.s.diag().iter().map(|x| x.re()).collect()
    }

    /// `U` flattened in row-major order.
    pub fn u_row_major(&self) -> Vec<T> {
        self.u.iter().copied().collect()
    }

    /// `S` flattened in row-major order.
    pub fn s_row_major(&self) -> Vec<T> {
        self.s.iter().copied().collect()
    }

    /// `V` flattened in row-major order.
    pub fn v_row_major(&self) -> Vec<T> {
        self.v.iter().copied().collect()
    }
}

/// Singular value decomposition of the row-major `dim1 x dim2` matrix `a`.
///
/// `U` and `V` are always the full square factors, whatever the shape of `a`. If the backend fails to converge no
/// factors are produced.
pub fn svd<T: Element>(a: &[T], dim1: usize, dim2: usize) -> Result<SvdFactors<T>>
where
    LinAlgBackendProvider<T>: BackendSvd<T>,
{
    svd_with(&LinAlgBackendProvider::<T>::new(), a, dim1, dim2)
}

/// [`svd`] on an explicit backend.
pub fn svd_with<T, B>(backend: &B, a: &[T], dim1: usize, dim2: usize) -> Result<SvdFactors<T>>
where
    T: Element,
    B: BackendSvd<T>,
{
    check_len("a", element_count("a", dim1, dim2)?, a.len())?;

    log_stage::<T>("gesvd", Stage::AllocateInput);
    let mut scratch = SvdScratch::<T>::new(SvdJob::All, dim1, dim2);
    to_column_major_into(a, dim1, dim2, &mut scratch.a);

    log_stage::<T>("gesvd", Stage::QueryWorkspace);
    let lwork = backend.gesvd_query(&mut scratch).inspect_err(|err| warn!("{err}"))?;
    debug!("{}gesvd {}x{}: lwork = {}", T::PREFIX, dim1, dim2, lwork);

    log_stage::<T>("gesvd", Stage::AllocateWorkspace);
    scratch.allocate_work(lwork);

    log_stage::<T>("gesvd", Stage::Execute);
    let info = backend.gesvd(&mut scratch);

    log_stage::<T>("gesvd", Stage::Finalize);
    if let Err(err) = check_info("gesvd", info, FailureKind::NonConvergence) {
        warn!("{err}; no factors returned");
        return Err(err);
    }

    // `Vᴴ` is column-major, so `conj(Vᴴ(j, i))` for `V(i, j)` sits at `i * dim2 + j`.
    let u = Array2::from_shape_fn((dim1, dim1), |(i, j)| scratch.u[j * dim1 + i]);
    let s = Array2::from_shape_fn((dim1, dim2), |(i, j)| {
        if i == j {
            T::from_real(scratch.s[i])
        } else {
            T::zero()
        }
    });
    let v = Array2::from_shape_fn((dim2, dim2), |(i, j)| scratch.vt[i * dim2 + j].conj());

    Ok(SvdFactors { u, s, v })
}

/// Eigendecomposition of the symmetric (real) or Hermitian (complex) row-major
/// `dim x dim` matrix `a`.
///
/// `v` receives the eigenvectors as columns and `d` the eigenvalues on its diagonal, both
/// row-major `dim x dim`, ordered by `order`. Only the upper triangle of `a` is read. On
/// failure both outputs are zero-filled.
pub fn seig<T: Element>(a: &[T], dim: usize, order: SortOrder, v: &mut [T], d: &mut [T]) -> Result<()>
where
    LinAlgBackendProvider<T>: BackendEigh<T>,
{
    seig_with(&LinAlgBackendProvider::<T>::new(), a, dim, order, v, d)
}

/// [`seig`] on an explicit backend.
pub fn seig_with<T, B>(
    backend: &B,
    a: &[T],
    dim: usize,
    order: SortOrder,
    v: &mut [T],
    d: &mut [T],
) -> Result<()>
where
    T: Element,
    B: BackendEigh<T>,
{
    let count = element_count("a", dim, dim)?;
    check_len("a", count, a.len())?;
    check_len("v", count, v.len())?;
    check_len("d", count, d.len())?;

    let outcome = seig_into(backend, a, dim, order, v, d);
    if let Err(err) = &outcome {
        warn!("{}{}; zero-filling V and D", T::PREFIX, err);
        v.fill(T::zero());
        d.fill(T::zero());
    }
    outcome
}

fn seig_into<T, B>(backend: &B, a: &[T], dim: usize, order: SortOrder, v: &mut [T], d: &mut [T]) -> Result<()>
where
    T: Element,
    B: BackendEigh<T>,
{
    log_stage::<T>("heev", Stage::AllocateInput);
    let mut scratch = EighScratch::<T>::new(dim);
    to_column_major_into(a, dim, dim, &mut scratch.a);

    log_stage::<T>("heev", Stage::QueryWorkspace);
    let lwork = backend.heev_query(&mut scratch)?;
    debug!("{}heev {}x{}: lwork = {}", T::PREFIX, dim, dim, lwork);

    log_stage::<T>("heev", Stage::AllocateWorkspace);
    scratch.allocate_work(lwork);

    log_stage::<T>("heev", Stage::Execute);
    let info = backend.heev(&mut scratch);

    log_stage::<T>("heev", Stage::Finalize);
    check_info("heev", info, FailureKind::NonConvergence)?;

    // The backend sorts ascending; descending is the same columns read back to front.
    let column_order: Vec<usize> = match order {
        SortOrder::Ascending => (0..dim).collect(),
        SortOrder::Descending => (0..dim).rev().collect(),
    };
    from_column_major_permuted(&scratch.a, dim, &column_order, v);
    let eigenvalues: Vec<T> = column_order
        .iter()
        .map(|&k| T::from_real(scratch.w[k]))
        .collect();
    scatter_diagonal(&eigenvalues, dim, dim, d);
    Ok(())
}

/// Eigendecomposition of the general row-major `dim x dim` matrix `a`.
///
/// Computed in complex arithmetic even for real input, so every output is `T::Complex`.
/// Eigenpairs are reordered by the real part of the eigenvalue; pairs with equal real
/// parts keep the backend's relative order. `vl` and `vr` receive the left and right
/// eigenvectors as columns, and a side passed as `None` is not computed at all. `d`
/// receives the real part of each sorted eigenvalue on its diagonal, with a zero
/// imaginary part. On failure all requested outputs are zero-filled.
pub fn eig<T: Element>(
    a: &[T],
    dim: usize,
    order: SortOrder,
    vl: Option<&mut [T::Complex]>,
    vr: Option<&mut [T::Complex]>,
    d: &mut [T::Complex],
) -> Result<()>
where
    T::Complex: Element,
    LinAlgBackendProvider<T::Complex>: BackendEig<T::Complex>,
{
    eig_with(&LinAlgBackendProvider::<T::Complex>::new(), a, dim, order, vl, vr, d)
}

/// [`eig`] on an explicit backend.
pub fn eig_with<T, B>(
    backend: &B,
    a: &[T],
    dim: usize,
    order: SortOrder,
    mut vl: Option<&mut [T::Complex]>,
    mut vr: Option<&mut [T::Complex]>,
    d: &mut [T::Complex],
) -> Result<()>
where
    T: Element,
    T::Complex: Element,
    B: BackendEig<T::Complex>,
{
    let count = element_count("a", dim, dim)?;
    check_len("a", count, a.len())?;
    if let Some(vl) = vl.as_deref() {
        check_len("vl", count, vl.len())?;
    }
    if let Some(vr) = vr.as_deref() {
        check_len("vr", count, vr.len())?;
    }
    check_len("d", count, d.len())?;

    let outcome = eig_into(backend, a, dim, order, vl.as_deref_mut(), vr.as_deref_mut(), d);
    if let Err(err) = &outcome {
        warn!(
            "{}{}; zero-filling eigenvector and eigenvalue outputs",
            <T::Complex as Element>::PREFIX,
            err
        );
        let zero = <T::Complex>::zero();
        for side in [vl, vr].into_iter().flatten() {
            side.fill(zero);
        }
        d.fill(zero);
    }
    outcome
}

fn eig_into<T, B>(
    backend: &B,
    a: &[T],
    dim: usize,
    order: SortOrder,
    vl: Option<&mut [T::Complex]>,
    vr: Option<&mut [T::Complex]>,
    d: &mut [T::Complex],
) -> Result<()>
where
    T: Element,
    T::Complex: Element,
    B: BackendEig<T::Complex>,
{
    log_stage::<T::Complex>("geev", Stage::AllocateInput);
    let mut scratch = EigScratch::<T::Complex>::new(dim, vl.is_some(), vr.is_some());
    let promoted: Vec<T::Complex> = a.iter().map(|x| x.as_c()).collect();
    to_column_major_into(&promoted, dim, dim, &mut scratch.a);

    log_stage::<T::Complex>("geev", Stage::QueryWorkspace);
    let lwork = backend.geev_query(&mut scratch)?;
    debug!("{}geev {}x{}: lwork = {}", <T::Complex as Element>::PREFIX, dim, dim, lwork);

    log_stage::<T::Complex>("geev", Stage::AllocateWorkspace);
    scratch.allocate_work(lwork);

    log_stage::<T::Complex>("geev", Stage::Execute);
    let info = backend.geev(&mut scratch);

    log_stage::<T::Complex>("geev", Stage::Finalize);
    check_info("geev", info, FailureKind::NonConvergence)?;

    let real_parts: Vec<_> = scratch.w.iter().map(|w| w.re()).collect();
    let column_order = sort_permutation(&real_parts, order);

    if let Some(vl) = vl {
        from_column_major_permuted(&scratch.vl, dim, &column_order, vl);
    }
    if let Some(vr) = vr {
        from_column_major_permuted(&scratch.vr, dim, &column_order, vr);
    }
    // `D` holds the sorted real parts only; the imaginary parts are dropped.
    let eigenvalues: Vec<T::Complex> = column_order
        .iter()
        .map(|&k| <T::Complex>::from_real(scratch.w[k].re()))
        .collect();
    scatter_diagonal(&eigenvalues, dim, dim, d);
    Ok(())
}
