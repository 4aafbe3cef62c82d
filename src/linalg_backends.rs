// src/linalg_backends.rs

use std::marker::PhantomData;

use ndarray_linalg::{c32, c64};
use serde::{Deserialize, Serialize};

use crate::error::{check_info, FailureKind, Result};
use crate::scalar::Element;
use crate::workspace::{EigScratch, EighScratch, InverseScratch, SolveScratch, SvdScratch};

// --- Kernel options ---

/// Which singular vectors `?gesvd` should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SvdJob {
    /// Full square `U` (`m x m`) and `Vᴴ` (`n x n`), LAPACK `'A'`.
    All,
    /// Economy factors, `U` is `m x k` and `Vᴴ` is `k x n`, LAPACK `'S'`.
    Thin,
}

impl SvdJob {
    fn as_byte(self) -> u8 {
        match self {
            SvdJob::All => b'A',
            SvdJob::Thin => b'S',
        }
    }
}

/// Operand transposition for `?gemm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transpose {
    No,
    Trans,
    /// Conjugate transpose; identical to `Trans` for real types.
    ConjTrans,
}

impl Transpose {
    fn as_byte(self) -> u8 {
        match self {
            Transpose::No => b'N',
            Transpose::Trans => b'T',
            Transpose::ConjTrans => b'C',
        }
    }
}

/// Whether the first operand of a dot product is conjugated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Conjugation {
    #[default]
    NoConjugate,
    Conjugate,
}

// --- Capability traits ---
//
// Every matrix argument is a column-major buffer owned by a scratch struct. Kernels that
// need a workspace expose a query (LAPACK's `lwork = -1` convention) and an execute call;
// the execute call returns the raw `info` so the driver decides what a failure means.

/// Singular value decomposition (`?gesvd`).
pub trait BackendSvd<T: Element> {
    /// Returns the optimal `lwork` for `scratch.job`, `scratch.m`, `scratch.n`.
    fn gesvd_query(&self, scratch: &mut SvdScratch<T>) -> Result<usize>;
    fn gesvd(&self, scratch: &mut SvdScratch<T>) -> i32;
}

/// Symmetric (real) or Hermitian (complex) eigendecomposition, `?syev` / `?heev`.
/// Eigenvalues come back in ascending order, eigenvectors overwrite `scratch.a`.
pub trait BackendEigh<T: Element> {
    fn heev_query(&self, scratch: &mut EighScratch<T>) -> Result<usize>;
    fn heev(&self, scratch: &mut EighScratch<T>) -> i32;
}

/// General eigendecomposition (`?geev`). Only implemented for complex types; real input
/// is promoted by the driver.
pub trait BackendEig<C: Element> {
    fn geev_query(&self, scratch: &mut EigScratch<C>) -> Result<usize>;
    fn geev(&self, scratch: &mut EigScratch<C>) -> i32;
}

/// LU based kernels: `?gesv`, `?getrf`, `?getri`.
pub trait BackendLu<T: Element> {
    /// Solves `A X = B`, leaving `X` in `scratch.b`.
    fn gesv(&self, scratch: &mut SolveScratch<T>) -> i32;
    /// Factors the `n x n` matrix in `a` in place.
    fn getrf(&self, a: &mut [T], scratch: &mut InverseScratch<T>) -> i32;
    fn getri_query(&self, a: &mut [T], scratch: &mut InverseScratch<T>) -> Result<usize>;
    /// Inverts `a` from the factors left by [`BackendLu::getrf`].
    fn getri(&self, a: &mut [T], scratch: &mut InverseScratch<T>) -> i32;
}

/// Cholesky solve, `?posv` on the upper triangle.
pub trait BackendCholesky<T: Element> {
    fn posv(&self, scratch: &mut SolveScratch<T>) -> i32;
}

/// Level 1 and level 3 BLAS used by the drivers and the vector primitives.
pub trait BackendBlas<T: Element> {
    fn copy(&self, x: &[T], y: &mut [T]);
    fn scal(&self, alpha: T, x: &mut [T]);
    fn dot(&self, x: &[T], y: &[T], conj: Conjugation) -> T;
    /// `C = alpha * op(A) * op(B) + beta * C`, column-major.
    #[allow(clippy::too_many_arguments)]
    fn gemm(
        &self,
        transa: Transpose,
        transb: Transpose,
        m: usize,
        n: usize,
        k: usize,
        alpha: T,
        a: &[T],
        lda: usize,
        b: &[T],
        ldb: usize,
        beta: T,
        c: &mut [T],
        ldc: usize,
    );
}

/// Drivers reject dimensions above `i32::MAX` with [`crate::error::lapack_int`] before any
/// kernel runs. Should one slip through it saturates rather than wraps.
fn to_int(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

// --- LAPACK / BLAS implementation ---

/// Calls the Fortran LAPACK/BLAS symbols through the `lapack` and `blas` crates.
/// The library behind them (OpenBLAS, MKL) is picked by the `backend_*` features.
#[derive(Debug, Default, Copy, Clone)]
pub struct LapackBackend;

macro_rules! impl_lapack_real {
    (
        $t:ty,
        $gesvd:ident,
        $syev:ident,
        $gesv:ident,
        $posv:ident,
        $getrf:ident,
        $getri:ident,
        $copy:ident,
        $scal:ident,
        $dot:ident,
        $gemm:ident
    ) => {
        impl BackendSvd<$t> for LapackBackend {
            fn gesvd_query(&self, scratch: &mut SvdScratch<$t>) -> Result<usize> {
                let job = scratch.job.as_byte();
                let (m, n) = (to_int(scratch.m), to_int(scratch.n));
                let (lda, ldu, ldvt) = (to_int(scratch.lda()), to_int(scratch.ldu()), to_int(scratch.ldvt()));
                let mut query = [0.0 as $t];
                let mut info = 0;
                unsafe {
                    lapack::$gesvd(
                        job, job, m, n, &mut scratch.a, lda, &mut scratch.s, &mut scratch.u, ldu,
                        &mut scratch.vt, ldvt, &mut query, -1, &mut info,
                    );
                }
                check_info(stringify!($gesvd), info, FailureKind::NonConvergence)?;
                Ok(query[0] as usize)
            }

            fn gesvd(&self, scratch: &mut SvdScratch<$t>) -> i32 {
                let job = scratch.job.as_byte();
                let (m, n) = (to_int(scratch.m), to_int(scratch.n));
                let (lda, ldu, ldvt) = (to_int(scratch.lda()), to_int(scratch.ldu()), to_int(scratch.ldvt()));
                let lwork = to_int(scratch.work.len());
                let mut info = 0;
                unsafe {
                    lapack::$gesvd(
                        job, job, m, n, &mut scratch.a, lda, &mut scratch.s, &mut scratch.u, ldu,
                        &mut scratch.vt, ldvt, &mut scratch.work, lwork, &mut info,
                    );
                }
                info
            }
        }

        impl BackendEigh<$t> for LapackBackend {
            fn heev_query(&self, scratch: &mut EighScratch<$t>) -> Result<usize> {
                let n = to_int(scratch.n);
                let lda = to_int(scratch.n.max(1));
                let mut query = [0.0 as $t];
                let mut info = 0;
                unsafe {
                    lapack::$syev(b'V', b'U', n, &mut scratch.a, lda, &mut scratch.w, &mut query, -1, &mut info);
                }
                check_info(stringify!($syev), info, FailureKind::NonConvergence)?;
                Ok(query[0] as usize)
            }

            fn heev(&self, scratch: &mut EighScratch<$t>) -> i32 {
                let n = to_int(scratch.n);
                let lda = to_int(scratch.n.max(1));
                let lwork = to_int(scratch.work.len());
                let mut info = 0;
                unsafe {
                    lapack::$syev(
                        b'V', b'U', n, &mut scratch.a, lda, &mut scratch.w, &mut scratch.work, lwork, &mut info,
                    );
                }
                info
            }
        }

        impl BackendLu<$t> for LapackBackend {
            fn gesv(&self, scratch: &mut SolveScratch<$t>) -> i32 {
                let (n, nrhs) = (to_int(scratch.n), to_int(scratch.nrhs));
                let ld = to_int(scratch.n.max(1));
                let mut info = 0;
                unsafe {
                    lapack::$gesv(n, nrhs, &mut scratch.a, ld, &mut scratch.ipiv, &mut scratch.b, ld, &mut info);
                }
                info
            }

            fn getrf(&self, a: &mut [$t], scratch: &mut InverseScratch<$t>) -> i32 {
                let n = to_int(scratch.n);
                let lda = to_int(scratch.n.max(1));
                let mut info = 0;
                unsafe {
                    lapack::$getrf(n, n, a, lda, &mut scratch.ipiv, &mut info);
                }
                info
            }

            fn getri_query(&self, a: &mut [$t], scratch: &mut InverseScratch<$t>) -> Result<usize> {
                let n = to_int(scratch.n);
                let lda = to_int(scratch.n.max(1));
                let mut query = [0.0 as $t];
                let mut info = 0;
                unsafe {
                    lapack::$getri(n, a, lda, &scratch.ipiv, &mut query, -1, &mut info);
                }
                check_info(stringify!($getri), info, FailureKind::Singular)?;
                Ok(query[0] as usize)
            }

            fn getri(&self, a: &mut [$t], scratch: &mut InverseScratch<$t>) -> i32 {
                let n = to_int(scratch.n);
                let lda = to_int(scratch.n.max(1));
                let lwork = to_int(scratch.work.len());
                let mut info = 0;
                unsafe {
                    lapack::$getri(n, a, lda, &scratch.ipiv, &mut scratch.work, lwork, &mut info);
                }
                info
            }
        }

        impl BackendCholesky<$t> for LapackBackend {
            fn posv(&self, scratch: &mut SolveScratch<$t>) -> i32 {
                let (n, nrhs) = (to_int(scratch.n), to_int(scratch.nrhs));
                let ld = to_int(scratch.n.max(1));
                let mut info = 0;
                unsafe {
                    lapack::$posv(b'U', n, nrhs, &mut scratch.a, ld, &mut scratch.b, ld, &mut info);
                }
                info
            }
        }

        impl BackendBlas<$t> for LapackBackend {
            fn copy(&self, x: &[$t], y: &mut [$t]) {
                unsafe { blas::$copy(to_int(x.len()), x, 1, y, 1) }
            }

            fn scal(&self, alpha: $t, x: &mut [$t]) {
                unsafe { blas::$scal(to_int(x.len()), alpha, x, 1) }
            }

            fn dot(&self, x: &[$t], y: &[$t], _conj: Conjugation) -> $t {
                unsafe { blas::$dot(to_int(x.len()), x, 1, y, 1) }
            }

            fn gemm(
                &self,
                transa: Transpose,
                transb: Transpose,
                m: usize,
                n: usize,
                k: usize,
                alpha: $t,
                a: &[$t],
                lda: usize,
                b: &[$t],
                ldb: usize,
                beta: $t,
                c: &mut [$t],
                ldc: usize,
            ) {
                unsafe {
                    blas::$gemm(
                        transa.as_byte(), transb.as_byte(), to_int(m), to_int(n), to_int(k), alpha,
                        a, to_int(lda), b, to_int(ldb), beta, c, to_int(ldc),
                    );
                }
            }
        }
    };
}

macro_rules! impl_lapack_complex {
    (
        $t:ty,
        $gesvd:ident,
        $heev:ident,
        $geev:ident,
        $gesv:ident,
        $posv:ident,
        $getrf:ident,
        $getri:ident,
        $copy:ident,
        $scal:ident,
        $gemm:ident
    ) => {
        impl BackendSvd<$t> for LapackBackend {
            fn gesvd_query(&self, scratch: &mut SvdScratch<$t>) -> Result<usize> {
                let job = scratch.job.as_byte();
                let (m, n) = (to_int(scratch.m), to_int(scratch.n));
                let (lda, ldu, ldvt) = (to_int(scratch.lda()), to_int(scratch.ldu()), to_int(scratch.ldvt()));
                let mut query = [<$t>::new(0.0, 0.0)];
                let mut info = 0;
                unsafe {
                    lapack::$gesvd(
                        job, job, m, n, &mut scratch.a, lda, &mut scratch.s, &mut scratch.u, ldu,
                        &mut scratch.vt, ldvt, &mut query, -1, &mut scratch.rwork, &mut info,
                    );
                }
                check_info(stringify!($gesvd), info, FailureKind::NonConvergence)?;
                Ok(query[0].re as usize)
            }

            fn gesvd(&self, scratch: &mut SvdScratch<$t>) -> i32 {
                let job = scratch.job.as_byte();
                let (m, n) = (to_int(scratch.m), to_int(scratch.n));
                let (lda, ldu, ldvt) = (to_int(scratch.lda()), to_int(scratch.ldu()), to_int(scratch.ldvt()));
                let lwork = to_int(scratch.work.len());
                let mut info = 0;
                unsafe {
                    lapack::$gesvd(
                        job, job, m, n, &mut scratch.a, lda, &mut scratch.s, &mut scratch.u, ldu,
                        &mut scratch.vt, ldvt, &mut scratch.work, lwork, &mut scratch.rwork, &mut info,
                    );
                }
                info
            }
        }

        impl BackendEigh<$t> for LapackBackend {
            fn heev_query(&self, scratch: &mut EighScratch<$t>) -> Result<usize> {
                let n = to_int(scratch.n);
                let lda = to_int(scratch.n.max(1));
                let mut query = [<$t>::new(0.0, 0.0)];
                let mut info = 0;
                unsafe {
                    lapack::$heev(
                        b'V', b'U', n, &mut scratch.a, lda, &mut scratch.w, &mut query, -1, &mut scratch.rwork,
                        &mut info,
                    );
                }
                check_info(stringify!($heev), info, FailureKind::NonConvergence)?;
                Ok(query[0].re as usize)
            }

            fn heev(&self, scratch: &mut EighScratch<$t>) -> i32 {
                let n = to_int(scratch.n);
                let lda = to_int(scratch.n.max(1));
                let lwork = to_int(scratch.work.len());
                let mut info = 0;
                unsafe {
                    lapack::$heev(
                        b'V', b'U', n, &mut scratch.a, lda, &mut scratch.w, &mut scratch.work, lwork,
                        &mut scratch.rwork, &mut info,
                    );
                }
                info
            }
        }

        impl BackendEig<$t> for LapackBackend {
            fn geev_query(&self, scratch: &mut EigScratch<$t>) -> Result<usize> {
                let jobvl = if scratch.compute_left { b'V' } else { b'N' };
                let jobvr = if scratch.compute_right { b'V' } else { b'N' };
                let n = to_int(scratch.n);
                let lda = to_int(scratch.n.max(1));
                let (ldvl, ldvr) = (to_int(scratch.ldvl()), to_int(scratch.ldvr()));
                let mut query = [<$t>::new(0.0, 0.0)];
                let mut info = 0;
                unsafe {
                    lapack::$geev(
                        jobvl, jobvr, n, &mut scratch.a, lda, &mut scratch.w, &mut scratch.vl, ldvl,
                        &mut scratch.vr, ldvr, &mut query, -1, &mut scratch.rwork, &mut info,
                    );
                }
                check_info(stringify!($geev), info, FailureKind::NonConvergence)?;
                Ok(query[0].re as usize)
            }

            fn geev(&self, scratch: &mut EigScratch<$t>) -> i32 {
                let jobvl = if scratch.compute_left { b'V' } else { b'N' };
                let jobvr = if scratch.compute_right { b'V' } else { b'N' };
                let n = to_int(scratch.n);
                let lda = to_int(scratch.n.max(1));
                let (ldvl, ldvr) = (to_int(scratch.ldvl()), to_int(scratch.ldvr()));
                let lwork = to_int(scratch.work.len());
                let mut info = 0;
                unsafe {
                    lapack::$geev(
                        jobvl, jobvr, n, &mut scratch.a, lda, &mut scratch.w, &mut scratch.vl, ldvl,
                        &mut scratch.vr, ldvr, &mut scratch.work, lwork, &mut scratch.rwork, &mut info,
                    );
                }
                info
            }
        }

        impl BackendLu<$t> for LapackBackend {
            fn gesv(&self, scratch: &mut SolveScratch<$t>) -> i32 {
                let (n, nrhs) = (to_int(scratch.n), to_int(scratch.nrhs));
                let ld = to_int(scratch.n.max(1));
                let mut info = 0;
                unsafe {
                    lapack::$gesv(n, nrhs, &mut scratch.a, ld, &mut scratch.ipiv, &mut scratch.b, ld, &mut info);
                }
                info
            }

            fn getrf(&self, a: &mut [$t], scratch: &mut InverseScratch<$t>) -> i32 {
                let n = to_int(scratch.n);
                let lda = to_int(scratch.n.max(1));
                let mut info = 0;
                unsafe {
                    lapack::$getrf(n, n, a, lda, &mut scratch.ipiv, &mut info);
                }
                info
            }

            fn getri_query(&self, a: &mut [$t], scratch: &mut InverseScratch<$t>) -> Result<usize> {
                let n = to_int(scratch.n);
                let lda = to_int(scratch.n.max(1));
                let mut query = [<$t>::new(0.0, 0.0)];
                let mut info = 0;
                unsafe {
                    lapack::$getri(n, a, lda, &scratch.ipiv, &mut query, -1, &mut info);
                }
                check_info(stringify!($getri), info, FailureKind::Singular)?;
                Ok(query[0].re as usize)
            }

            fn getri(&self, a: &mut [$t], scratch: &mut InverseScratch<$t>) -> i32 {
                let n = to_int(scratch.n);
                let lda = to_int(scratch.n.max(1));
                let lwork = to_int(scratch.work.len());
                let mut info = 0;
                unsafe {
                    lapack::$getri(n, a, lda, &scratch.ipiv, &mut scratch.work, lwork, &mut info);
                }
                info
            }
        }

        impl BackendCholesky<$t> for LapackBackend {
            fn posv(&self, scratch: &mut SolveScratch<$t>) -> i32 {
                let (n, nrhs) = (to_int(scratch.n), to_int(scratch.nrhs));
                let ld = to_int(scratch.n.max(1));
                let mut info = 0;
                unsafe {
                    lapack::$posv(b'U', n, nrhs, &mut scratch.a, ld, &mut scratch.b, ld, &mut info);
                }
                info
            }
        }

        impl BackendBlas<$t> for LapackBackend {
            fn copy(&self, x: &[$t], y: &mut [$t]) {
                unsafe { blas::$copy(to_int(x.len()), x, 1, y, 1) }
            }

            fn scal(&self, alpha: $t, x: &mut [$t]) {
                unsafe { blas::$scal(to_int(x.len()), alpha, x, 1) }
            }

            // The complex dot routines return through an out-parameter whose calling
            // convention differs between BLAS builds, so the sum is formed here.
            fn dot(&self, x: &[$t], y: &[$t], conj: Conjugation) -> $t {
                let zero = <$t>::new(0.0, 0.0);
                match conj {
                    Conjugation::NoConjugate => x.iter().zip(y).fold(zero, |acc, (a, b)| acc + a * b),
                    Conjugation::Conjugate => x.iter().zip(y).fold(zero, |acc, (a, b)| acc + a.conj() * b),
                }
            }

            fn gemm(
                &self,
                transa: Transpose,
                transb: Transpose,
                m: usize,
                n: usize,
                k: usize,
                alpha: $t,
                a: &[$t],
                lda: usize,
                b: &[$t],
                ldb: usize,
                beta: $t,
                c: &mut [$t],
                ldc: usize,
            ) {
                unsafe {
                    blas::$gemm(
                        transa.as_byte(), transb.as_byte(), to_int(m), to_int(n), to_int(k), alpha,
                        a, to_int(lda), b, to_int(ldb), beta, c, to_int(ldc),
                    );
                }
            }
        }
    };
}

impl_lapack_real!(f32, sgesvd, ssyev, sgesv, sposv, sgetrf, sgetri, scopy, sscal, sdot, sgemm);
impl_lapack_real!(f64, dgesvd, dsyev, dgesv, dposv, dgetrf, dgetri, dcopy, dscal, ddot, dgemm);
impl_lapack_complex!(c32, cgesvd, cheev, cgeev, cgesv, cposv, cgetrf, cgetri, ccopy, cscal, cgemm);
impl_lapack_complex!(c64, zgesvd, zheev, zgeev, zgesv, zposv, zgetrf, zgetri, zcopy, zscal, zgemm);

// --- LinAlgBackendProvider dispatch ---

/// A provider struct that dispatches to the selected linear algebra backend
/// based on compile-time feature flags.
///
/// OpenBLAS and MKL (static or system) all export the reference Fortran ABI, so every
/// `backend_*` feature is served by [`LapackBackend`]; the feature only decides which
/// library is linked.
#[derive(Debug, Copy, Clone)]
pub struct LinAlgBackendProvider<F: Element> {
    _phantom: PhantomData<F>,
}

impl<F: Element> LinAlgBackendProvider<F> {
    pub fn new() -> Self {
        Self { _phantom: PhantomData }
    }
}

impl<F: Element> Default for LinAlgBackendProvider<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> BackendSvd<F> for LinAlgBackendProvider<F>
where
    F: Element,
    LapackBackend: BackendSvd<F>,
{
    fn gesvd_query(&self, scratch: &mut SvdScratch<F>) -> Result<usize> {
        LapackBackend.gesvd_query(scratch)
    }

    fn gesvd(&self, scratch: &mut SvdScratch<F>) -> i32 {
        LapackBackend.gesvd(scratch)
    }
}

impl<F> BackendEigh<F> for LinAlgBackendProvider<F>
where
    F: Element,
    LapackBackend: BackendEigh<F>,
{
    fn heev_query(&self, scratch: &mut EighScratch<F>) -> Result<usize> {
        LapackBackend.heev_query(scratch)
    }

    fn heev(&self, scratch: &mut EighScratch<F>) -> i32 {
        LapackBackend.heev(scratch)
    }
}

impl<F> BackendEig<F> for LinAlgBackendProvider<F>
where
    F: Element,
    LapackBackend: BackendEig<F>,
{
    fn geev_query(&self, scratch: &mut EigScratch<F>) -> Result<usize> {
        LapackBackend.geev_query(scratch)
    }

    fn geev(&self, scratch: &mut EigScratch<F>) -> i32 {
        LapackBackend.geev(scratch)
    }
}

impl<F> BackendLu<F> for LinAlgBackendProvider<F>
where
    F: Element,
    LapackBackend: BackendLu<F>,
{
    fn gesv(&self, scratch: &mut SolveScratch<F>) -> i32 {
        LapackBackend.gesv(scratch)
    }

    fn getrf(&self, a: &mut [F], scratch: &mut InverseScratch<F>) -> i32 {
        LapackBackend.getrf(a, scratch)
    }

    fn getri_query(&self, a: &mut [F], scratch: &mut InverseScratch<F>) -> Result<usize> {
        LapackBackend.getri_query(a, scratch)
    }

    fn getri(&self, a: &mut [F], scratch: &mut InverseScratch<F>) -> i32 {
        LapackBackend.getri(a, scratch)
    }
}

impl<F> BackendCholesky<F> for LinAlgBackendProvider<F>
where
    F: Element,
    LapackBackend: BackendCholesky<F>,
{
    fn posv(&self, scratch: &mut SolveScratch<F>) -> i32 {
        LapackBackend.posv(scratch)
    }
}

impl<F> BackendBlas<F> for LinAlgBackendProvider<F>
where
    F: Element,
    LapackBackend: BackendBlas<F>,
{
    fn copy(&self, x: &[F], y: &mut [F]) {
        LapackBackend.copy(x, y)
    }

    fn scal(&self, alpha: F, x: &mut [F]) {
        LapackBackend.scal(alpha, x)
    }

    fn dot(&self, x: &[F], y: &[F], conj: Conjugation) -> F {
        LapackBackend.dot(x, y, conj)
    }

    fn gemm(
        &self,
        transa: Transpose,
        transb: Transpose,
        m: usize,
        n: usize,
        k: usize,
        alpha: F,
        a: &[F],
        lda: usize,
        b: &[F],
        ldb: usize,
        beta: F,
        c: &mut [F],
        ldc: usize,
    ) {
        LapackBackend.gemm(transa, transb, m, n, k, alpha, a, lda, b, ldb, beta, c, ldc)
    }
}
