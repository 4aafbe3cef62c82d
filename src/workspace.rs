// src/workspace.rs

//! Per-call scratch storage.
//!
//! Each driver builds exactly one scratch struct, converts its input into it, asks the
//! backend how much workspace the kernel wants, grows `work` to that size and executes.
//! The struct is dropped before the driver returns on every path, so nothing here
//! outlives a single call and no buffer is shared between calls or threads.

use std::fmt;

use log::trace;
use num_traits::Zero;

use crate::linalg_backends::SvdJob;
use crate::scalar::Element;

/// Lifecycle stage of a driver call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    AllocateInput,
    QueryWorkspace,
    AllocateWorkspace,
    Execute,
    Finalize,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::AllocateInput => "allocate-input",
            Stage::QueryWorkspace => "query-workspace",
            Stage::AllocateWorkspace => "allocate-workspace",
            Stage::Execute => "execute",
            Stage::Finalize => "finalize",
        };
        f.write_str(name)
    }
}

/// Traces a stage transition as `<prefix><routine>: <stage>`, e.g. `dgesvd: execute`.
pub(crate) fn log_stage<T: Element>(routine: &str, stage: Stage) {
    trace!("{}{}: {}", T::PREFIX, routine, stage);
}

fn zeros<T: Copy>(len: usize, zero: T) -> Vec<T> {
    vec![zero; len]
}

/// Scratch for the two-phase `?gesvd`.
#[derive(Debug)]
pub struct SvdScratch<T: Element> {
    pub job: SvdJob,
    pub m: usize,
    pub n: usize,
    /// Column-major copy of the input, destroyed by the kernel.
    pub a: Vec<T>,
    pub s: Vec<T::Real>,
    /// Column-major `m x m` (`All`) or `m x k` (`Thin`).
    pub u: Vec<T>,
    /// Column-major `n x n` (`All`) or `k x n` (`Thin`).
    pub vt: Vec<T>,
    pub work: Vec<T>,
    pub rwork: Vec<T::Real>,
}

impl<T: Element> SvdScratch<T> {
    pub fn new(job: SvdJob, m: usize, n: usize) -> Self {
        let k = m.min(n);
        let (u_cols, vt_rows) = match job {
            SvdJob::All => (m, n),
            SvdJob::Thin => (k, k),
        };
        let rwork_len = if T::IS_COMPLEX { (5 * k).max(1) } else { 0 };
        Self {
            job,
            m,
            n,
            a: zeros(m * n, T::zero()),
            s: zeros(k, T::Real::zero()),
            u: zeros(m * u_cols, T::zero()),
            vt: zeros(vt_rows * n, T::zero()),
            work: Vec::new(),
            rwork: zeros(rwork_len, T::Real::zero()),
        }
    }

    pub fn k(&self) -> usize {
        self.m.min(self.n)
    }

    pub fn lda(&self) -> usize {
        self.m.max(1)
    }

    pub fn ldu(&self) -> usize {
        self.m.max(1)
    }

    pub fn ldvt(&self) -> usize {
        match self.job {
            SvdJob::All => self.n.max(1),
            SvdJob::Thin => self.k().max(1),
        }
    }

    pub fn allocate_work(&mut self, lwork: usize) {
        self.work = zeros(lwork.max(1), T::zero());
    }
}

/// Scratch for the two-phase `?syev` / `?heev`.
#[derive(Debug)]
pub struct EighScratch<T: Element> {
    pub n: usize,
    /// Column-major input; holds the eigenvectors on exit.
    pub a: Vec<T>,
    /// Eigenvalues in ascending order on exit.
    pub w: Vec<T::Real>,
    pub work: Vec<T>,
    pub rwork: Vec<T::Real>,
}

impl<T: Element> EighScratch<T> {
    pub fn new(n: usize) -> Self {
        let rwork_len = if T::IS_COMPLEX {
            (3 * n).saturating_sub(2).max(1)
        } else {
            0
        };
        Self {
            n,
            a: zeros(n * n, T::zero()),
            w: zeros(n, T::Real::zero()),
            work: Vec::new(),
            rwork: zeros(rwork_len, T::Real::zero()),
        }
    }

    pub fn allocate_work(&mut self, lwork: usize) {
        self.work = zeros(lwork.max(1), T::zero());
    }
}

/// Scratch for the two-phase `?geev` (complex types only).
#[derive(Debug)]
pub struct EigScratch<C: Element> {
    pub n: usize,
    pub compute_left: bool,
    pub compute_right: bool,
    pub a: Vec<C>,
    /// Eigenvalues in backend order.
    pub w: Vec<C>,
    /// Column-major left eigenvectors, or a single placeholder element when not requested.
    pub vl: Vec<C>,
    /// Column-major right eigenvectors, or a single placeholder element when not requested.
    pub vr: Vec<C>,
    pub work: Vec<C>,
    pub rwork: Vec<C::Real>,
}

impl<C: Element> EigScratch<C> {
    pub fn new(n: usize, compute_left: bool, compute_right: bool) -> Self {
        let side_len = |wanted: bool| if wanted { n * n } else { 1 };
        Self {
            n,
            compute_left,
            compute_right,
            a: zeros(n * n, C::zero()),
            w: zeros(n, C::zero()),
            vl: zeros(side_len(compute_left), C::zero()),
            vr: zeros(side_len(compute_right), C::zero()),
            work: Vec::new(),
            rwork: zeros((2 * n).max(1), C::Real::zero()),
        }
    }

    pub fn ldvl(&self) -> usize {
        if self.compute_left {
            self.n.max(1)
        } else {
            1
        }
    }

    pub fn ldvr(&self) -> usize {
        if self.compute_right {
            self.n.max(1)
        } else {
            1
        }
    }

    pub fn allocate_work(&mut self, lwork: usize) {
        self.work = zeros(lwork.max(1), C::zero());
    }
}

/// Scratch for `?gesv` and `?posv`: column-major copies of `A` and `B`.
///
/// `b` is overwritten with the solution; the caller's `B` is never touched.
#[derive(Debug)]
pub struct SolveScratch<T: Element> {
    pub n: usize,
    pub nrhs: usize,
    pub a: Vec<T>,
    pub b: Vec<T>,
    /// Pivot indices, only used by the LU path.
    pub ipiv: Vec<i32>,
}

impl<T: Element> SolveScratch<T> {
    pub fn new(n: usize, nrhs: usize, with_pivots: bool) -> Self {
        Self {
            n,
            nrhs,
            a: zeros(n * n, T::zero()),
            b: zeros(n * nrhs, T::zero()),
            ipiv: if with_pivots { vec![0; n] } else { Vec::new() },
        }
    }
}

/// Scratch for the in-place `?getrf` + `?getri` inversion.
#[derive(Debug)]
pub struct InverseScratch<T: Element> {
    pub n: usize,
    pub ipiv: Vec<i32>,
    pub work: Vec<T>,
}

impl<T: Element> InverseScratch<T> {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            ipiv: vec![0; n],
            work: Vec::new(),
        }
    }

    pub fn allocate_work(&mut self, lwork: usize) {
        self.work = zeros(lwork.max(1), T::zero());
    }
}
