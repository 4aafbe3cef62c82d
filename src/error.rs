// src/error.rs

use std::cmp::Ordering;

use thiserror::Error;

/// Errors returned by the drivers.
///
/// Every variant that originates from the backend (`InvalidArgument`, `NonConvergence`,
/// `SingularMatrix`, `NotPositiveDefinite`) is returned *after* the caller's outputs have
/// been zero-filled, so a caller that ignores the error still never sees partial or
/// column-major data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinalgError {
    /// A caller buffer does not have the length implied by the given dimensions.
    #[error("dimension mismatch for `{argument}`: expected {expected} elements, got {got}")]
    DimensionMismatch {
        argument: &'static str,
        expected: usize,
        got: usize,
    },

    /// A dimension, or the element count it implies, does not fit LAPACK's 32-bit integers.
    #[error("`{argument}` is too large for the LAPACK integer range")]
    DimensionOverflow { argument: &'static str },

    /// The backend rejected an argument (`info < 0`). `position` is 1-based.
    #[error("{routine}: argument {position} had an illegal value")]
    InvalidArgument { routine: &'static str, position: i32 },

    /// An iterative kernel did not converge (`info > 0` from SVD / eigensolvers).
    #[error("{routine} failed to converge (info = {info})")]
    NonConvergence { routine: &'static str, info: i32 },

    /// LU factorization hit an exactly zero pivot (`info > 0` from `?gesv`, `?getrf`, `?getri`).
    #[error("{routine}: matrix is singular, U({info},{info}) is exactly zero")]
    SingularMatrix { routine: &'static str, info: i32 },

    /// Cholesky factorization failed (`info > 0` from `?posv`).
    #[error("{routine}: leading minor of order {info} is not positive definite")]
    NotPositiveDefinite { routine: &'static str, info: i32 },
}

impl LinalgError {
    /// True when the backend ran and reported a numerical failure, as opposed to a
    /// malformed call.
    pub fn is_numerical_failure(&self) -> bool {
        matches!(
            self,
            Self::NonConvergence { .. } | Self::SingularMatrix { .. } | Self::NotPositiveDefinite { .. }
        )
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LinalgError>;

/// How a positive `info` from a given routine is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NonConvergence,
    Singular,
    NotPositiveDefinite,
}

/// Classifies a LAPACK `info` value.
pub fn check_info(routine: &'static str, info: i32, kind: FailureKind) -> Result<()> {
    match info.cmp(&0) {
        Ordering::Equal => Ok(()),
        Ordering::Less => Err(LinalgError::InvalidArgument {
            routine,
            position: -info,
        }),
        Ordering::Greater => Err(match kind {
            FailureKind::NonConvergence => LinalgError::NonConvergence { routine, info },
            FailureKind::Singular => LinalgError::SingularMatrix { routine, info },
            FailureKind::NotPositiveDefinite => LinalgError::NotPositiveDefinite { routine, info },
        }),
    }
}

/// Converts a dimension to a LAPACK integer.
pub fn lapack_int(argument: &'static str, n: usize) -> Result<i32> {
    i32::try_from(n).map_err(|_| LinalgError::DimensionOverflow { argument })
}

/// Element count of a `rows x cols` buffer, with both dimensions in LAPACK range.
pub fn element_count(argument: &'static str, rows: usize, cols: usize) -> Result<usize> {
    lapack_int(argument, rows)?;
    lapack_int(argument, cols)?;
    rows.checked_mul(cols).ok_or(LinalgError::DimensionOverflow { argument })
}

/// Checks that a caller buffer holds exactly `expected` elements.
pub fn check_len(argument: &'static str, expected: usize, got: usize) -> Result<()> {
    if expected == got {
        Ok(())
    } else {
        Err(LinalgError::DimensionMismatch {
            argument,
            expected,
            got,
        })
    }
}
