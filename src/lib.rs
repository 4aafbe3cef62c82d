// Row-major dense linear algebra over LAPACK

#![doc = include_str!("../README.md")]

pub mod decomposition;
pub mod error;
pub mod layout;
pub mod linalg_backends;
pub mod scalar;
pub mod solvers;
pub mod sorting;
pub mod utility;
pub mod vector;
pub mod workspace;


pub use decomposition::{eig, seig, svd, SvdFactors};
pub use error::{LinalgError, Result};
pub use linalg_backends::{Conjugation, LapackBackend, LinAlgBackendProvider};
pub use ndarray_linalg::{c32, c64};
pub use scalar::Element;
pub use solvers::{glslv, inv, pinv, slslv};
pub use sorting::{sortf, SortOrder};
pub use vector::{vsadd, vsdiv, vsmul, vssub, vvcopy, vvdot, vvmul};
