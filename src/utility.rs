// src/utility.rs

//! Fixed-signature entry points, one per precision and value domain.
//!
//! The prefix letter picks the type the way BLAS does: `s` is `f32`, `d` is `f64`, `c` is
//! [`c32`] and `z` is [`c64`]. Each function forwards to the generic driver of the same
//! name. `?seig` is the symmetric (Hermitian) eigensolver and `?geig` the general one.
//!
//! ```
//! use rowmajor_lapack::utility::dinv;
//!
//! let mut a = [2.0, 0.0, 0.0, 4.0];
//! dinv(&mut a, 2).unwrap();
//! assert_eq!(a, [0.5, 0.0, 0.0, 0.25]);
//! ```

use ndarray_linalg::{c32, c64};

use crate::decomposition::{self, SvdFactors};
use crate::error::Result;
use crate::linalg_backends::Conjugation;
use crate::solvers;
use crate::sorting::SortOrder;
use crate::vector;

macro_rules! entry_points {
    (
        $t:ty, $c:ty;
        $svd:ident, $seig:ident, $geig:ident, $glslv:ident, $slslv:ident, $pinv:ident, $inv:ident;
        $vvcopy:ident, $vvmul:ident, $vvdot:ident, $vsmul:ident, $vsdiv:ident, $vsadd:ident, $vssub:ident
    ) => {
        #[doc = concat!("[`svd`](decomposition::svd) on `", stringify!($t), "`.")]
        pub fn $svd(a: &[$t], dim1: usize, dim2: usize) -> Result<SvdFactors<$t>> {
            decomposition::svd(a, dim1, dim2)
        }

        #[doc = concat!("[`seig`](decomposition::seig) on `", stringify!($t), "`.")]
        pub fn $seig(a: &[$t], dim: usize, order: SortOrder, v: &mut [$t], d: &mut [$t]) -> Result<()> {
            decomposition::seig(a, dim, order, v, d)
        }

        #[doc = concat!("[`eig`](decomposition::eig) on `", stringify!($t), "`.")]
        pub fn $geig(
            a: &[$t],
            dim: usize,
            order: SortOrder,
            vl: Option<&mut [$c]>,
            vr: Option<&mut [$c]>,
            d: &mut [$c],
        ) -> Result<()> {
            decomposition::eig(a, dim, order, vl, vr, d)
        }

        #[doc = concat!("[`glslv`](solvers::glslv) on `", stringify!($t), "`.")]
        pub fn $glslv(a: &[$t], dim: usize, b: &[$t], n_col: usize, x: &mut [$t]) -> Result<()> {
            solvers::glslv(a, dim, b, n_col, x)
        }

        #[doc = concat!("[`slslv`](solvers::slslv) on `", stringify!($t), "`.")]
        pub fn $slslv(a: &[$t], dim: usize, b: &[$t], n_col: usize, x: &mut [$t]) -> Result<()> {
            solvers::slslv(a, dim, b, n_col, x)
        }

        #[doc = concat!("[`pinv`](solvers::pinv) on `", stringify!($t), "`.")]
        pub fn $pinv(a: &[$t], dim1: usize, dim2: usize, out: &mut [$t]) -> Result<()> {
            solvers::pinv(a, dim1, dim2, out)
        }

        #[doc = concat!("[`inv`](solvers::inv) on `", stringify!($t), "`.")]
        pub fn $inv(a: &mut [$t], dim: usize) -> Result<()> {
            solvers::inv(a, dim)
        }

        #[doc = concat!("[`vvcopy`](vector::vvcopy) on `", stringify!($t), "`.")]
        pub fn $vvcopy(a: &[$t], c: &mut [$t]) -> Result<()> {
            vector::vvcopy(a, c)
        }

        #[doc = concat!("[`vvmul`](vector::vvmul) on `", stringify!($t), "`.")]
        pub fn $vvmul(a: &mut [$t], b: &[$t], c: Option<&mut [$t]>) -> Result<()> {
            vector::vvmul(a, b, c)
        }

        #[doc = concat!("[`vvdot`](vector::vvdot) on `", stringify!($t), "`.")]
        pub fn $vvdot(a: &[$t], b: &[$t], conj: Conjugation) -> Result<$t> {
            vector::vvdot(a, b, conj)
        }

        #[doc = concat!("[`vsmul`](vector::vsmul) on `", stringify!($t), "`.")]
        pub fn $vsmul(a: &mut [$t], s: $t, c: Option<&mut [$t]>) -> Result<()> {
            vector::vsmul(a, s, c)
        }

        #[doc = concat!("[`vsdiv`](vector::vsdiv) on `", stringify!($t), "`.")]
        pub fn $vsdiv(a: &mut [$t], s: $t, c: Option<&mut [$t]>) -> Result<()> {
            vector::vsdiv(a, s, c)
        }

        #[doc = concat!("[`vsadd`](vector::vsadd) on `", stringify!($t), "`.")]
        pub fn $vsadd(a: &mut [$t], s: $t, c: Option<&mut [$t]>) -> Result<()> {
            vector::vsadd(a, s, c)
        }

        #[doc = concat!("[`vssub`](vector::vssub) on `", stringify!($t), "`.")]
        pub fn $vssub(a: &mut [$t], s: $t, c: Option<&mut [$t]>) -> Result<()> {
            vector::vssub(a, s, c)
        }
    };
}

entry_points!(
    f32, c32;
    ssvd, sseig, sgeig, sglslv, sslslv, spinv, sinv;
    svvcopy, svvmul, svvdot, svsmul, svsdiv, svsadd, svssub
);
entry_points!(
    f64, c64;
    dsvd, dseig, dgeig, dglslv, dslslv, dpinv, dinv;
    dvvcopy, dvvmul, dvvdot, dvsmul, dvsdiv, dvsadd, dvssub
);
entry_points!(
    c32, c32;
    csvd, cseig, cgeig, cglslv, cslslv, cpinv, cinv;
    cvvcopy, cvvmul, cvvdot, cvsmul, cvsdiv, cvsadd, cvssub
);
entry_points!(
    c64, c64;
    zsvd, zseig, zgeig, zglslv, zslslv, zpinv, zinv;
    zvvcopy, zvvmul, zvvdot, zvsmul, zvsdiv, zvsadd, zvssub
);

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn every_precision_reaches_its_backend() {
        let a = [2.0_f32, 1.0, 1.0, 3.0];
        let b = [3.0_f32, 5.0];
        let mut x = [0.0_f32; 2];
        sglslv(&a, 2, &b, 1, &mut x).unwrap();
        assert_abs_diff_eq!(x[0], 0.8, epsilon = 1e-5);
        assert_abs_diff_eq!(x[1], 1.4, epsilon = 1e-5);

        let mut m = [c64::new(0.0, 2.0)];
        zinv(&mut m, 1).unwrap();
        assert_abs_diff_eq!(m[0].re, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(m[0].im, -0.5, epsilon = 1e-12);
    }

    #[test]
    fn complex_pair_keeps_only_real_parts_on_the_diagonal() {
        // Rotation by 90 degrees: eigenvalues are +i and -i, both with real part 0.
        let a = [0.0_f64, -1.0, 1.0, 0.0];
        let mut vr = [c64::new(0.0, 0.0); 4];
        let mut d = [c64::new(9.0, 9.0); 4];
        dgeig(&a, 2, SortOrder::Ascending, None, Some(&mut vr), &mut d).unwrap();
        for x in d {
            assert_abs_diff_eq!(x.norm(), 0.0, epsilon = 1e-12);
        }

        // The imaginary parts survive in the eigenvectors: A v = λ v with λ = ±i.
        let mut imag = [0.0; 2];
        for (k, slot) in imag.iter_mut().enumerate() {
            let (v0, v1) = (vr[k], vr[2 + k]);
            let (av0, av1) = (-v1, v0);
            let lambda = (v0.conj() * av0 + v1.conj() * av1) / (v0.norm_sqr() + v1.norm_sqr());
            assert_abs_diff_eq!(lambda.re, 0.0, epsilon = 1e-12);
            *slot = lambda.im;
        }
        imag.sort_by(|x, y| x.total_cmp(y));
        assert_abs_diff_eq!(imag[0], -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(imag[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn vector_entry_points_forward() {
        let mut a = [c32::new(1.0, 0.0), c32::new(0.0, 1.0)];
        cvsadd(&mut a, c32::new(1.0, 1.0), None).unwrap();
        assert_eq!(a, [c32::new(2.0, 1.0), c32::new(1.0, 2.0)]);
        assert_eq!(dvvdot(&[1.0, 2.0], &[3.0, 4.0], Conjugation::NoConjugate).unwrap(), 11.0);
    }
}
