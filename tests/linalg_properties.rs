// tests/linalg_properties.rs
//
// Algebraic properties of the drivers, checked against ndarray-linalg as an independent
// implementation where one exists.

use approx::assert_abs_diff_eq;
use ndarray::{Array1, Array2};
use ndarray_linalg::{Eigh, Inverse, Solve, SVD, UPLO};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use rowmajor_lapack::utility::{dseig, dsvd, sinv, spinv, zglslv};
use rowmajor_lapack::{c64, glslv, inv, pinv, seig, sortf, svd, vsdiv, LinalgError, SortOrder};

fn random_array(rows: usize, cols: usize, seed: u64) -> Array2<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Array2::from_shape_fn((rows, cols), |_| rng.gen_range(-1.0..1.0))
}

fn row_major(a: &Array2<f64>) -> Vec<f64> {
    a.iter().copied().collect()
}

fn from_row_major(data: &[f64], rows: usize, cols: usize) -> Array2<f64> {
    Array2::from_shape_vec((rows, cols), data.to_vec()).expect("shape matches length")
}

fn assert_arrays_close(a: &Array2<f64>, b: &Array2<f64>, epsilon: f64) {
    assert_eq!(a.dim(), b.dim());
    for (x, y) in a.iter().zip(b.iter()) {
        assert_abs_diff_eq!(*x, *y, epsilon = epsilon);
    }
}

#[test]
fn inverse_agrees_with_ndarray_linalg() {
    for (seed, n) in [(1, 1), (2, 3), (3, 8), (4, 16)] {
        let a = random_array(n, n, seed);
        let mut buffer = row_major(&a);
        inv(&mut buffer, n).unwrap();
        let ours = from_row_major(&buffer, n, n);

        let oracle = a.inv().unwrap();
        assert_arrays_close(&ours, &oracle, 1e-8);
        assert_arrays_close(&ours.dot(&a), &Array2::eye(n), 1e-8);
    }
}

#[test]
fn single_precision_inverse_round_trip() {
    let a = [4.0_f32, 7.0, 2.0, 6.0];
    let mut buffer = a;
    sinv(&mut buffer, 2).unwrap();
    // [[4, 7], [2, 6]]⁻¹ = [[0.6, -0.7], [-0.2, 0.4]]
    for (got, want) in buffer.iter().zip([0.6_f32, -0.7, -0.2, 0.4]) {
        assert_abs_diff_eq!(*got, want, epsilon = 1e-5);
    }
}

#[test]
fn singular_values_agree_with_ndarray_linalg() {
    for (seed, (m, n)) in [(10, (4, 4)), (11, (7, 3)), (12, (3, 7))] {
        let a = random_array(m, n, seed);
        let factors = svd(&row_major(&a), m, n).unwrap();
        let (_, oracle, _) = a.svd(false, false).unwrap();
        let ours = Array1::from(factors.singular_values());
        assert_eq!(ours.len(), oracle.len());
        for (x, y) in ours.iter().zip(oracle.iter()) {
            assert_abs_diff_eq!(*x, *y, epsilon = 1e-10);
        }

        let rebuilt = factors.u.dot(&factors.s).dot(&factors.v.t());
        assert_arrays_close(&rebuilt, &a, 1e-10);
        assert_arrays_close(&factors.u.t().dot(&factors.u), &Array2::eye(m), 1e-10);
        assert_arrays_close(&factors.v.t().dot(&factors.v), &Array2::eye(n), 1e-10);
    }
}

#[test]
fn fixed_type_svd_returns_owned_square_factors() {
    let factors = dsvd(&[3.0, 0.0, 0.0, 0.0, -2.0, 0.0], 2, 3).unwrap();
    assert_eq!(factors.u.dim(), (2, 2));
    assert_eq!(factors.v.dim(), (3, 3));
    assert_eq!(factors.singular_values().len(), 2);
    assert_abs_diff_eq!(factors.s[[0, 0]], 3.0, epsilon = 1e-14);
    assert_abs_diff_eq!(factors.s[[1, 1]], 2.0, epsilon = 1e-14);
}

#[test]
fn symmetric_eigenvalues_agree_with_ndarray_linalg() {
    let n = 6;
    let b = random_array(n, n, 77);
    let a = &b + &b.t();
    let (oracle, _) = a.eigh(UPLO::Upper).unwrap();

    let mut v = vec![0.0; n * n];
    let mut d = vec![0.0; n * n];
    seig(&row_major(&a), n, SortOrder::Descending, &mut v, &mut d).unwrap();
    let d = from_row_major(&d, n, n);
    for (k, expected) in oracle.iter().rev().enumerate() {
        assert_abs_diff_eq!(d[[k, k]], *expected, epsilon = 1e-10);
    }

    let v = from_row_major(&v, n, n);
    assert_arrays_close(&a.dot(&v), &v.dot(&d), 1e-10);
}

#[test]
fn diagonal_scenario_through_the_fixed_type_entry_point() {
    let a = [4.0, 0.0, 0.0, 9.0];
    let mut v = [0.0; 4];
    let mut d = [0.0; 4];

    dseig(&a, 2, SortOrder::Ascending, &mut v, &mut d).unwrap();
    assert_abs_diff_eq!(d[0], 4.0, epsilon = 1e-14);
    assert_abs_diff_eq!(d[3], 9.0, epsilon = 1e-14);
    assert_abs_diff_eq!(v[0].abs(), 1.0, epsilon = 1e-14);
    assert_abs_diff_eq!(v[3].abs(), 1.0, epsilon = 1e-14);

    dseig(&a, 2, SortOrder::Descending, &mut v, &mut d).unwrap();
    assert_abs_diff_eq!(d[0], 9.0, epsilon = 1e-14);
    assert_abs_diff_eq!(d[3], 4.0, epsilon = 1e-14);
    assert_abs_diff_eq!(v[1].abs(), 1.0, epsilon = 1e-14);
    assert_abs_diff_eq!(v[2].abs(), 1.0, epsilon = 1e-14);
    assert_abs_diff_eq!(v[0], 0.0, epsilon = 1e-14);
}

#[test]
fn general_solve_agrees_with_ndarray_linalg() {
    let n = 7;
    let a = random_array(n, n, 5);
    let b = random_array(n, 1, 6);
    let mut x = vec![0.0; n];
    glslv(&row_major(&a), n, &row_major(&b), 1, &mut x).unwrap();

    let oracle = a.solve(&b.column(0).to_owned()).unwrap();
    for (got, want) in x.iter().zip(oracle.iter()) {
        assert_abs_diff_eq!(*got, *want, epsilon = 1e-9);
    }
}

#[test]
fn singular_complex_solve_yields_zero() {
    let zero = c64::new(0.0, 0.0);
    let one = c64::new(1.0, 0.0);
    let a = [one, c64::new(0.0, 1.0), zero, zero];
    let b = [one, one];
    let mut x = [c64::new(5.0, 5.0); 2];
    let err = zglslv(&a, 2, &b, 1, &mut x).unwrap_err();
    assert!(err.is_numerical_failure());
    assert_eq!(x, [zero; 2]);
}

#[test]
fn tall_pseudo_inverse_is_a_left_inverse() {
    let (m, n) = (9, 4);
    let a = random_array(m, n, 31);
    let mut out = vec![0.0; n * m];
    pinv(&row_major(&a), m, n, &mut out).unwrap();
    let p = from_row_major(&out, n, m);
    assert_arrays_close(&p.dot(&a), &Array2::eye(n), 1e-10);
    // Moore-Penrose: A P A = A.
    assert_arrays_close(&a.dot(&p).dot(&a), &a, 1e-10);
}

#[test]
fn rank_deficient_pseudo_inverse_does_not_blow_up() {
    // Two identical rows.
    let a = [1.0_f32, 2.0, 1.0, 2.0];
    let mut out = [f32::NAN; 4];
    spinv(&a, 2, 2, &mut out).unwrap();
    assert!(out.iter().all(|x| x.is_finite() && x.abs() <= 1.0));
}

#[test]
fn sorting_scenario() {
    let mut values = [3.0_f64, 1.0, 2.0];
    let mut indices = [0; 3];
    sortf(&mut values, None, Some(&mut indices), SortOrder::Descending).unwrap();
    assert_eq!(values, [3.0, 2.0, 1.0]);
    assert_eq!(indices, [0, 2, 1]);
}

#[test]
fn division_by_zero_is_all_zero_never_nan() {
    let mut rng = ChaCha8Rng::seed_from_u64(8);
    let mut a: Vec<f64> = (0..64).map(|_| rng.gen_range(-1e6..1e6)).collect();
    let mut out = vec![f64::NAN; 64];
    vsdiv(&mut a, 0.0, Some(&mut out)).unwrap();
    assert!(out.iter().all(|x| *x == 0.0));

    let mut z = [c64::new(1.0, -1.0), c64::new(f64::MAX, 0.0)];
    vsdiv(&mut z, c64::new(0.0, 0.0), None).unwrap();
    assert_eq!(z, [c64::new(0.0, 0.0); 2]);
}

#[test]
fn shape_errors_are_reported_not_panicked() {
    let mut out = [0.0_f64; 5];
    let err = pinv(&[1.0; 6], 2, 3, &mut out).unwrap_err();
    assert_eq!(
        err,
        LinalgError::DimensionMismatch {
            argument: "out",
            expected: 6,
            got: 5
        }
    );
    assert!(!err.is_numerical_failure());
    assert_eq!(
        err.to_string(),
        "dimension mismatch for `out`: expected 6 elements, got 5"
    );
}
