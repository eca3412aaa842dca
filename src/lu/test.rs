use super::*;
use crate::algebra::{CscMatrix, FloatT};

fn test_matrix_3x3() -> CscMatrix<f64> {
    // A =
    //[ 4.0  1.0    ⋅ ]
    //[ 2.0  5.0  1.0]
    //[  ⋅   3.0  6.0]
    CscMatrix::new(
        3,
        3,
        vec![0, 2, 5, 7],
        vec![0, 1, 0, 1, 2, 1, 2],
        vec![4., 2., 1., 5., 3., 1., 6.],
    )
}

// b = A*x for a CSC matrix
fn csc_mul<T: FloatT>(A: &CscMatrix<T>, x: &[T]) -> Vec<T> {
    let mut b = vec![T::zero(); A.m];
    for col in 0..A.n {
        for p in A.colptr[col]..A.colptr[col + 1] {
            b[A.rowval[p]] += A.nzval[p] * x[col];
        }
    }
    b
}

fn inf_norm_diff<T: FloatT>(a: &[T], b: &[T]) -> T {
    zip(a, b).fold(T::zero(), |acc, (x, y)| T::max(acc, T::abs(*x - *y)))
}

fn identity_opts(n: usize) -> LUSettings<f64> {
    LUSettingsBuilder::default()
        .perm((0..n).collect())
        .build()
        .unwrap()
}

#[test]
fn test_solve_from_factors() {
    //L =
    //[1.0   ⋅     ⋅ ]
    //[2.0  1.0    ⋅ ]
    //[ ⋅  -1.0   1.0]
    let Lp = vec![0, 2, 4, 5];
    let Li = vec![0, 1, 1, 2, 2];
    let Lx = vec![1., 2., 1., -1., 1.];

    //U =
    //[2.0  1.0  3.0]
    //[ ⋅   4.0   ⋅ ]
    //[ ⋅    ⋅   5.0]
    let Up = vec![0, 1, 3, 5];
    let Ui = vec![0, 0, 1, 0, 2];
    let Ux = vec![2., 1., 4., 3., 5.];

    let x = vec![1., -1., 2.];

    let mut b = vec![1., 1., 3.];
    _lsolve(&Lp, &Li, &Lx, &mut b);
    assert_eq!(b, x);

    let mut b = vec![6., -4., 10.];
    _usolve(&Up, &Ui, &Ux, &mut b);
    assert_eq!(b, vec![0.5, -1., 2.]);
}

#[test]
fn test_solve_basic() {
    let A = test_matrix_3x3();
    let x = [1., 2., 3.];

    //no reordering
    let mut factors = LUFactorisation::new(&A, Some(identity_opts(3))).unwrap();
    let mut b = [6., 15., 24.];
    factors.solve(&mut b);
    assert!(inf_norm_diff(&x, &b) <= 1e-12);
    assert_eq!(factors.swap_count(), 0);

    //now with all defaults, including amd
    let mut factors = LUFactorisation::new(&A, None).unwrap();
    let mut b = [6., 15., 24.];
    factors.solve(&mut b);
    assert!(inf_norm_diff(&x, &b) <= 1e-12);

    //user specified permutation
    let opts = LUSettingsBuilder::<f64>::default()
        .perm(vec![2, 0, 1])
        .build()
        .unwrap();
    let mut factors = LUFactorisation::new(&A, Some(opts)).unwrap();
    let mut b = [6., 15., 24.];
    factors.solve(&mut b);
    assert!(inf_norm_diff(&x, &b) <= 1e-12);

    //repeated solves reuse the factors
    let mut b = [4., 2., 0.];
    factors.solve(&mut b);
    assert!(inf_norm_diff(&[1., 0., 0.], &b) <= 1e-12);
}

#[test]
fn test_zero_diagonal_pivoting() {
    // A =
    //[  ⋅   1.0]
    //[ 1.0   ⋅ ]
    let A = CscMatrix::new(2, 2, vec![0, 1, 2], vec![1, 0], vec![1., 1.]);
    let mut factors = LUFactorisation::new(&A, Some(identity_opts(2))).unwrap();
    assert_eq!(factors.swap_count(), 2);
    assert_eq!(factors.pinv, vec![1, 0]);

    let mut b = [2., 3.];
    factors.solve(&mut b);
    assert_eq!(b, [3., 2.]);
}

#[test]
fn test_pivot_threshold() {
    // A =
    //[ 1e-3  1.0]
    //[ 1.0   1.0]
    let A = CscMatrix::new(2, 2, vec![0, 2, 4], vec![0, 1, 0, 1], vec![1e-3, 1., 1., 1.]);
    let x = [1., -1.];
    let b0 = csc_mul(&A, &x);

    //default threshold rejects the small diagonal
    let mut factors = LUFactorisation::new(&A, Some(identity_opts(2))).unwrap();
    assert_eq!(factors.swap_count(), 2);
    let mut b = b0.clone();
    factors.solve(&mut b);
    assert!(inf_norm_diff(&x, &b) <= 1e-12);

    //a looser threshold keeps it
    let opts = LUSettingsBuilder::default()
        .perm(vec![0, 1])
        .pivot_threshold(1e-4)
        .build()
        .unwrap();
    let mut factors = LUFactorisation::new(&A, Some(opts)).unwrap();
    assert_eq!(factors.swap_count(), 0);
    let mut b = b0;
    factors.solve(&mut b);
    assert!(inf_norm_diff(&x, &b) <= 1e-10);
}

#[test]
fn test_singular_matrix() {
    // A =
    //[ 1.0  2.0]
    //[ 2.0  4.0]
    let A = CscMatrix::new(2, 2, vec![0, 2, 4], vec![0, 1, 0, 1], vec![1., 2., 2., 4.]);
    assert_eq!(
        LUFactorisation::new(&A, Some(identity_opts(2))).unwrap_err(),
        LUError::ZeroPivot { column: 1 }
    );

    //structurally singular, second column empty
    let A = CscMatrix::new(2, 2, vec![0, 2, 2], vec![0, 1], vec![1., 1.]);
    assert_eq!(
        LUFactorisation::new(&A, Some(identity_opts(2))).unwrap_err(),
        LUError::ZeroPivot { column: 1 }
    );
}

#[test]
fn test_fill_in() {
    // arrow matrix, dense first row and column.
    // Eliminating the hub first fills in everything
    let n = 6;
    let mut colptr = vec![0];
    let mut rowval = vec![];
    let mut nzval = vec![];
    for col in 0..n {
        if col == 0 {
            rowval.extend(0..n);
            nzval.push(10.);
            nzval.extend((1..n).map(|i| i as f64));
        } else {
            rowval.extend([0, col]);
            nzval.extend([-(col as f64), 10.]);
        }
        colptr.push(rowval.len());
    }
    let A = CscMatrix::new(n, n, colptr, rowval, nzval);
    let x: Vec<f64> = (0..n).map(|i| 1. + i as f64).collect();
    let b0 = csc_mul(&A, &x);

    let mut natural = LUFactorisation::new(&A, Some(identity_opts(n))).unwrap();
    let mut b = b0.clone();
    natural.solve(&mut b);
    assert!(inf_norm_diff(&x, &b) <= 1e-10);

    let mut amd = LUFactorisation::new(&A, None).unwrap();
    let mut b = b0;
    amd.solve(&mut b);
    assert!(inf_norm_diff(&x, &b) <= 1e-10);

    assert!(amd.nnz_LU() < natural.nnz_LU());
}

#[test]
#[should_panic]
fn test_solve_logical() {
    let A = test_matrix_3x3();
    let opts = LUSettingsBuilder::default()
        .logical(true)
        .build()
        .unwrap();

    let mut factors = LUFactorisation::new(&A, Some(opts)).unwrap();
    let mut b = [6., 15., 24.];
    factors.solve(&mut b); //should panic
}

#[test]
fn test_update_values_refactor() {
    let A = test_matrix_3x3();
    let opts = LUSettingsBuilder::default()
        .logical(true)
        .build()
        .unwrap();

    let mut factors = LUFactorisation::new(&A, Some(opts)).unwrap();
    assert!(factors.is_logical());

    //doubling every value halves the solution
    let values: Vec<f64> = A.nzval.iter().map(|v| 2. * v).collect();
    factors.update_values(&values).unwrap();
    factors.refactor().unwrap();
    assert!(!factors.is_logical());

    let mut b = [6., 15., 24.];
    factors.solve(&mut b);
    assert!(inf_norm_diff(&[0.5, 1., 1.5], &b) <= 1e-12);

    assert_eq!(
        factors.update_values(&values[1..]),
        Err(LUError::IncompatibleValues {
            expected: 7,
            found: 6
        })
    );
}

#[test]
fn test_refactor_after_failure() {
    // a failed factorisation leaves the workspace usable
    let A = CscMatrix::new(2, 2, vec![0, 2, 4], vec![0, 1, 0, 1], vec![1., 2., 2., 4.]);
    let opts = LUSettingsBuilder::default()
        .perm(vec![0, 1])
        .logical(true)
        .build()
        .unwrap();
    let mut factors = LUFactorisation::new(&A, Some(opts)).unwrap();
    assert!(factors.refactor().is_err());
    assert!(factors.is_logical());

    factors.update_values(&[1., 2., 2., 5.]).unwrap();
    factors.refactor().unwrap();
    let mut b = [3., 7.];
    factors.solve(&mut b);
    assert!(inf_norm_diff(&[1., 1.], &b) <= 1e-12);
}

#[test]
fn test_bad_inputs() {
    let A = test_matrix_3x3();
    for perm in [vec![0, 1], vec![0, 0, 1]] {
        let opts = LUSettingsBuilder::default().perm(perm).build().unwrap();
        assert_eq!(
            LUFactorisation::new(&A, Some(opts)).unwrap_err(),
            LUError::InvalidPermutation
        );
    }

    let A = CscMatrix::new(2, 3, vec![0, 1, 2, 3], vec![0, 1, 0], vec![1., 1., 1.]);
    assert_eq!(
        LUFactorisation::new(&A, None).unwrap_err(),
        LUError::IncompatibleDimension
    );
}
