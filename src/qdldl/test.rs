use super::*;

// upper triangle of
//[4.0  1.0   ⋅ ]
//[1.0  4.0  1.0]
//[ ⋅   1.0  4.0]
fn tridiagonal_3x3() -> CsrMatrix<f64> {
    CsrMatrix::new(3, vec![0, 2, 4, 5], vec![0, 1, 1, 2, 2], vec![4., 1., 4., 1., 4.], true)
}

// upper triangle of an arrow matrix, dense in row and column 0
//[4.0  1.0  1.0  1.0]
//[1.0  4.0   ⋅    ⋅ ]
//[1.0   ⋅   4.0   ⋅ ]
//[1.0   ⋅    ⋅   4.0]
fn arrow_4x4() -> CsrMatrix<f64> {
    CsrMatrix::new(
        4,
        vec![0, 4, 5, 6, 7],
        vec![0, 1, 2, 3, 1, 2, 3],
        vec![4., 1., 1., 1., 4., 4., 4.],
        true,
    )
}

fn factor_with_perm(
    A: &CsrMatrix<f64>,
    perm: Vec<usize>,
) -> Result<QDLDLFactorisation<f64>, QDLDLError> {
    let opts = QDLDLSettingsBuilder::default().perm(perm).build().unwrap();
    QDLDLFactorisation::new(&A.to_csc(), Some(opts))
}

fn solve_copy(factors: &mut QDLDLFactorisation<f64>, b: &[f64]) -> Vec<f64> {
    let mut x = b.to_vec();
    factors.solve(&mut x);
    x
}

#[test]
fn test_solve_tridiagonal() {
    let A = tridiagonal_3x3();
    let b = [6., 12., 14.];

    for perm in [vec![0, 1, 2], vec![2, 0, 1], vec![1, 2, 0]] {
        let mut factors = factor_with_perm(&A, perm).unwrap();
        let x = solve_copy(&mut factors, &b);
        assert!(A.residual_norm_inf(&x, &b) <= 1e-12);
    }

    // AMD ordering when none is given
    let mut factors = QDLDLFactorisation::new(&A.to_csc(), None).unwrap();
    let x = solve_copy(&mut factors, &b);
    assert!(A.residual_norm_inf(&x, &b) <= 1e-12);
    assert_eq!(factors.regularize_count(), 0);
}

#[test]
fn test_indefinite_pivots() {
    // upper triangle of [2 1; 1 -3]
    let A = CsrMatrix::new(2, vec![0, 2, 3], vec![0, 1, 1], vec![2., 1., -3.], true);
    let mut factors = factor_with_perm(&A, vec![0, 1]).unwrap();

    assert_eq!(factors.D, vec![2., -3.5]);
    assert_eq!(factors.L.nzval, vec![0.5]);

    let b = [3., -2.];
    let x = solve_copy(&mut factors, &b);
    assert!(A.residual_norm_inf(&x, &b) <= 1e-12);
}

#[test]
fn test_ordering_fill() {
    let A = arrow_4x4();
    let b = [7., 5., 5., 5.];

    // eliminating the hub first fills in all of L
    let mut natural = factor_with_perm(&A, vec![0, 1, 2, 3]).unwrap();
    assert_eq!(natural.nnz_L(), 6);

    // and last creates no fill at all
    let mut hub_last = factor_with_perm(&A, vec![1, 2, 3, 0]).unwrap();
    assert_eq!(hub_last.nnz_L(), 3);

    for factors in [&mut natural, &mut hub_last] {
        let x = solve_copy(factors, &b);
        assert!(x.iter().all(|&xi| (xi - 1.).abs() <= 1e-12));
    }
}

#[test]
fn test_symbolic() {
    let A = arrow_4x4().to_csc();
    let (etree, Lp) = _symbolic(&A);
    assert_eq!(etree, vec![1, 2, 3, LDL_ROOT]);
    assert_eq!(Lp, vec![0, 3, 5, 6, 6]);
}

#[test]
fn test_permute_triu() {
    let A = tridiagonal_3x3().to_csc();

    // reverse ordering, iperm = perm
    let (P, AtoPAPt) = _permute_triu(&A, &[2, 1, 0]);
    assert!(P.is_triu());
    assert_eq!(P.nnz(), A.nnz());

    // every input entry lands on its reflected position
    for col in 0..3 {
        for p in A.colptr[col]..A.colptr[col + 1] {
            let row = A.rowval[p];
            let dest = AtoPAPt[p];
            assert_eq!(P.nzval[dest], A.nzval[p]);
            assert_eq!(P.rowval[dest], (2 - col).min(2 - row));
        }
    }
}

#[test]
fn test_logical_then_refactor() {
    let A = tridiagonal_3x3();
    let opts = QDLDLSettingsBuilder::default()
        .perm(vec![0, 1, 2])
        .logical(true)
        .build()
        .unwrap();
    let mut factors = QDLDLFactorisation::new(&A.to_csc(), Some(opts)).unwrap();
    assert!(factors.is_logical());
    assert_eq!(factors.D, vec![0.; 3]);

    factors.update_values(&A.to_csc().nzval).unwrap();
    factors.refactor().unwrap();
    assert!(!factors.is_logical());

    let b = [6., 12., 14.];
    let x = solve_copy(&mut factors, &b);
    assert!(A.residual_norm_inf(&x, &b) <= 1e-12);
}

#[test]
#[should_panic]
fn test_solve_logical() {
    let opts = QDLDLSettingsBuilder::default().logical(true).build().unwrap();
    let mut factors = QDLDLFactorisation::new(&tridiagonal_3x3().to_csc(), Some(opts)).unwrap();
    let mut x = vec![1.; 3];
    factors.solve(&mut x);
}

#[test]
fn test_update_values_refactor() {
    let A = arrow_4x4();
    let mut factors = factor_with_perm(&A, vec![3, 1, 0, 2]).unwrap();

    // doubling every value halves the solution
    let values: Vec<f64> = A.to_csc().nzval.iter().map(|v| 2. * v).collect();
    factors.update_values(&values).unwrap();
    factors.refactor().unwrap();
    let x = solve_copy(&mut factors, &[7., 5., 5., 5.]);
    assert!(x.iter().all(|&xi| (xi - 0.5).abs() <= 1e-12));

    assert_eq!(
        factors.update_values(&values[1..]),
        Err(QDLDLError::IncompatibleValues {
            expected: 7,
            found: 6
        })
    );
}

#[test]
fn test_zero_pivot_column() {
    // upper triangle of [1 1; 1 1], singular
    let A = CsrMatrix::new(2, vec![0, 2, 3], vec![0, 1, 1], vec![1., 1., 1.], true);

    // the failing pivot is reported by its column in A
    assert_eq!(
        factor_with_perm(&A, vec![0, 1]).unwrap_err(),
        QDLDLError::ZeroPivot { column: 1 }
    );
    assert_eq!(
        factor_with_perm(&A, vec![1, 0]).unwrap_err(),
        QDLDLError::ZeroPivot { column: 0 }
    );

    // a failed factorisation can be repeated with new values
    let opts = QDLDLSettingsBuilder::default()
        .perm(vec![0, 1])
        .logical(true)
        .build()
        .unwrap();
    let mut factors = QDLDLFactorisation::new(&A.to_csc(), Some(opts)).unwrap();
    factors.update_values(&A.to_csc().nzval).unwrap();
    assert!(factors.refactor().is_err());
    assert!(factors.is_logical());

    factors.update_values(&[1., 1., 2.]).unwrap();
    factors.refactor().unwrap();
    let x = solve_copy(&mut factors, &[2., 3.]);
    assert!((x[0] - 1.).abs() <= 1e-12 && (x[1] - 1.).abs() <= 1e-12);
}

#[test]
fn test_regularized_pivots() {
    // upper triangle of [1 1; 1 1-1e-13], the last pivot is tiny and negative
    let A = CsrMatrix::new(2, vec![0, 2, 3], vec![0, 1, 1], vec![1., 1., 1. - 1e-13], true);

    let opts = QDLDLSettingsBuilder::default()
        .perm(vec![0, 1])
        .regularize_enable(true)
        .build()
        .unwrap();
    let factors = QDLDLFactorisation::new(&A.to_csc(), Some(opts)).unwrap();
    assert_eq!(factors.regularize_count(), 1);
    assert_eq!(factors.D[0], 1.);
    assert_eq!(factors.D[1], -1e-7);
}

#[test]
fn test_regularizer_keeps_sign() {
    let reg = Regularizer {
        eps: 1e-12,
        delta: 1e-7,
    };

    let mut d = 0.;
    assert!(reg.apply(&mut d));
    assert_eq!(d, 1e-7);

    let mut d = -1e-14;
    assert!(reg.apply(&mut d));
    assert_eq!(d, -1e-7);

    let mut d = -0.5;
    assert!(!reg.apply(&mut d));
    assert_eq!(d, -0.5);
}

#[test]
fn test_bad_structure() {
    // not square
    let A = CscMatrix::new(2, 1, vec![0, 1], vec![0], vec![1.]);
    assert_eq!(
        QDLDLFactorisation::new(&A, None).unwrap_err(),
        QDLDLError::IncompatibleDimension
    );

    // entry below the diagonal
    let A = CscMatrix::new(2, 2, vec![0, 2, 3], vec![0, 1, 1], vec![1., 1., 1.]);
    assert_eq!(
        QDLDLFactorisation::new(&A, None).unwrap_err(),
        QDLDLError::NotUpperTriangular
    );

    // upper triangle of [0 1; 1 0]
    let A = CsrMatrix::new(2, vec![0, 1, 1], vec![1], vec![1.], true);
    assert_eq!(
        factor_with_perm(&A, vec![0, 1]).unwrap_err(),
        QDLDLError::MissingDiagonal { column: 0 }
    );

    // upper triangle of [1 1; 1 0]
    let A = CsrMatrix::new(2, vec![0, 2, 2], vec![0, 1], vec![1., 1.], true);
    assert_eq!(
        factor_with_perm(&A, vec![0, 1]).unwrap_err(),
        QDLDLError::MissingDiagonal { column: 1 }
    );

    let A = tridiagonal_3x3();
    assert_eq!(
        factor_with_perm(&A, vec![0, 0, 1]).unwrap_err(),
        QDLDLError::InvalidPermutation
    );
    assert_eq!(
        factor_with_perm(&A, vec![0, 1]).unwrap_err(),
        QDLDLError::InvalidPermutation
    );
}
