#![allow(non_snake_case)]

use super::SolverError;
use crate::algebra::*;
use std::iter::zip;

// Checks the CSR pattern of a square matrix of dimension n.  Symmetric
// matrices must store their upper triangle only.
pub(crate) fn check_pattern(
    n: usize,
    rowptr: &[usize],
    colval: &[usize],
    symmetric: bool,
) -> Result<(), SolverError> {
    if n == 0 {
        return Err(SparseFormatError::EmptyDimension.into());
    }
    if rowptr.len() != n + 1 || rowptr[n] != colval.len() {
        return Err(SparseFormatError::IncompatibleDimension.into());
    }
    if rowptr[0] != 0 || rowptr.windows(2).any(|c| c[0] > c[1]) {
        return Err(SparseFormatError::BadOffsets.into());
    }

    for row in 0..n {
        let cols = &colval[rowptr[row]..rowptr[row + 1]];
        if cols.windows(2).any(|c| c[0] >= c[1]) || cols.iter().any(|&c| c >= n) {
            return Err(SparseFormatError::BadIndices { outer: row }.into());
        }
        // sorted, so only the first entry can be below the diagonal
        if let Some(&col) = cols.first() {
            if symmetric && col < row {
                return Err(SolverError::NotUpperTriangular { row, col });
            }
        }
    }
    Ok(())
}

// True if every row of an upper triangle CSR pattern stores its
// diagonal entry.  Columns are sorted, so it comes first in the row.
pub(crate) fn has_full_diagonal(n: usize, rowptr: &[usize], colval: &[usize]) -> bool {
    (0..n).all(|row| colval[rowptr[row]..rowptr[row + 1]].first() == Some(&row))
}

/// The matrix as seen by a factorization engine, in compressed column
/// form, with a map from each of its entries back to the CSR values.
///
/// The stored upper triangle of a symmetric matrix can be expanded to
/// the full matrix with [`mirrored`](EnginePattern::mirrored), after
/// which a CSR entry may supply two entries of the engine matrix.
#[derive(Debug, Clone)]
pub(crate) struct EnginePattern<T> {
    pub(crate) A: CscMatrix<T>,
    // A.nzval[p] = nzval[gather[p]] for CSR values nzval
    gather: Vec<usize>,
}

impl<T> EnginePattern<T>
where
    T: FloatT,
{
    pub(crate) fn new(n: usize, rowptr: &[usize], colval: &[usize]) -> Self {
        // count entries per column, shifted by one
        let mut colptr = vec![0; n + 1];
        for &col in colval {
            colptr[col + 1] += 1;
        }
        for col in 0..n {
            colptr[col + 1] += colptr[col];
        }
        let nnz = colptr[n];

        let mut next = colptr[0..n].to_vec();
        let mut rowval = vec![0; nnz];
        let mut gather = vec![0; nnz];

        // visiting rows in order keeps each column sorted
        for row in 0..n {
            for p in rowptr[row]..rowptr[row + 1] {
                let col = colval[p];
                rowval[next[col]] = row;
                gather[next[col]] = p;
                next[col] += 1;
            }
        }

        let A = CscMatrix::new(n, n, colptr, rowval, vec![T::zero(); nnz]);
        Self { A, gather }
    }

    /// The full matrix of a pattern that holds an upper triangle.
    /// Every off diagonal entry also appears reflected below the
    /// diagonal, gathered from the same CSR value.
    pub(crate) fn mirrored(&self) -> Self {
        let U = &self.A;
        let n = U.n;

        let mut colptr = vec![0; n + 1];
        for col in 0..n {
            for &row in U.col_rowval(col) {
                colptr[col + 1] += 1;
                if row != col {
                    colptr[row + 1] += 1;
                }
            }
        }
        for col in 0..n {
            colptr[col + 1] += colptr[col];
        }
        let nnz = colptr[n];

        let mut next = colptr[0..n].to_vec();
        let mut rowval = vec![0; nnz];
        let mut gather = vec![0; nnz];

        for col in 0..n {
            for p in U.colptr[col]..U.colptr[col + 1] {
                rowval[next[col]] = U.rowval[p];
                gather[next[col]] = self.gather[p];
                next[col] += 1;
            }
        }

        // reflected entries lie below the diagonal, after the stored
        // ones.  Visiting columns in order keeps them sorted.
        for col in 0..n {
            for p in U.colptr[col]..U.colptr[col + 1] {
                let row = U.rowval[p];
                if row != col {
                    rowval[next[row]] = col;
                    gather[next[row]] = self.gather[p];
                    next[row] += 1;
                }
            }
        }

        let A = CscMatrix::new(n, n, colptr, rowval, vec![T::zero(); nnz]);
        Self { A, gather }
    }

    /// copy CSR ordered values into the engine matrix
    pub(crate) fn gather_values(&mut self, nzval: &[T]) {
        for (v, &src) in zip(self.A.nzval.iter_mut(), &self.gather) {
            *v = nzval[src];
        }
    }
}

#[test]
fn test_check_pattern() {
    // [x x .]
    // [. x x]
    // [. . x]
    let rowptr = [0, 2, 4, 5];
    let colval = [0, 1, 1, 2, 2];
    assert!(check_pattern(3, &rowptr, &colval, true).is_ok());

    assert!(matches!(
        check_pattern(0, &[0], &[], false),
        Err(SolverError::Structure(SparseFormatError::EmptyDimension))
    ));
    assert!(matches!(
        check_pattern(2, &rowptr, &colval, false),
        Err(SolverError::Structure(SparseFormatError::IncompatibleDimension))
    ));
    assert!(matches!(
        check_pattern(3, &[0, 2, 1, 5], &colval, false),
        Err(SolverError::Structure(SparseFormatError::BadOffsets))
    ));
    assert!(matches!(
        check_pattern(3, &rowptr, &[0, 1, 2, 1, 2], false),
        Err(SolverError::Structure(SparseFormatError::BadIndices { outer: 1 }))
    ));
    assert!(matches!(
        check_pattern(3, &rowptr, &[0, 3, 1, 2, 2], false),
        Err(SolverError::Structure(SparseFormatError::BadIndices { outer: 0 }))
    ));

    // lower triangular entry in a symmetric matrix
    let colval = [0, 1, 0, 2, 2];
    assert!(check_pattern(3, &rowptr, &colval, false).is_ok());
    assert!(matches!(
        check_pattern(3, &rowptr, &colval, true),
        Err(SolverError::NotUpperTriangular { row: 1, col: 0 })
    ));
}

#[test]
fn test_engine_pattern() {
    // A =
    //[1.0  2.0  3.0]
    //[ ⋅   4.0   ⋅ ]
    //[ ⋅   5.0  6.0]
    let rowptr = [0, 3, 4, 6];
    let colval = [0, 1, 2, 1, 1, 2];
    let nzval = [1., 2., 3., 4., 5., 6.];

    let mut pattern = EnginePattern::<f64>::new(3, &rowptr, &colval);
    pattern.gather_values(&nzval);
    let A = &pattern.A;
    assert!(A.check_format().is_ok());
    assert_eq!(A.colptr, vec![0, 1, 4, 6]);
    assert_eq!(A.rowval, vec![0, 0, 1, 2, 0, 2]);
    assert_eq!(A.nzval, vec![1., 2., 4., 5., 3., 6.]);

    // upper triangle of
    //[1.0  2.0  3.0]
    //[2.0  4.0   ⋅ ]
    //[3.0   ⋅   6.0]
    let rowptr = [0, 3, 4, 5];
    let colval = [0, 1, 2, 1, 2];
    let nzval = [1., 2., 3., 4., 6.];

    let mut pattern = EnginePattern::<f64>::new(3, &rowptr, &colval);
    pattern.gather_values(&nzval);
    assert!(pattern.A.is_triu());
    assert_eq!(pattern.A.nzval, vec![1., 2., 4., 3., 6.]);

    let mut pattern = pattern.mirrored();
    pattern.gather_values(&nzval);
    let A = &pattern.A;
    assert!(A.check_format().is_ok());
    assert_eq!(A.colptr, vec![0, 3, 5, 7]);
    assert_eq!(A.rowval, vec![0, 1, 2, 0, 1, 0, 2]);
    assert_eq!(A.nzval, vec![1., 2., 3., 2., 4., 3., 6.]);
}

#[test]
fn test_full_diagonal() {
    // upper triangle of
    //[1.0  2.0  3.0]
    //[2.0  4.0   ⋅ ]
    //[3.0   ⋅   6.0]
    assert!(has_full_diagonal(3, &[0, 3, 4, 5], &[0, 1, 2, 1, 2]));

    // upper triangle of
    //[ ⋅   1.0  1.0]
    //[1.0   ⋅   1.0]
    //[1.0  1.0   ⋅ ]
    let rowptr = [0, 2, 3, 3];
    let colval = [1, 2, 2];
    assert!(!has_full_diagonal(3, &rowptr, &colval));

    // its full matrix has an empty diagonal
    let mut pattern = EnginePattern::<f64>::new(3, &rowptr, &colval).mirrored();
    pattern.gather_values(&[1., 2., 3.]);
    let A = &pattern.A;
    assert!(A.check_format().is_ok());
    assert_eq!(A.colptr, vec![0, 2, 4, 6]);
    assert_eq!(A.rowval, vec![1, 2, 0, 2, 0, 1]);
    assert_eq!(A.nzval, vec![1., 2., 1., 3., 2., 3.]);
}
