#![allow(non_snake_case)]

use crate::algebra::{FloatT, ShapedMatrix, SparseFormatError};

/// Compressed sparse column matrix, the working format of the
/// factorization engines.
///
/// Matrices reach the engines from a [`CsrMatrix`](crate::algebra::CsrMatrix),
/// either through [`CsrMatrix::to_csc`](crate::algebra::CsrMatrix::to_csc) or
/// through the gather map built by the solver.  The layout is the column
/// counterpart of the CSR one: column `j` holds the row indices
/// `rowval[colptr[j]..colptr[j+1]]` and the matching values in `nzval`.
///
/// ```
/// use mmsolve::algebra::CscMatrix;
///
/// // [2 . 1]
/// // [. 3 .]
/// // [1 . 4]
/// let A = CscMatrix::new(3, 3, vec![0, 2, 3, 5], vec![0, 2, 1, 0, 2], vec![2., 1., 3., 1., 4.]);
/// assert!(A.check_format().is_ok());
/// assert_eq!(A.col_rowval(2), &[0, 2]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CscMatrix<T = f64> {
    /// number of rows
    pub m: usize,
    /// number of columns
    pub n: usize,
    /// column offsets, of length `n+1` and ending at the number of entries
    pub colptr: Vec<usize>,
    /// row index of each entry
    pub rowval: Vec<usize>,
    /// value of each entry
    pub nzval: Vec<T>,
}

impl<T> CscMatrix<T>
where
    T: FloatT,
{
    /// Assemble a matrix from its raw parts.
    ///
    /// # Panics
    /// Panics if the array lengths disagree with each other or with `n`.
    /// Row order and bounds are left to [`check_format`](CscMatrix::check_format).
    pub fn new(m: usize, n: usize, colptr: Vec<usize>, rowval: Vec<usize>, nzval: Vec<T>) -> Self {
        assert_eq!(colptr.len(), n + 1);
        assert_eq!(rowval.len(), nzval.len());
        assert_eq!(colptr[n], nzval.len());
        Self {
            m,
            n,
            colptr,
            rowval,
            nzval,
        }
    }

    /// An `m` x `n` matrix with room for `nnz` entries, all placed in the
    /// last column until the caller fills in `colptr`.
    pub fn spalloc(size: (usize, usize), nnz: usize) -> Self {
        let (m, n) = size;
        let mut colptr = vec![0; n + 1];
        colptr[n] = nnz;
        Self::new(m, n, colptr, vec![0; nnz], vec![T::zero(); nnz])
    }

    pub fn nnz(&self) -> usize {
        self.colptr[self.n]
    }

    /// row indices of the entries of column `col`
    pub fn col_rowval(&self, col: usize) -> &[usize] {
        &self.rowval[self.colptr[col]..self.colptr[col + 1]]
    }

    /// Check the invariants of the format: consistent lengths,
    /// nondecreasing offsets, and strictly increasing in-range row
    /// indices within each column.
    pub fn check_format(&self) -> Result<(), SparseFormatError> {
        let n = self.n;
        if self.colptr.len() != n + 1
            || self.rowval.len() != self.nzval.len()
            || self.colptr[n] != self.rowval.len()
        {
            return Err(SparseFormatError::IncompatibleDimension);
        }
        if self.colptr[0] != 0 || self.colptr.windows(2).any(|c| c[0] > c[1]) {
            return Err(SparseFormatError::BadOffsets);
        }
        for col in 0..n {
            let rows = self.col_rowval(col);
            let sorted = rows.windows(2).all(|r| r[0] < r[1]);
            if !sorted || rows.last().is_some_and(|&r| r >= self.m) {
                return Err(SparseFormatError::BadIndices { outer: col });
            }
        }
        Ok(())
    }

    /// True if no entry lies below the diagonal, whatever its value
    pub fn is_triu(&self) -> bool {
        (0..self.n).all(|col| self.col_rowval(col).iter().all(|&row| row <= col))
    }

    /// The value stored at `(row, col)`, or `None` for a structural zero.
    /// Row indices within the column must be sorted.
    ///
    /// # Panics
    /// Panics if the index lies outside the matrix.
    pub fn get_entry(&self, idx: (usize, usize)) -> Option<T> {
        let (row, col) = idx;
        assert!(row < self.m && col < self.n);
        self.col_rowval(col)
            .binary_search(&row)
            .ok()
            .map(|k| self.nzval[self.colptr[col] + k])
    }
}

impl<T> ShapedMatrix for CscMatrix<T> {
    fn nrows(&self) -> usize {
        self.m
    }
    fn ncols(&self) -> usize {
        self.n
    }
}
