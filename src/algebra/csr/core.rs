#![allow(non_snake_case)]

use crate::algebra::{CscMatrix, FloatT, ShapedMatrix, SparseFormatError};

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Square sparse matrix in Compressed Sparse Row (CSR) format
///
/// Entries of row `k` occupy positions `rowptr[k]..rowptr[k+1]` of
/// `colval` and `nzval`.  Column indices within each row are strictly
/// increasing, so there are no duplicate entries.  When `symmetric` is
/// set, only the upper triangle (`col >= row`) is stored.
///
/// The usual way to obtain a `CsrMatrix` is by converting a
/// [`CooMatrix`](crate::algebra::CooMatrix):
///
/// ```
/// use mmsolve::algebra::{CooMatrix, CsrMatrix};
///
/// let mut coo = CooMatrix::<f64>::new(2, 2);
/// coo.put(0, 1, 3.0).unwrap();
/// coo.put(1, 0, 4.0).unwrap();
///
/// let A = CsrMatrix::try_from(coo).unwrap();
/// assert_eq!(A.rowptr, vec![0, 1, 2]);
/// assert_eq!(A.colval, vec![1, 0]);
/// ```
///
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
pub struct CsrMatrix<T = f64> {
    /// number of rows (and columns)
    pub n: usize,
    /// CSR format row pointer.
    ///
    /// This field should have length `n+1`.  The last entry is the
    /// number of nonzeros and agrees with the lengths of `colval`
    /// and `nzval`.
    pub rowptr: Vec<usize>,
    /// vector of column indices
    pub colval: Vec<usize>,
    /// vector of non-zero matrix elements
    pub nzval: Vec<T>,
    /// true if only the upper triangle of a symmetric matrix is stored
    pub symmetric: bool,
}

impl<T> CsrMatrix<T>
where
    T: FloatT,
{
    /// `CsrMatrix` constructor.
    ///
    /// # Panics
    /// Makes rudimentary dimensional compatibility checks and panics on
    /// failure.  Column ordering and bounds are checked by
    /// [`check_format`](CsrMatrix::check_format).
    pub fn new(
        n: usize,
        rowptr: Vec<usize>,
        colval: Vec<usize>,
        nzval: Vec<T>,
        symmetric: bool,
    ) -> Self {
        assert_eq!(colval.len(), nzval.len());
        assert_eq!(rowptr.len(), n + 1);
        assert_eq!(rowptr[n], colval.len());
        CsrMatrix {
            n,
            rowptr,
            colval,
            nzval,
            symmetric,
        }
    }

    /// number of nonzeros
    pub fn nnz(&self) -> usize {
        self.rowptr[self.n]
    }

    /// Check that matrix data is correctly formatted.
    pub fn check_format(&self) -> Result<(), SparseFormatError> {
        if self.colval.len() != self.nzval.len() {
            return Err(SparseFormatError::IncompatibleDimension);
        }

        if self.rowptr.len() != self.n + 1 || self.rowptr[self.n] != self.colval.len() {
            return Err(SparseFormatError::IncompatibleDimension);
        }

        if self.rowptr[0] != 0 || self.rowptr.windows(2).any(|c| c[0] > c[1]) {
            return Err(SparseFormatError::BadOffsets);
        }

        for row in 0..self.n {
            let cols = self.row_colval(row);
            if cols.windows(2).any(|c| c[0] >= c[1]) || cols.iter().any(|&c| c >= self.n) {
                return Err(SparseFormatError::BadIndices { outer: row });
            }
        }

        Ok(())
    }

    /// True if every stored entry satisfies `col >= row`
    pub fn is_triu(&self) -> bool {
        (0..self.n).all(|row| self.row_colval(row).iter().all(|&col| col >= row))
    }

    /// column indices of the entries in `row`
    pub fn row_colval(&self, row: usize) -> &[usize] {
        &self.colval[self.rowptr[row]..self.rowptr[row + 1]]
    }

    /// values of the entries in `row`
    pub fn row_nzval(&self, row: usize) -> &[T] {
        &self.nzval[self.rowptr[row]..self.rowptr[row + 1]]
    }

    /// Returns the value at the given (row,col) index as an Option.
    /// Returns None if the given index is not a structural nonzero.
    /// Only stored entries are reported, i.e. for a symmetric matrix
    /// entries below the diagonal are never found.
    ///
    /// # Panics
    /// Panics if the given index is out of bounds.
    pub fn get_entry(&self, idx: (usize, usize)) -> Option<T> {
        let (row, col) = idx;
        assert!(row < self.n && col < self.n);

        match self.row_colval(row).binary_search(&col) {
            Ok(k) => Some(self.nzval[self.rowptr[row] + k]),
            Err(_) => None,
        }
    }

    /// The same matrix in compressed sparse column format.
    ///
    /// Only stored entries are moved, so a symmetric matrix with upper
    /// triangular storage becomes an upper triangular `CscMatrix`.
    /// Row indices within each column come out sorted.
    pub fn to_csc(&self) -> CscMatrix<T> {
        let n = self.n;
        let nnz = self.nnz();

        // count entries per column, shifted by one
        let mut colptr = vec![0; n + 1];
        for &col in &self.colval {
            colptr[col + 1] += 1;
        }
        for col in 0..n {
            colptr[col + 1] += colptr[col];
        }

        // rows are visited in order, so each column fills in row order
        let mut next = colptr[0..n].to_vec();
        let mut rowval = vec![0; nnz];
        let mut nzval = vec![T::zero(); nnz];
        for row in 0..n {
            for ptr in self.rowptr[row]..self.rowptr[row + 1] {
                let col = self.colval[ptr];
                let dest = next[col];
                rowval[dest] = row;
                nzval[dest] = self.nzval[ptr];
                next[col] += 1;
            }
        }

        CscMatrix::new(n, n, colptr, rowval, nzval)
    }
}

impl<T> ShapedMatrix for CsrMatrix<T> {
    fn nrows(&self) -> usize {
        self.n
    }
    fn ncols(&self) -> usize {
        self.n
    }
}
