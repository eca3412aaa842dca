#![allow(non_snake_case)]

use crate::algebra::{FloatT, ShapedMatrix, SparseFormatError};
use itertools::izip;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Square sparse matrix in coordinate (triplet) format
///
/// Entries are appended one at a time with [`put`](CooMatrix::put), which
/// bounds-checks the indices against `dimension` and the entry count
/// against `capacity`.  Duplicate `(row, col)` pairs are permitted here
/// and are merged when converting to [`CsrMatrix`](crate::algebra::CsrMatrix).
///
/// __Example usage__ :
///
/// ```
/// use mmsolve::algebra::CooMatrix;
///
/// let mut A = CooMatrix::<f64>::new(3, 2);
/// A.put(0, 1, 5.0).unwrap();
/// A.put(2, 2, 9.0).unwrap();
///
/// assert_eq!(A.nnz(), 2);
/// assert!(A.put(1, 1, 1.0).is_err()); // capacity exhausted
/// ```
///
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
pub struct CooMatrix<T = f64> {
    /// number of rows (and columns)
    pub dimension: usize,
    /// maximum number of entries
    pub capacity: usize,
    /// true if only one triangle is stored and the matrix is implicitly symmetric
    pub symmetric: bool,
    /// vector of row indices
    pub rowval: Vec<usize>,
    /// vector of column indices
    pub colval: Vec<usize>,
    /// vector of matrix values
    pub nzval: Vec<T>,
}

// largest number of entries reserved up front
const COO_MAX_RESERVE: usize = 1 << 16;

impl<T> CooMatrix<T>
where
    T: FloatT,
{
    /// Allocate an empty `dimension` x `dimension` matrix with room
    /// for `capacity` entries.
    ///
    /// `capacity` only bounds [`put`](CooMatrix::put).  Storage beyond a
    /// fixed initial reservation grows as entries arrive.
    pub fn new(dimension: usize, capacity: usize) -> Self {
        let reserve = capacity.min(COO_MAX_RESERVE);
        CooMatrix {
            dimension,
            capacity,
            symmetric: false,
            rowval: Vec::with_capacity(reserve),
            colval: Vec::with_capacity(reserve),
            nzval: Vec::with_capacity(reserve),
        }
    }

    /// Append the entry `A[i,j] = aij`.
    ///
    /// # Errors
    /// Fails without modifying the matrix if either index is outside
    /// `[0, dimension)` or if `capacity` entries are already stored.
    pub fn put(&mut self, i: usize, j: usize, aij: T) -> Result<(), SparseFormatError> {
        if i >= self.dimension {
            return Err(SparseFormatError::RowOutOfRange {
                row: i,
                dimension: self.dimension,
            });
        }
        if j >= self.dimension {
            return Err(SparseFormatError::ColumnOutOfRange {
                col: j,
                dimension: self.dimension,
            });
        }
        if self.nnz() >= self.capacity {
            return Err(SparseFormatError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        self.rowval.push(i);
        self.colval.push(j);
        self.nzval.push(aij);
        Ok(())
    }

    /// number of entries stored so far
    pub fn nnz(&self) -> usize {
        self.nzval.len()
    }

    /// true once `capacity` entries have been stored
    pub fn is_full(&self) -> bool {
        self.nnz() >= self.capacity
    }

    /// Iterator over the stored `(row, col, value)` triplets in insertion order
    pub fn triplets(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        izip!(&self.rowval, &self.colval, &self.nzval).map(|(&i, &j, &v)| (i, j, v))
    }
}

impl<T> ShapedMatrix for CooMatrix<T> {
    fn nrows(&self) -> usize {
        self.dimension
    }
    fn ncols(&self) -> usize {
        self.dimension
    }
}
