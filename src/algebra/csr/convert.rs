#![allow(non_snake_case)]

use crate::algebra::{CooMatrix, CsrMatrix, FloatT, SparseFormatError};
use itertools::izip;

// COO -> CSR assembly.  Triplets are bucketed by row, sorted by column
// within each row and duplicate (row,col) pairs are merged by summing
// their values.  The sort is stable, so duplicates are summed in the
// order they were inserted.  Entries that sum to zero are kept.

impl<T> TryFrom<CooMatrix<T>> for CsrMatrix<T>
where
    T: FloatT,
{
    type Error = SparseFormatError;

    fn try_from(coo: CooMatrix<T>) -> Result<Self, Self::Error> {
        CsrMatrix::from_coo(coo)
    }
}

impl<T> CsrMatrix<T>
where
    T: FloatT,
{
    /// Assemble a `CsrMatrix` from a coordinate matrix, consuming it.
    ///
    /// Duplicate entries are summed.  The `symmetric` flag is carried
    /// over unchanged.
    ///
    /// # Errors
    /// Fails if the matrix has zero dimension, if its triplet arrays have
    /// different lengths, or if any stored index lies outside
    /// `[0, dimension)`.  Indices are re-checked here even though
    /// [`CooMatrix::put`] already bounds them, since the fields of a
    /// `CooMatrix` are public.
    pub fn from_coo(coo: CooMatrix<T>) -> Result<Self, SparseFormatError> {
        let n = coo.dimension;
        if n == 0 {
            return Err(SparseFormatError::EmptyDimension);
        }
        if coo.rowval.len() != coo.nzval.len() || coo.colval.len() != coo.nzval.len() {
            return Err(SparseFormatError::IncompatibleDimension);
        }
        for (position, (&row, &col)) in coo.rowval.iter().zip(&coo.colval).enumerate() {
            if row >= n || col >= n {
                return Err(SparseFormatError::EntryOutOfRange {
                    position,
                    row,
                    col,
                    dimension: n,
                });
            }
        }

        // count the entries in each row, shifted by one,
        // and accumulate into bucket start positions
        let mut bucketptr = vec![0; n + 1];
        for &row in &coo.rowval {
            bucketptr[row + 1] += 1;
        }
        for row in 0..n {
            bucketptr[row + 1] += bucketptr[row];
        }

        // scatter (col, value) pairs into their row buckets
        let mut next = bucketptr[0..n].to_vec();
        let mut buckets = vec![(0usize, T::zero()); coo.nnz()];
        for (&row, &col, &v) in izip!(&coo.rowval, &coo.colval, &coo.nzval) {
            buckets[next[row]] = (col, v);
            next[row] += 1;
        }

        // sort each row by column and merge duplicates
        let mut rowptr = vec![0; n + 1];
        let mut colval = Vec::with_capacity(buckets.len());
        let mut nzval = Vec::with_capacity(buckets.len());

        for row in 0..n {
            let bucket = &mut buckets[bucketptr[row]..bucketptr[row + 1]];
            bucket.sort_by_key(|&(col, _)| col);

            let first = colval.len();
            for &(col, v) in bucket.iter() {
                if colval.len() > first && colval.last() == Some(&col) {
                    if let Some(last) = nzval.last_mut() {
                        *last += v;
                    }
                } else {
                    colval.push(col);
                    nzval.push(v);
                }
            }
            rowptr[row + 1] = colval.len();
        }

        Ok(CsrMatrix::new(n, rowptr, colval, nzval, coo.symmetric))
    }
}
