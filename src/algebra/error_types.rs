use thiserror::Error;

/// Classification shared by every error type in the crate.
///
/// Callers that only need to know *what went wrong* rather than the
/// details can match on the kind, e.g. to tell a malformed file apart
/// from an unreadable one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The input could not be opened or read, or was empty
    Io,
    /// The input text does not follow the expected grammar
    Format,
    /// A row or column index lies outside the matrix dimension
    Range,
    /// More entries were supplied than the declared capacity
    Capacity,
    /// A matrix is structurally invalid
    Consistency,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Error type returned by sparse matrix assembly operations.
pub enum SparseFormatError {
    /// Row index is outside `[0, dimension)`
    #[error("row index {row} is outside the range [0, {dimension})")]
    RowOutOfRange { row: usize, dimension: usize },
    /// Column index is outside `[0, dimension)`
    #[error("column index {col} is outside the range [0, {dimension})")]
    ColumnOutOfRange { col: usize, dimension: usize },
    /// An append was attempted on a full coordinate matrix
    #[error("max number of entries ({capacity}) has been exceeded")]
    CapacityExceeded { capacity: usize },
    /// Matrix has no rows or columns
    #[error("matrix dimension is zero")]
    EmptyDimension,
    /// A stored entry lies outside the declared dimension
    #[error("entry {position} at ({row},{col}) is outside a matrix of dimension {dimension}")]
    EntryOutOfRange {
        position: usize,
        row: usize,
        col: usize,
        dimension: usize,
    },
    /// Matrix dimension fields and/or array lengths are incompatible
    #[error("Matrix dimension fields and/or array lengths are incompatible")]
    IncompatibleDimension,
    /// Row offsets (or column pointers) are not non-decreasing
    #[error("Bad row offset / column pointer values")]
    BadOffsets,
    /// Minor indices are unsorted, duplicated or out of bounds within
    /// one compressed row (CSR) or column (CSC)
    #[error("Unsorted, duplicated or out of range indices in compressed row/column {outer}")]
    BadIndices { outer: usize },
}

impl SparseFormatError {
    /// The error classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            SparseFormatError::RowOutOfRange { .. } | SparseFormatError::ColumnOutOfRange { .. } => {
                ErrorKind::Range
            }
            SparseFormatError::CapacityExceeded { .. } => ErrorKind::Capacity,
            _ => ErrorKind::Consistency,
        }
    }
}

#[test]
fn test_sparse_format_error_kinds() {
    let err = SparseFormatError::RowOutOfRange {
        row: 3,
        dimension: 3,
    };
    assert_eq!(err.kind(), ErrorKind::Range);
    assert_eq!(err.to_string(), "row index 3 is outside the range [0, 3)");

    let err = SparseFormatError::CapacityExceeded { capacity: 2 };
    assert_eq!(err.kind(), ErrorKind::Capacity);

    let err = SparseFormatError::EntryOutOfRange {
        position: 0,
        row: 5,
        col: 0,
        dimension: 2,
    };
    assert_eq!(err.kind(), ErrorKind::Consistency);
}
