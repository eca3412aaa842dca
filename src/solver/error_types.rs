use super::{SettingsError, SolverPhase};
use crate::algebra::{ErrorKind, SparseFormatError};
use crate::lu::LUError;
use crate::qdldl::QDLDLError;
use thiserror::Error;

#[derive(Error, Debug)]
/// Error type returned by the [`DirectSolver`](crate::solver::DirectSolver) phases.
pub enum SolverError {
    /// A phase was called before the phases it depends on
    #[error("{called} called out of order: solver state is \"{phase}\"")]
    PhaseOrder {
        called: &'static str,
        phase: SolverPhase,
    },
    /// The row offsets or column indices are malformed
    #[error("Bad matrix structure: {0}")]
    Structure(#[from] SparseFormatError),
    /// A symmetric matrix was given with entries below the diagonal
    #[error("Symmetric matrix must supply its upper triangle only, found entry ({row},{col})")]
    NotUpperTriangular { row: usize, col: usize },
    /// The solve method cannot factor this kind of matrix
    #[error("Solve method \"{method}\" {reason}")]
    UnsupportedMethod {
        method: &'static str,
        reason: &'static str,
    },
    /// The number of values passed to factor differs from the structure
    #[error("Expected {expected} matrix values, found {found}")]
    IncompatibleValues { expected: usize, found: usize },
    /// A right hand side or solution vector has the wrong length
    #[error("Expected vector of length {expected}, found {found}")]
    IncompatibleVector { expected: usize, found: usize },
    /// The fill reducing ordering could not be computed
    #[error("AMD ordering failed")]
    OrderingFailed,
    /// Invalid solver settings
    #[error("Bad settings: {0}")]
    Settings(#[from] SettingsError),
    /// LDL factorization failure
    #[error("LDL factorization failed: {0}")]
    LDLFactor(#[from] QDLDLError),
    /// LU factorization failure
    #[error("LU factorization failed: {0}")]
    LUFactor(#[from] LUError),
    /// Writing verbose output failed
    #[error("Failed to write solver output: {0}")]
    Io(#[from] std::io::Error),
}

impl SolverError {
    /// The error classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            SolverError::Structure(e) => e.kind(),
            SolverError::Io(_) => ErrorKind::Io,
            _ => ErrorKind::Consistency,
        }
    }
}

#[test]
fn test_solver_error_kinds() {
    let err = SolverError::from(SparseFormatError::BadOffsets);
    assert_eq!(err.kind(), ErrorKind::Consistency);
    assert_eq!(
        err.to_string(),
        "Bad matrix structure: Bad row offset / column pointer values"
    );

    let err = SolverError::PhaseOrder {
        called: "factor",
        phase: SolverPhase::StructureDefined,
    };
    assert_eq!(err.kind(), ErrorKind::Consistency);
    assert_eq!(
        err.to_string(),
        "factor called out of order: solver state is \"structure defined\""
    );

    let err = SolverError::from(LUError::ZeroPivot { column: 3 });
    assert_eq!(
        err.to_string(),
        "LU factorization failed: Matrix is singular: no acceptable pivot in column 3"
    );

    let err = SolverError::IncompatibleVector {
        expected: 3,
        found: 2,
    };
    assert_eq!(err.kind(), ErrorKind::Consistency);
}
