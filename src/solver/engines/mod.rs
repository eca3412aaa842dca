#![allow(non_snake_case)]

use super::{SolverError, SolverSettings};
use crate::algebra::*;
use enum_dispatch::*;

mod lu;
mod qdldl;
pub(crate) use lu::*;
pub(crate) use qdldl::*;

/// Numeric factorization backends available to the
/// [`DirectSolver`](crate::solver::DirectSolver)
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectSolveMethod {
    /// LDLᵀ factorization of a symmetric matrix
    QDLDL,
    /// LU factorization with threshold partial pivoting
    LU,
}

impl DirectSolveMethod {
    /// Choose a method from its settings name and the matrix symmetry.
    /// "auto" picks QDLDL for symmetric matrices that store every
    /// diagonal entry and LU otherwise.
    pub fn select(method: &str, symmetric: bool, full_diagonal: bool) -> Result<Self, SolverError> {
        match (method, symmetric) {
            ("auto", true) if full_diagonal => Ok(DirectSolveMethod::QDLDL),
            ("qdldl", true) => Ok(DirectSolveMethod::QDLDL),
            ("auto", _) | ("lu", _) => Ok(DirectSolveMethod::LU),
            ("qdldl", false) => Err(SolverError::UnsupportedMethod {
                method: "qdldl",
                reason: "requires a symmetric matrix",
            }),
            _ => Err(super::SettingsError::BadFieldValue("direct_solve_method").into()),
        }
    }

    /// name of the method as used in the settings
    pub fn as_str(&self) -> &'static str {
        match self {
            DirectSolveMethod::QDLDL => "qdldl",
            DirectSolveMethod::LU => "lu",
        }
    }

    // LU factors the full matrix, so a symmetric matrix
    // is expanded from its upper triangle
    pub(crate) fn needs_full_matrix(&self, symmetric: bool) -> bool {
        matches!(self, DirectSolveMethod::LU) && symmetric
    }
}

impl std::fmt::Display for DirectSolveMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[enum_dispatch]
pub(crate) trait DirectFactorSolver<T>
where
    T: FloatT,
{
    // replace the values of the matrix, ordered as its CSC nzval
    fn update_values(&mut self, values: &[T]) -> Result<(), SolverError>;
    fn refactor(&mut self) -> Result<(), SolverError>;
    // solves in place, x replaces b
    fn solve(&mut self, x: &mut [T]);
    fn nnz_factor(&self) -> usize;
    // regularized (LDL) or off-diagonal (LU) pivots in the last factorization
    fn modified_pivots(&self) -> usize;
}

#[derive(Debug)]
#[enum_dispatch(DirectFactorSolver<T>)]
pub(crate) enum FactorEngine<T>
where
    T: FloatT,
{
    QDLDLDirectSolver(QDLDLDirectSolver<T>),
    LUDirectSolver(LUDirectSolver<T>),
}

impl<T> FactorEngine<T>
where
    T: FloatT,
{
    // symbolic factorization of A with a fixed ordering.  Values
    // follow through update_values and refactor
    pub(crate) fn new(
        method: DirectSolveMethod,
        A: &CscMatrix<T>,
        perm: Vec<usize>,
        settings: &SolverSettings<T>,
    ) -> Result<Self, SolverError> {
        let engine: FactorEngine<T> = match method {
            DirectSolveMethod::QDLDL => QDLDLDirectSolver::new(A, perm, settings)?.into(),
            DirectSolveMethod::LU => LUDirectSolver::new(A, perm, settings)?.into(),
        };
        Ok(engine)
    }
}

#[test]
fn test_method_select() {
    use DirectSolveMethod::*;
    assert_eq!(DirectSolveMethod::select("auto", true, true).unwrap(), QDLDL);
    assert_eq!(DirectSolveMethod::select("auto", false, true).unwrap(), LU);
    assert_eq!(DirectSolveMethod::select("lu", true, true).unwrap(), LU);
    assert_eq!(DirectSolveMethod::select("qdldl", true, true).unwrap(), QDLDL);

    // a structurally zero diagonal entry rules out LDLᵀ only when
    // the method was left to choose
    assert_eq!(DirectSolveMethod::select("auto", true, false).unwrap(), LU);
    assert_eq!(DirectSolveMethod::select("qdldl", true, false).unwrap(), QDLDL);

    assert!(matches!(
        DirectSolveMethod::select("qdldl", false, true),
        Err(SolverError::UnsupportedMethod { .. })
    ));
    assert!(matches!(
        DirectSolveMethod::select("faer", true, true),
        Err(SolverError::Settings(_))
    ));

    assert!(LU.needs_full_matrix(true));
    assert!(!LU.needs_full_matrix(false));
    assert!(!QDLDL.needs_full_matrix(true));
    assert_eq!(LU.to_string(), "lu");
}
