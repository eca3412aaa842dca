#![allow(non_snake_case)]
use super::DirectFactorSolver;
use crate::algebra::*;
use crate::qdldl::*;
use crate::solver::{SolverError, SolverSettings};

#[derive(Debug)]
pub(crate) struct QDLDLDirectSolver<T> {
    //upper triangular matrix and its QDLDL factorization
    factors: QDLDLFactorisation<T>,
}

impl<T> QDLDLDirectSolver<T>
where
    T: FloatT,
{
    pub(crate) fn new(
        A: &CscMatrix<T>,
        perm: Vec<usize>,
        settings: &SolverSettings<T>,
    ) -> Result<Self, SolverError> {
        //make a logical factorization to fix memory allocations
        let opts = QDLDLSettings {
            perm: Some(perm),
            logical: true,
            regularize_enable: settings.regularize_enable,
            regularize_eps: settings.regularize_eps,
            regularize_delta: settings.regularize_delta,
            ..QDLDLSettings::default()
        };

        let factors = QDLDLFactorisation::<T>::new(A, Some(opts))?;

        Ok(Self { factors })
    }
}

impl<T> DirectFactorSolver<T> for QDLDLDirectSolver<T>
where
    T: FloatT,
{
    fn update_values(&mut self, values: &[T]) -> Result<(), SolverError> {
        //values are stored within the reordered
        //copy held internally by QDLDL.
        self.factors.update_values(values)?;
        Ok(())
    }

    fn refactor(&mut self) -> Result<(), SolverError> {
        self.factors.refactor()?;
        Ok(())
    }

    fn solve(&mut self, x: &mut [T]) {
        // NB: QDLDL solves in place
        self.factors.solve(x);
    }

    fn nnz_factor(&self) -> usize {
        // strictly lower L plus the diagonal D
        self.factors.nnz_L() + self.factors.D.len()
    }

    fn modified_pivots(&self) -> usize {
        self.factors.regularize_count()
    }
}
