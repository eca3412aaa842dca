#![allow(non_snake_case)]
use super::DirectFactorSolver;
use crate::algebra::*;
use crate::lu::*;
use crate::solver::{SolverError, SolverSettings};

#[derive(Debug)]
pub(crate) struct LUDirectSolver<T> {
    //square matrix and its LU factorization
    factors: LUFactorisation<T>,
}

impl<T> LUDirectSolver<T>
where
    T: FloatT,
{
    pub(crate) fn new(
        A: &CscMatrix<T>,
        perm: Vec<usize>,
        settings: &SolverSettings<T>,
    ) -> Result<Self, SolverError> {
        // row pivots depend on the values, so only the
        // column ordering is fixed here
        let opts = LUSettings {
            perm: Some(perm),
            logical: true,
            pivot_threshold: settings.pivot_threshold,
            pivot_tolerance: settings.pivot_tolerance,
            ..LUSettings::default()
        };

        let factors = LUFactorisation::<T>::new(A, Some(opts))?;

        Ok(Self { factors })
    }
}

impl<T> DirectFactorSolver<T> for LUDirectSolver<T>
where
    T: FloatT,
{
    fn update_values(&mut self, values: &[T]) -> Result<(), SolverError> {
        self.factors.update_values(values)?;
        Ok(())
    }

    fn refactor(&mut self) -> Result<(), SolverError> {
        self.factors.refactor()?;
        Ok(())
    }

    fn solve(&mut self, x: &mut [T]) {
        self.factors.solve(x);
    }

    fn nnz_factor(&self) -> usize {
        self.factors.nnz_LU()
    }

    fn modified_pivots(&self) -> usize {
        self.factors.swap_count()
    }
}
