//! Sparse LU factorisation of general square matrices with
//! threshold partial pivoting.
//!
//! Used by the [`DirectSolver`](crate::solver::DirectSolver) for
//! matrices with general (unsymmetric) storage.

#[allow(clippy::module_inception)]
mod lu;
pub use lu::*;
