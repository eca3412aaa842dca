//! QDLDL : $LDL^T$ factorisation of symmetric quasidefinite matrices.
//!
//! Used by the [`DirectSolver`](crate::solver::DirectSolver) for
//! matrices with symmetric storage.

#[allow(clippy::module_inception)]
mod qdldl;
pub use qdldl::*;
