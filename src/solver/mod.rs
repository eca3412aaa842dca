//! Sparse direct solver for square linear systems.
//!
//! The [`DirectSolver`] is driven through the phases define structure →
//! reorder → factor → solve, with its behaviour configured by
//! [`SolverSettings`].  Symmetric matrices, stored as their upper
//! triangle, are factored by default with the LDLᵀ method of
//! [`qdldl`](crate::qdldl).  General matrices are factored with the
//! pivoted LU method of [`lu`](crate::lu).
//!
//! The [`solve`] function runs every phase for a single right hand side.

// internal module structure
mod engines;
mod error_types;
mod info;
mod settings;
#[allow(clippy::module_inception)]
mod solver;
mod structure;

pub use engines::DirectSolveMethod;
pub use error_types::*;
pub use info::*;
pub use settings::*;
pub use solver::*;
