//! __mmsolve__ reads sparse matrices in the Matrix Market coordinate format,
//! assembles them into compressed sparse row (CSR) form and solves linear
//! systems with them using a sparse direct method.
//!
//! The pipeline has three stages, used in strict sequence:
//!
//! 1. [`io::read_matrix_market`] parses a `.mtx` file into a
//!    [`CooMatrix`](algebra::CooMatrix).  Files with `symmetric` storage
//!    list the lower triangle, and their entries are transposed on input
//!    so that the matrix holds the upper triangle.
//! 2. Converting the [`CooMatrix`](algebra::CooMatrix) into a
//!    [`CsrMatrix`](algebra::CsrMatrix) sorts each row by column and sums
//!    duplicate entries.
//! 3. A [`DirectSolver`](solver::DirectSolver) takes the CSR structure and
//!    values through the phases define structure → reorder → factor →
//!    solve.  Symmetric matrices are factored with an LDLᵀ method and
//!    general matrices with a pivoted LU method.
//!
//! ## Example
//!
//! ```no_run
//! use mmsolve::algebra::*;
//! use mmsolve::io::read_matrix_market;
//! use mmsolve::solver::*;
//!
//! let coo: CooMatrix<f64> = read_matrix_market("matrix.mtx").unwrap();
//! let A = CsrMatrix::try_from(coo).unwrap();
//!
//! let b = vec![1.0; A.n];
//! let settings = SolverSettingsBuilder::default().verbose(true).build().unwrap();
//!
//! let (x, info) = solve(&A, &b, settings).unwrap();
//! println!("residual = {:e}", A.residual_norm_inf(&x, &b));
//! println!("factor nnz = {}", info.nnz_factor);
//! ```
//!
//! ## Features
//!
//! The default `serde` feature derives serialization for the matrix types
//! and solver settings, and adds JSON reading and writing of
//! [`CsrMatrix`](algebra::CsrMatrix) through
//! [`MatrixJSONReadWrite`](io::MatrixJSONReadWrite).

//Rust hates greek characters
#![allow(confusable_idents)]

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod algebra;
pub mod io;
pub mod lu;
pub mod qdldl;
pub mod solver;
pub mod timers;

/// Version number of this crate
pub fn version() -> &'static str {
    VERSION
}
