//! Sparse matrix types and assembly.
//!
//! Matrices are read into a [`CooMatrix`], assembled into a
//! [`CsrMatrix`] (sorted, duplicates summed) and moved into a
//! [`CscMatrix`] internally by the factorization backends.

mod coo;
mod csc;
mod csr;
mod error_types;
mod floats;
mod matrix_traits;
pub(crate) mod utils;

pub use coo::*;
pub use csc::*;
pub use csr::*;
pub use error_types::*;
pub use floats::*;
pub use matrix_traits::*;
