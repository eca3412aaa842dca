//! Matrix Market input, JSON persistence of assembled matrices and
//! redirection of solver output.

mod matrix_market;
mod print_target;
pub use matrix_market::*;
pub(crate) use print_target::PrintTarget;
pub use print_target::ConfigurablePrintTarget;

#[cfg(feature = "serde")]
mod json;
#[cfg(feature = "serde")]
pub use json::*;
