//! Wall clock timing of the solver phases.

#[allow(clippy::module_inception)]
mod timers;
pub use timers::*;
pub(crate) use timers::timeit;
