//! Stochastic local search over parameterized heuristic families.
//!
//! [`Annealer`] maximizes a [`Scorer`] over the unit box, and [`Prober`]
//! repeats it from fresh starts to estimate how often a deviation beats
//! the current equilibrium payoff.

mod annealer;
mod prober;
mod scorer;

pub use annealer::*;
pub use prober::*;
pub use scorer::*;
