//! Strategies as a tagged sum: parameterized heuristics, trained
//! policies, and mixtures over other named strategies.
//!
//! The [`Catalog`] owns every named strategy in a run and resolves
//! a name to a [`Concrete`] strategy once per episode.

mod catalog;
mod family;
mod mixture;
mod params;
mod role;
mod strategy;

pub use catalog::*;
pub use family::*;
pub use mixture::*;
pub use params::*;
pub use role::*;
pub use strategy::*;
