//! The empirical game: a growing payoff table over named strategies.

mod cell;
mod equilibrium;
mod exchange;
mod game;
mod snapshot;

pub use cell::*;
pub use equilibrium::*;
pub use exchange::*;
pub use game::*;
pub use snapshot::*;
