//! The double-oracle control loop and its configuration.
//!
//! Each epoch trains a best response per role against the opponent's
//! equilibrium mixture, fills the new payoff rows and columns, solves
//! for a fresh equilibrium, and probes both roles for deviations that
//! still beat it.

mod config;
mod expansion;
mod phase;
mod state;
mod summary;

pub use config::*;
pub use expansion::*;
pub use phase::*;
pub use state::*;
pub use summary::*;
