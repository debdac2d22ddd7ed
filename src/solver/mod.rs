//! Equilibrium computation through an external LCP solver.
//!
//! The snapshot is exported as Gambit strategic-form text, handed to the
//! solver on stdin, and the first reported equilibrium is decoded back
//! into one [`Mixture`](crate::strategy::Mixture) per role.

mod decode;
mod lcp;
mod normal;

pub use decode::*;
pub use lcp::*;
pub use normal::*;
