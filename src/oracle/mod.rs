//! Monte-Carlo payoff estimation against the external game simulator.
//!
//! - [`Simulator`] is the seam to whatever plays one episode.
//! - [`ProcessSimulator`] drives the dependency-graph simulator as a child
//!   process, guarded by a [`PortLock`] while it comes up.
//! - [`PayoffOracle`] samples episodes, resolving mixtures per episode, and
//!   retries transient faults per payoff cell.

mod estimate;
mod lock;
mod oracle;
mod process;
mod simulator;

pub use estimate::*;
pub use lock::*;
pub use oracle::*;
pub use process::*;
pub use simulator::*;
