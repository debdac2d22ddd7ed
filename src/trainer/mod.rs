//! Best-response training through an external RL trainer.

mod external;
mod hyperparameters;
mod policy;
mod train;

pub use external::*;
pub use hyperparameters::*;
pub use policy::*;
pub use train::*;
