use super::*;
use crate::strategy::*;
use crate::*;

/// Produces a best response for one role against a fixed opponent mixture.
#[async_trait::async_trait]
pub trait Train: Send {
    /// Training parameters for the upcoming calls.
    fn configure(&mut self, _: &Hyperparameters) {}
    /// Train and persist a policy named `out`.
    async fn train(&mut self, role: Role, opponent: &Mixture, seed: u64, out: &str) -> Result<Policy>;
}
