use crate::strategy::*;
use crate::*;

/// Plays single episodes of the dependency-graph game.
#[async_trait::async_trait]
pub trait Simulator: Send {
    /// Play one episode and return (defender payoff, attacker payoff).
    async fn episode(&mut self, defender: &Concrete, attacker: &Concrete) -> Result<(Utility, Utility)>;
    /// Release the current handle and acquire a fresh one.
    async fn restart(&mut self) -> Result<()>;
}
