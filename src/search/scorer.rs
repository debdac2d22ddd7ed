use crate::oracle::*;
use crate::strategy::*;
use crate::*;

/// Expected payoff of a point in a heuristic family against a fixed
/// opponent mixture, estimated from `n` samples.
#[async_trait::async_trait]
pub trait Scorer: Send {
    async fn score(&mut self, params: &Params, opponent: &Mixture, n: usize) -> Result<Utility>;
}

/// Plain functions score deterministically and never fail.
#[async_trait::async_trait]
impl<F> Scorer for F
where
    F: FnMut(&Params, &Mixture, usize) -> Utility + Send,
{
    async fn score(&mut self, params: &Params, opponent: &Mixture, n: usize) -> Result<Utility> {
        Ok(self(params, opponent, n))
    }
}

/// Scores one role's heuristic family by playing it through the oracle.
pub struct OracleScorer<'a, S: Simulator> {
    oracle: &'a mut PayoffOracle<S>,
    role: Role,
    family: String,
}

impl<'a, S: Simulator> OracleScorer<'a, S> {
    pub fn new(oracle: &'a mut PayoffOracle<S>, role: Role, family: &str) -> Result<Self> {
        let found = oracle.catalog().family(family)?;
        if found.role != role {
            return Err(Error::InvalidStrategy(format!(
                "family {} belongs to the {}, not the {}",
                family, found.role, role
            )));
        }
        Ok(Self {
            oracle,
            role,
            family: family.to_string(),
        })
    }
    pub fn role(&self) -> Role {
        self.role
    }
}

#[async_trait::async_trait]
impl<'a, S: Simulator> Scorer for OracleScorer<'a, S> {
    async fn score(&mut self, params: &Params, opponent: &Mixture, n: usize) -> Result<Utility> {
        let deviation = Strategy::heuristic(&self.family, params.clone());
        let opponent = Strategy::Mixture(opponent.clone());
        let estimate = match self.role {
            Role::Defender => self.oracle.retrying(&deviation, &opponent, n).await?,
            Role::Attacker => self.oracle.retrying(&opponent, &deviation, n).await?,
        };
        Ok(estimate.mean(self.role))
    }
}
