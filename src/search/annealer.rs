use super::*;
use crate::strategy::*;
use crate::*;
use rand::Rng;
use rand_distr::Normal;

/// Simulated annealing over the unit box [0,1]^k.
///
/// Temperature falls linearly from `temperature` to zero over `steps`.
/// Worse neighbors are accepted with probability `exp(Δ/T)` while the
/// temperature is positive, and never once it reaches zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Annealer {
    /// Dimension of the search box.
    pub count: usize,
    pub steps: usize,
    pub temperature: f64,
    /// Samples per scorer evaluation.
    pub samples: usize,
    /// Variance of the Gaussian neighbor step.
    pub variance: f64,
}

impl Annealer {
    /// Maximize `scorer` against `opponent`, starting from `initial` or a
    /// uniform random point. Returns the best point seen and its score.
    pub async fn anneal<S, R>(
        &self,
        scorer: &mut S,
        opponent: &Mixture,
        initial: Option<Params>,
        rng: &mut R,
    ) -> Result<(Params, Utility)>
    where
        S: Scorer + ?Sized,
        R: Rng,
    {
        let ref noise = self.noise()?;
        let mut current = initial.unwrap_or_else(|| Params::random(self.count, rng));
        if current.len() != self.count {
            return Err(Error::InvalidStrategy(format!(
                "annealing {} parameters from a start of {}",
                self.count,
                current.len()
            )));
        }
        let mut value = scorer.score(&current, opponent, self.samples).await?;
        let mut best = (current.clone(), value);
        for step in 1..=self.steps {
            let neighbor = current.neighbor(noise, rng);
            let score = scorer.score(&neighbor, opponent, self.samples).await?;
            let t = self.temperature * (1. - step as f64 / self.steps as f64);
            let delta = score - value;
            let accept = if t <= 0. {
                delta > 0.
            } else {
                delta >= 0. || rng.random::<f64>() < (delta / t).exp()
            };
            if accept {
                current = neighbor;
                value = score;
                if value > best.1 {
                    best = (current.clone(), value);
                }
            }
        }
        log::debug!("annealed {} steps │ best {:.4} at {}", self.steps, best.1, best.0);
        Ok(best)
    }

    fn noise(&self) -> Result<Normal<f64>> {
        Normal::new(0., self.variance.sqrt())
            .map_err(|e| Error::Config(format!("neighbor variance {}: {}", self.variance, e)))
    }
}
