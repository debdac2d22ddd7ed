use super::*;
use crate::strategy::*;
use crate::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::time::Instant;

/// Monte-Carlo estimator of expected payoffs for strategy pairs.
///
/// Owns the simulator handle and the [`Catalog`] that names resolve
/// against, so every estimate sees the strategies registered so far.
pub struct PayoffOracle<S: Simulator> {
    simulator: S,
    catalog: Catalog,
    rng: SmallRng,
    deadline: Option<Instant>,
    episodes: usize,
}

impl<S: Simulator> PayoffOracle<S> {
    pub fn new(simulator: S, catalog: Catalog, seed: u64) -> Self {
        Self {
            simulator,
            catalog,
            rng: SmallRng::seed_from_u64(seed),
            deadline: None,
            episodes: 0,
        }
    }
    pub fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
    pub fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }
    pub fn simulator(&self) -> &S {
        &self.simulator
    }
    /// Total episodes played through this oracle.
    pub fn episodes(&self) -> usize {
        self.episodes
    }
    pub async fn restart(&mut self) -> Result<()> {
        self.simulator.restart().await
    }

    /// Play exactly `n` episodes of `defender` against `attacker`.
    /// Mixtures pick a fresh component every episode.
    pub async fn estimate(&mut self, defender: &Strategy, attacker: &Strategy, n: usize) -> Result<Estimate> {
        let mut samples = Vec::with_capacity(n);
        for _ in 0..n {
            if self.expired() {
                return Err(Error::Interrupted);
            }
            let d = self.catalog.resolve(defender, &mut self.rng)?;
            let a = self.catalog.resolve(attacker, &mut self.rng)?;
            let (dp, ap) = self.simulator.episode(&d, &a).await?;
            if !dp.is_finite() || !ap.is_finite() {
                return Err(Error::SimulatorUnavailable(format!(
                    "non-finite payoff ({}, {}) for {} vs {}",
                    dp, ap, d, a
                )));
            }
            self.episodes += 1;
            samples.push((dp, ap));
        }
        Estimate::try_from(samples.as_slice())
    }

    /// [`Self::estimate`] with transient simulator faults retried on a
    /// restarted simulator, at most [`CELL_RETRIES`] times.
    pub async fn retrying(&mut self, defender: &Strategy, attacker: &Strategy, n: usize) -> Result<Estimate> {
        let mut attempt = 0;
        loop {
            match self.estimate(defender, attacker, n).await {
                Err(e) if e.is_transient() && attempt < CELL_RETRIES => {
                    attempt += 1;
                    log::warn!("{} (retry {}/{})", e, attempt, CELL_RETRIES);
                    if let Err(e) = self.simulator.restart().await {
                        log::warn!("restart failed: {}", e);
                    }
                }
                result => return result,
            }
        }
    }

    /// Estimate one payoff-table cell by strategy name.
    pub async fn cell(&mut self, defender: &str, attacker: &str, n: usize) -> Result<Estimate> {
        let d = self.catalog.get(defender)?.clone();
        let a = self.catalog.get(attacker)?.clone();
        let estimate = self.retrying(&d, &a, n).await?;
        log::debug!("{} vs {} │ {}", defender, attacker, estimate);
        Ok(estimate)
    }

    fn expired(&self) -> bool {
        crate::interrupted() || self.deadline.map_or(false, |d| Instant::now() >= d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic payoffs with scripted outages.
    struct Scripted {
        calls: usize,
        failures: Vec<usize>,
        restarts: usize,
    }

    #[async_trait::async_trait]
    impl Simulator for Scripted {
        async fn episode(&mut self, d: &Concrete, _attacker: &Concrete) -> Result<(Utility, Utility)> {
            self.calls += 1;
            if self.failures.contains(&self.calls) {
                return Err(Error::SimulatorUnavailable(String::from("scripted crash")));
            }
            match d {
                Concrete::Trained { scope, .. } if scope == "d1" => Ok((1., -1.)),
                Concrete::Trained { .. } => Ok((-1., 1.)),
                Concrete::Heuristic { params, .. } => Ok((params[0], -params[0])),
            }
        }
        async fn restart(&mut self) -> Result<()> {
            self.restarts += 1;
            Ok(())
        }
    }

    fn oracle(failures: Vec<usize>) -> PayoffOracle<Scripted> {
        let mut catalog = Catalog::default();
        for name in ["d1", "d2", "a1"] {
            catalog.insert(name, Strategy::trained(name, name)).unwrap();
        }
        let simulator = Scripted {
            calls: 0,
            failures,
            restarts: 0,
        };
        PayoffOracle::new(simulator, catalog, 11)
    }

    #[tokio::test]
    async fn exactness() {
        let mut o = oracle(vec![]);
        let e = o.cell("d1", "a1", 25).await.unwrap();
        assert_eq!(e.samples, 25);
        assert_eq!(o.episodes(), 25);
        assert_eq!(e.def_mean, 1.);
        assert_eq!(e.att_mean, -1.);
    }

    #[tokio::test]
    async fn single() {
        let mut o = oracle(vec![]);
        let e = o.cell("d2", "a1", 1).await.unwrap();
        assert_eq!(e.def_stderr, 0.);
        assert_eq!(e.att_stderr, 0.);
    }

    #[tokio::test]
    async fn mixing() {
        let mut o = oracle(vec![]);
        let mix = Strategy::Mixture(Mixture::uniform(&["d1", "d2"]).unwrap());
        let a1 = o.catalog().get("a1").unwrap().clone();
        let e = o.estimate(&mix, &a1, 4000).await.unwrap();
        assert!(e.def_mean.abs() < 0.1);
        assert!(e.def_stderr > 0.);
    }

    #[tokio::test]
    async fn unresolvable() {
        let mut o = oracle(vec![]);
        assert!(matches!(o.cell("ghost", "a1", 3).await, Err(Error::InvalidStrategy(_))));
    }

    #[tokio::test]
    async fn recovery() {
        let mut o = oracle(vec![2, 5]);
        let e = o.cell("d1", "a1", 3).await.unwrap();
        assert_eq!(e.samples, 3);
        assert_eq!(o.simulator().restarts, 2);
    }

    #[tokio::test]
    async fn exhaustion() {
        let mut o = oracle(vec![1, 2, 3, 4]);
        let result = o.cell("d1", "a1", 1).await;
        assert!(matches!(result, Err(Error::SimulatorUnavailable(_))));
        assert_eq!(o.simulator().restarts, CELL_RETRIES);
    }

    #[tokio::test]
    async fn deadline() {
        let mut o = oracle(vec![]).with_deadline(Some(Instant::now()));
        assert!(matches!(o.cell("d1", "a1", 5).await, Err(Error::Interrupted)));
    }
}
