use super::*;
use crate::strategy::*;
use crate::*;
use rand::Rng;
use serde::Deserialize;
use serde::Serialize;

/// Outcome of probing one role for beneficial deviations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Probe {
    pub baseline: Utility,
    pub trials: usize,
    pub beneficial: usize,
    /// Best ground-truth score among the annealed deviations.
    pub best: Option<Utility>,
}

impl Probe {
    /// Fraction of trials that beat the baseline. Zero when nothing ran.
    pub fn fraction(&self) -> Probability {
        match self.trials {
            0 => 0.,
            n => self.beneficial as Probability / n as Probability,
        }
    }
}

impl std::fmt::Display for Probe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} beneficial ({:.3}) vs baseline {:.4}",
            self.beneficial,
            self.trials,
            self.fraction(),
            self.baseline
        )
    }
}

/// Whether another annealing trial is worth running.
///
/// At least `min` trials, never more than `max`, and no more once the
/// beneficial fraction has reached `early_stop`.
pub fn should_continue(trials: usize, beneficial: usize, max: usize, min: usize, early_stop: Probability) -> bool {
    if trials >= max {
        false
    } else if trials < min || trials == 0 {
        true
    } else {
        (beneficial as Probability / trials as Probability) < early_stop
    }
}

/// Repeated annealing from fresh random starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Prober {
    pub min: usize,
    pub max: usize,
    pub early_stop: Probability,
    /// Margin a deviation must clear above the baseline.
    pub epsilon: Utility,
    /// Fresh samples used to re-score each annealed point.
    pub samples: usize,
}

impl Prober {
    pub async fn probe<S, R>(
        &self,
        annealer: &Annealer,
        scorer: &mut S,
        opponent: &Mixture,
        baseline: Utility,
        rng: &mut R,
    ) -> Result<Probe>
    where
        S: Scorer + ?Sized,
        R: Rng,
    {
        let mut probe = Probe {
            baseline,
            trials: 0,
            beneficial: 0,
            best: None,
        };
        if baseline == Utility::INFINITY {
            return Ok(probe);
        }
        while should_continue(probe.trials, probe.beneficial, self.max, self.min, self.early_stop) {
            let (params, _) = annealer.anneal(scorer, opponent, None, rng).await?;
            let truth = scorer.score(&params, opponent, self.samples).await?;
            if truth > baseline + self.epsilon {
                probe.beneficial += 1;
            }
            probe.trials += 1;
            probe.best = Some(probe.best.map_or(truth, |b: Utility| b.max(truth)));
            log::debug!("probe trial {} │ {:.4} at {}", probe.trials, truth, params);
        }
        Ok(probe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn annealer() -> Annealer {
        Annealer {
            count: 2,
            steps: 20,
            temperature: 1.,
            samples: 1,
            variance: 0.05,
        }
    }
    fn prober(min: usize, max: usize) -> Prober {
        Prober {
            min,
            max,
            early_stop: 0.5,
            epsilon: 0.,
            samples: 1,
        }
    }
    fn opponent() -> Mixture {
        Mixture::pure("att_seed")
    }

    #[test]
    fn continuation() {
        assert!(should_continue(0, 0, 5, 0, 0.5));
        assert!(should_continue(2, 2, 5, 3, 0.5));
        assert!(!should_continue(3, 2, 5, 3, 0.5));
        assert!(should_continue(3, 1, 5, 3, 0.5));
        assert!(!should_continue(5, 0, 5, 3, 0.5));
        assert!(!should_continue(0, 0, 0, 3, 0.5));
    }

    #[tokio::test]
    async fn beneficial() {
        let ref mut rng = SmallRng::seed_from_u64(0);
        let ref mut f = |p: &Params, _: &Mixture, _: usize| p[0];
        let probe = prober(5, 5)
            .probe(&annealer(), f, &opponent(), 0., rng)
            .await
            .unwrap();
        assert_eq!(probe.trials, 5);
        assert_eq!(probe.fraction(), 1.);
    }

    #[tokio::test]
    async fn hopeless() {
        let ref mut rng = SmallRng::seed_from_u64(1);
        let ref mut f = |p: &Params, _: &Mixture, _: usize| p[0];
        let probe = prober(5, 5)
            .probe(&annealer(), f, &opponent(), 2., rng)
            .await
            .unwrap();
        assert_eq!(probe.trials, 5);
        assert_eq!(probe.fraction(), 0.);
        assert!(probe.best.unwrap() <= 1.);
    }

    #[tokio::test]
    async fn unbeatable() {
        let ref mut rng = SmallRng::seed_from_u64(2);
        let ref mut calls = 0;
        let ref mut f = |p: &Params, _: &Mixture, _: usize| {
            *calls += 1;
            p[0]
        };
        let probe = prober(3, 10)
            .probe(&annealer(), f, &opponent(), Utility::INFINITY, rng)
            .await
            .unwrap();
        assert_eq!(probe.fraction(), 0.);
        assert_eq!(probe.trials, 0);
        assert_eq!(*calls, 0);
    }

    #[tokio::test]
    async fn early() {
        let ref mut rng = SmallRng::seed_from_u64(3);
        let ref mut f = |_: &Params, _: &Mixture, _: usize| 1.;
        let probe = prober(2, 50)
            .probe(&annealer(), f, &opponent(), 0., rng)
            .await
            .unwrap();
        assert_eq!(probe.trials, 2);
        assert_eq!(probe.beneficial, 2);
    }

    #[tokio::test]
    async fn exhaustive() {
        let ref mut rng = SmallRng::seed_from_u64(4);
        let ref mut f = |_: &Params, _: &Mixture, _: usize| 0.;
        let probe = prober(2, 7)
            .probe(&annealer(), f, &opponent(), 0., rng)
            .await
            .unwrap();
        assert_eq!(probe.trials, 7);
        assert!((0. ..=1.).contains(&probe.fraction()));
    }
}
