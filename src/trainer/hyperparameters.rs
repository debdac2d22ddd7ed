use serde::Deserialize;
use serde::Serialize;

/// Epsilon-greedy schedule: linear decay from `initial` to `terminal`
/// over the first `fraction` of training steps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Exploration {
    pub initial: f64,
    pub terminal: f64,
    pub fraction: f64,
}

impl Default for Exploration {
    fn default() -> Self {
        Self {
            initial: 1.0,
            terminal: 0.03,
            fraction: 0.3,
        }
    }
}

/// Training parameters handed to the RL trainer for one epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hyperparameters {
    pub learning_rate: f64,
    pub buffer_size: usize,
    /// Simulated time steps per episode.
    pub horizon: usize,
    pub exploration: Exploration,
    /// Total environment steps.
    pub steps: usize,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            learning_rate: 5e-5,
            buffer_size: 30_000,
            horizon: 10,
            exploration: Exploration::default(),
            steps: 700_000,
        }
    }
}

impl Hyperparameters {
    pub fn validate(&self) -> crate::Result<()> {
        let e = &self.exploration;
        let ok = self.learning_rate > 0.
            && self.buffer_size > 0
            && self.horizon > 0
            && self.steps > 0
            && (0. ..=1.).contains(&e.initial)
            && (0. ..=1.).contains(&e.terminal)
            && (0. ..=1.).contains(&e.fraction);
        match ok {
            true => Ok(()),
            false => Err(crate::Error::Config(format!("bad training parameters {:?}", self))),
        }
    }
}
