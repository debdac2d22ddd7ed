use super::*;
use crate::game::*;
use crate::strategy::*;
use crate::*;
use serde::Serialize;
use std::time::Duration;

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Termination {
    /// Both roles' probes fell below the early-stop fraction.
    Converged,
    MaxEpochs,
    /// Graceful stop or wall-clock deadline.
    Interrupted,
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Converged => write!(f, "converged"),
            Self::MaxEpochs => write!(f, "max epochs"),
            Self::Interrupted => write!(f, "interrupted"),
        }
    }
}

/// End-of-run report.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub epochs: Epoch,
    pub termination: Termination,
    pub equilibrium: Equilibrium,
    pub history: Vec<Round>,
    pub strategies: PerRole<usize>,
    pub episodes: usize,
    pub elapsed: Duration,
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "┌────────┬──────────────────┬──────────────────┐")?;
        writeln!(f, "│ Epoch  │ Defender probe   │ Attacker probe   │")?;
        writeln!(f, "├────────┼──────────────────┼──────────────────┤")?;
        for round in self.history.iter() {
            writeln!(
                f,
                "│ {:>6} │ {:>3}/{:<3} {:>8.3} │ {:>3}/{:<3} {:>8.3} │",
                round.epoch,
                round.probes.defender.beneficial,
                round.probes.defender.trials,
                round.probes.defender.fraction(),
                round.probes.attacker.beneficial,
                round.probes.attacker.trials,
                round.probes.attacker.fraction(),
            )?;
        }
        writeln!(f, "├────────┴──────────────────┴──────────────────┤")?;
        writeln!(f, "│ Stopped    {:>34} │", format!("{} after {}", self.termination, self.epochs))?;
        writeln!(
            f,
            "│ Strategies {:>34} │",
            format!("{} def × {} att", self.strategies.defender, self.strategies.attacker)
        )?;
        writeln!(f, "│ Episodes   {:>34} │", self.episodes)?;
        writeln!(f, "│ Elapsed    {:>33.1}s │", self.elapsed.as_secs_f64())?;
        writeln!(f, "└───────────────────────────────────────────────┘")?;
        writeln!(f, "defender {}", self.equilibrium.defender)?;
        write!(f, "attacker {}", self.equilibrium.attacker)
    }
}
