use super::*;
use crate::game::*;
use crate::search::*;
use crate::strategy::*;
use crate::*;
use serde::Deserialize;
use serde::Serialize;

/// Probe outcomes of one epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub epoch: Epoch,
    pub probes: PerRole<Probe>,
}

impl Round {
    /// Neither role found deviations at or above `threshold`.
    pub fn converged(&self, threshold: Probability) -> bool {
        Role::all()
            .iter()
            .all(|role| self.probes.get(*role).fraction() < threshold)
    }
}

/// The loop's view of a run between phases.
///
/// Never mutated in place: every transition returns the next state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub epoch: Epoch,
    pub phase: Phase,
    pub strategies: PerRole<Vec<String>>,
    pub equilibrium: Equilibrium,
    pub history: Vec<Round>,
}

impl State {
    pub fn initial(game: &EmpiricalGame, equilibrium: Equilibrium) -> Self {
        Self {
            epoch: 0,
            phase: Phase::Init,
            strategies: PerRole::new(
                game.strategies(Role::Defender).to_vec(),
                game.strategies(Role::Attacker).to_vec(),
            ),
            equilibrium,
            history: Vec::new(),
        }
    }
    pub fn at(&self, epoch: Epoch, phase: Phase) -> Self {
        Self {
            epoch,
            phase,
            ..self.clone()
        }
    }
    pub fn grown(&self, game: &EmpiricalGame) -> Self {
        Self {
            strategies: PerRole::new(
                game.strategies(Role::Defender).to_vec(),
                game.strategies(Role::Attacker).to_vec(),
            ),
            ..self.clone()
        }
    }
    pub fn solved(&self, equilibrium: Equilibrium) -> Self {
        Self {
            equilibrium,
            ..self.clone()
        }
    }
    pub fn probed(&self, probes: PerRole<Probe>) -> Self {
        let mut history = self.history.clone();
        history.push(Round {
            epoch: self.epoch,
            probes,
        });
        Self {
            history,
            ..self.clone()
        }
    }
    pub fn latest(&self) -> Option<&Round> {
        self.history.last()
    }
}

/// What lands in `state.json`: the state, the table, and why the run
/// stopped if it did not finish.
#[derive(Debug, Serialize)]
pub struct Checkpoint<'a> {
    pub state: &'a State,
    pub payoffs: PayoffFile,
    pub halted: Option<String>,
}
