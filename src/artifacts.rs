//! Deterministic artifact names and crash-safe persistence for a run.

use crate::game::*;
use crate::strategy::*;
use crate::*;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;

/// Layout of one run's output directory.
///
/// ```text
/// <root>/equilibria/<env>_epoch<e>_<def|att>.tsv
/// <root>/payoffs/<env>_epoch<e>.json
/// <root>/policies/<env>_epoch<e>_<def|att>.<suffix>
/// <root>/state.json
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Artifacts {
    root: PathBuf,
    env: String,
}

impl Artifacts {
    pub fn new(root: impl Into<PathBuf>, env: &str) -> Self {
        Self {
            root: root.into(),
            env: env.to_string(),
        }
    }
    /// Name of the policy trained for `role` in `epoch`.
    pub fn policy(&self, epoch: Epoch, role: Role) -> String {
        format!("{}_epoch{}_{}", self.env, epoch, role.short())
    }
    pub fn policies(&self) -> PathBuf {
        self.root.join("policies")
    }
    pub fn equilibrium(&self, epoch: Epoch, role: Role) -> PathBuf {
        self.root
            .join("equilibria")
            .join(format!("{}.tsv", self.policy(epoch, role)))
    }
    pub fn payoffs(&self, epoch: Epoch) -> PathBuf {
        self.root
            .join("payoffs")
            .join(format!("{}_epoch{}.json", self.env, epoch))
    }
    pub fn state(&self) -> PathBuf {
        self.root.join("state.json")
    }

    pub fn save_equilibrium(&self, epoch: Epoch, equilibrium: &Equilibrium) -> Result<()> {
        for role in Role::all() {
            write_atomic(&self.equilibrium(epoch, role), &equilibrium.mixture(role).to_tsv())?;
        }
        Ok(())
    }
    /// Read back both roles' mixtures. The game version is not persisted.
    pub fn load_equilibrium(&self, epoch: Epoch) -> Result<Equilibrium> {
        let load = |role| {
            std::fs::read_to_string(self.equilibrium(epoch, role))
                .map_err(Error::from)
                .and_then(|text| Mixture::from_tsv(&text))
        };
        Ok(Equilibrium {
            defender: load(Role::Defender)?,
            attacker: load(Role::Attacker)?,
            version: 0,
        })
    }
    pub fn save_payoffs(&self, epoch: Epoch, game: &EmpiricalGame) -> Result<()> {
        write_atomic(&self.payoffs(epoch), &game.to_json()?)
    }
    pub fn load_payoffs(&self, epoch: Epoch) -> Result<EmpiricalGame> {
        EmpiricalGame::from_json(&std::fs::read_to_string(self.payoffs(epoch))?)
    }
    pub fn save_state<T: Serialize>(&self, state: &T) -> Result<()> {
        write_atomic(&self.state(), &serde_json::to_string_pretty(state)?)
    }
}

/// Write through a sibling temporary and rename it into place, so readers
/// see either the old contents or the new, never a prefix.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    std::fs::write(&tmp, contents)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}
