use super::*;
use crate::oracle::*;
use crate::strategy::*;
use crate::*;
use std::collections::BTreeMap;

/// The growing empirical payoff table.
///
/// Strategy lists only ever grow. Every mutation bumps `version`, which
/// equilibria carry so stale solutions are detectable.
#[derive(Debug, Clone, Default)]
pub struct EmpiricalGame {
    defenders: Vec<String>,
    attackers: Vec<String>,
    cells: BTreeMap<(String, String), Cell>,
    version: u64,
}

impl EmpiricalGame {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn version(&self) -> u64 {
        self.version
    }
    pub fn strategies(&self, role: Role) -> &[String] {
        match role {
            Role::Defender => &self.defenders,
            Role::Attacker => &self.attackers,
        }
    }
    pub fn index(&self, role: Role, name: &str) -> Option<usize> {
        self.strategies(role).iter().position(|s| s == name)
    }
    pub fn get(&self, defender: &str, attacker: &str) -> Option<&Cell> {
        self.cells.get(&(defender.to_string(), attacker.to_string()))
    }

    /// Append a strategy to a role's list. Adding a present name is a no-op.
    pub fn add_strategy(&mut self, role: Role, name: &str) -> usize {
        if let Some(i) = self.index(role, name) {
            return i;
        }
        let list = match role {
            Role::Defender => &mut self.defenders,
            Role::Attacker => &mut self.attackers,
        };
        list.push(name.to_string());
        self.version += 1;
        list.len() - 1
    }

    /// Write a cell, or pool into the existing one weighted by sample counts.
    pub fn record(
        &mut self,
        defender: &str,
        attacker: &str,
        def_payoff: Utility,
        att_payoff: Utility,
        n: usize,
    ) -> Result<()> {
        for (role, name) in [(Role::Defender, defender), (Role::Attacker, attacker)] {
            if self.index(role, name).is_none() {
                return Err(Error::InvalidStrategy(format!("{} is not a {}", name, role)));
            }
        }
        let fresh = Cell::new(def_payoff, att_payoff, n)?;
        self.cells
            .entry((defender.to_string(), attacker.to_string()))
            .and_modify(|cell| *cell = cell.merge(&fresh))
            .or_insert(fresh);
        self.version += 1;
        Ok(())
    }

    /// Cross-product pairs without a payoff yet, defender-major.
    pub fn missing(&self) -> Vec<(String, String)> {
        self.defenders
            .iter()
            .flat_map(|d| self.attackers.iter().map(move |a| (d.clone(), a.clone())))
            .filter(|(d, a)| self.get(d, a).is_none())
            .collect()
    }
    pub fn complete(&self) -> bool {
        self.missing().is_empty()
    }

    /// Fill every missing cell in the defender's row.
    pub async fn complete_rows<S: Simulator>(
        &mut self,
        defender: &str,
        oracle: &mut PayoffOracle<S>,
        n: usize,
    ) -> Result<usize> {
        let pairs = self
            .attackers
            .iter()
            .filter(|a| self.get(defender, a).is_none())
            .map(|a| (defender.to_string(), a.clone()))
            .collect::<Vec<_>>();
        self.fill(pairs, oracle, n).await
    }

    /// Fill every missing cell in the attacker's column.
    pub async fn complete_cols<S: Simulator>(
        &mut self,
        attacker: &str,
        oracle: &mut PayoffOracle<S>,
        n: usize,
    ) -> Result<usize> {
        let pairs = self
            .defenders
            .iter()
            .filter(|d| self.get(d, attacker).is_none())
            .map(|d| (d.clone(), attacker.to_string()))
            .collect::<Vec<_>>();
        self.fill(pairs, oracle, n).await
    }

    async fn fill<S: Simulator>(
        &mut self,
        pairs: Vec<(String, String)>,
        oracle: &mut PayoffOracle<S>,
        n: usize,
    ) -> Result<usize> {
        let count = pairs.len();
        for (d, a) in pairs {
            let estimate = oracle.cell(&d, &a, n).await?;
            self.record(&d, &a, estimate.def_mean, estimate.att_mean, estimate.samples)?;
        }
        Ok(count)
    }

    /// Every invariant the solver relies on.
    pub fn validate(&self) -> Result<()> {
        for role in Role::all() {
            let list = self.strategies(role);
            if list.is_empty() {
                return Err(Error::InvariantViolation(format!("no {} strategies", role)));
            }
            if let Some(dup) = list
                .iter()
                .enumerate()
                .find(|(i, s)| list[..*i].contains(*s))
                .map(|(_, s)| s)
            {
                return Err(Error::InvariantViolation(format!("duplicate {} strategy {}", role, dup)));
            }
        }
        if let Some(dup) = self.defenders.iter().find(|d| self.attackers.contains(d)) {
            return Err(Error::InvariantViolation(format!("{} names both roles", dup)));
        }
        match self.missing().first() {
            Some((d, a)) => Err(Error::InvariantViolation(format!(
                "{} cells missing, first {} vs {}",
                self.missing().len(),
                d,
                a
            ))),
            None => Ok(()),
        }
    }

    /// Immutable, fully populated copy of the table.
    pub fn snapshot(&self) -> Result<Snapshot> {
        self.validate()?;
        let payoffs = self
            .defenders
            .iter()
            .map(|d| {
                self.attackers
                    .iter()
                    .map(|a| *self.get(d, a).expect("validated complete"))
                    .collect()
            })
            .collect();
        Ok(Snapshot::new(
            self.version,
            self.defenders.clone(),
            self.attackers.clone(),
            payoffs,
        ))
    }

    pub(crate) fn cells(&self) -> impl Iterator<Item = (&(String, String), &Cell)> {
        self.cells.iter()
    }
}

/// Equal strategy lists and payoff cells. The version counter is ignored.
impl PartialEq for EmpiricalGame {
    fn eq(&self, other: &Self) -> bool {
        self.defenders == other.defenders
            && self.attackers == other.attackers
            && self.cells == other.cells
    }
}
