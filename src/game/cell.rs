use crate::strategy::*;
use crate::*;
use serde::Deserialize;
use serde::Serialize;

/// Mean payoffs of one (defender, attacker) pair and how many episodes back them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub defender: Utility,
    pub attacker: Utility,
    pub count: usize,
}

impl Cell {
    pub fn new(defender: Utility, attacker: Utility, count: usize) -> Result<Self> {
        if count == 0 {
            return Err(Error::InvariantViolation(String::from("cell with zero samples")));
        }
        if !defender.is_finite() || !attacker.is_finite() {
            return Err(Error::InvariantViolation(format!(
                "non-finite payoff ({}, {})",
                defender, attacker
            )));
        }
        Ok(Self {
            defender,
            attacker,
            count,
        })
    }
    pub fn payoff(&self, role: Role) -> Utility {
        match role {
            Role::Defender => self.defender,
            Role::Attacker => self.attacker,
        }
    }
    /// Pool two cells, weighting each mean by its sample count.
    pub fn merge(&self, other: &Self) -> Self {
        let n = (self.count + other.count) as Utility;
        let a = self.count as Utility / n;
        let b = other.count as Utility / n;
        Self {
            defender: a * self.defender + b * other.defender,
            attacker: a * self.attacker + b * other.attacker,
            count: self.count + other.count,
        }
    }
}
