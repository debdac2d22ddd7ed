use super::*;
use crate::strategy::*;
use crate::*;
use serde::Deserialize;
use serde::Serialize;

/// An immutable, fully populated view of the empirical game.
///
/// Solving and probing are functions of a snapshot and a mixture, so
/// nothing downstream observes the table while it grows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    version: u64,
    defenders: Vec<String>,
    attackers: Vec<String>,
    /// Defender-major: `payoffs[i][j]` is defender i against attacker j.
    payoffs: Vec<Vec<Cell>>,
}

impl Snapshot {
    pub(crate) fn new(
        version: u64,
        defenders: Vec<String>,
        attackers: Vec<String>,
        payoffs: Vec<Vec<Cell>>,
    ) -> Self {
        debug_assert!(payoffs.len() == defenders.len());
        debug_assert!(payoffs.iter().all(|row| row.len() == attackers.len()));
        Self {
            version,
            defenders,
            attackers,
            payoffs,
        }
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
    pub fn shape(&self) -> (usize, usize) {
        (self.defenders.len(), self.attackers.len())
    }
    pub fn cell(&self, defender: usize, attacker: usize) -> &Cell {
        &self.payoffs[defender][attacker]
    }

    /// Each role's expected payoff when both play the equilibrium.
    pub fn expected(&self, equilibrium: &Equilibrium) -> Result<PerRole<Utility>> {
        equilibrium.validate(self)?;
        let mut value = PerRole::new(0., 0.);
        for (i, d) in self.defenders.iter().enumerate() {
            for (j, a) in self.attackers.iter().enumerate() {
                let p = equilibrium.defender.weight(d) * equilibrium.attacker.weight(a);
                value.defender += p * self.payoffs[i][j].defender;
                value.attacker += p * self.payoffs[i][j].attacker;
            }
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matching() -> Snapshot {
        let mut g = EmpiricalGame::new();
        for name in ["h", "t"] {
            g.add_strategy(Role::Defender, &format!("d{}", name));
            g.add_strategy(Role::Attacker, &format!("a{}", name));
        }
        g.record("dh", "ah", 1., -1., 1).unwrap();
        g.record("dh", "at", -1., 1., 1).unwrap();
        g.record("dt", "ah", -1., 1., 1).unwrap();
        g.record("dt", "at", 1., -1., 1).unwrap();
        g.snapshot().unwrap()
    }

    #[test]
    fn matrices() {
        let s = matching();
        assert_eq!(s.shape(), (2, 2));
        assert_eq!(s.cell(0, 1).payoff(Role::Defender), -1.);
        assert_eq!(s.cell(1, 1).payoff(Role::Attacker), -1.);
        assert_eq!(s.strategies(Role::Attacker), ["ah", "at"]);
    }

    #[test]
    fn values() {
        let s = matching();
        let mixed = Equilibrium {
            defender: Mixture::uniform(&["dh", "dt"]).unwrap(),
            attacker: Mixture::uniform(&["ah", "at"]).unwrap(),
            version: s.version(),
        };
        let v = s.expected(&mixed).unwrap();
        assert!(v.defender.abs() < 1e-12);
        assert!(v.attacker.abs() < 1e-12);
        let pure = Equilibrium::pure("dh", "at", s.version());
        let v = s.expected(&pure).unwrap();
        assert_eq!(v, PerRole::new(-1., 1.));
    }

    #[test]
    fn foreign() {
        let s = matching();
        let stray = Equilibrium::pure("dh", "a_ghost", s.version());
        assert!(matches!(s.expected(&stray), Err(Error::InvalidMixture(_))));
    }
}
