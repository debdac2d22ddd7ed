use super::*;
use crate::strategy::*;
use crate::*;
use serde::Deserialize;
use serde::Serialize;

/// One mixture per role, tagged with the game version it was solved on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equilibrium {
    pub defender: Mixture,
    pub attacker: Mixture,
    pub version: u64,
}

impl Equilibrium {
    pub fn pure(defender: &str, attacker: &str, version: u64) -> Self {
        Self {
            defender: Mixture::pure(defender),
            attacker: Mixture::pure(attacker),
            version,
        }
    }
    pub fn mixture(&self, role: Role) -> &Mixture {
        match role {
            Role::Defender => &self.defender,
            Role::Attacker => &self.attacker,
        }
    }
    /// Both mixtures only reference strategies present in the snapshot.
    pub fn validate(&self, snapshot: &Snapshot) -> Result<()> {
        for role in Role::all() {
            self.mixture(role).within(snapshot.strategies(role))?;
        }
        Ok(())
    }
}

impl std::fmt::Display for Equilibrium {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "v{} │ def {} │ att {}",
            self.version, self.defender, self.attacker
        )
    }
}
