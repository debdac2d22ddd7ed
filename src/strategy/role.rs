use serde::Deserialize;
use serde::Serialize;

/// The two sides of the dependency-graph game.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Protects nodes, wants targets to stay inactive.
    Defender,
    /// Compromises nodes, wants targets activated.
    Attacker,
}

impl Role {
    pub const fn all() -> [Self; 2] {
        [Self::Defender, Self::Attacker]
    }
    pub const fn opponent(&self) -> Self {
        match self {
            Self::Defender => Self::Attacker,
            Self::Attacker => Self::Defender,
        }
    }
    /// Short tag used in artifact file names.
    pub const fn short(&self) -> &'static str {
        match self {
            Self::Defender => "def",
            Self::Attacker => "att",
        }
    }
    pub const fn index(&self) -> usize {
        match self {
            Self::Defender => 0,
            Self::Attacker => 1,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Defender => write!(f, "defender"),
            Self::Attacker => write!(f, "attacker"),
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = crate::Error;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "defender" | "def" => Ok(Self::Defender),
            "attacker" | "att" => Ok(Self::Attacker),
            _ => Err(crate::Error::InvalidStrategy(format!("unknown role {}", s))),
        }
    }
}

/// A value held once per role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerRole<T> {
    pub defender: T,
    pub attacker: T,
}

impl<T> PerRole<T> {
    pub fn new(defender: T, attacker: T) -> Self {
        Self { defender, attacker }
    }
    pub fn get(&self, role: Role) -> &T {
        match role {
            Role::Defender => &self.defender,
            Role::Attacker => &self.attacker,
        }
    }
    pub fn get_mut(&mut self, role: Role) -> &mut T {
        match role {
            Role::Defender => &mut self.defender,
            Role::Attacker => &mut self.attacker,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn involution() {
        for role in Role::all() {
            assert_eq!(role.opponent().opponent(), role);
            assert_ne!(role.opponent(), role);
        }
    }

    #[test]
    fn parsing() {
        assert_eq!(Role::try_from("defender").unwrap(), Role::Defender);
        assert_eq!(Role::try_from("att").unwrap(), Role::Attacker);
        assert!(Role::try_from("referee").is_err());
    }

    #[test]
    fn lookup() {
        let mut pair = PerRole::new(1, 2);
        *pair.get_mut(Role::Attacker) += 10;
        assert_eq!(*pair.get(Role::Defender), 1);
        assert_eq!(*pair.get(Role::Attacker), 12);
    }
}
