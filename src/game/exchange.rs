use super::*;
use crate::strategy::*;
use crate::*;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeSet;

/// Payoff-table exchange document.
///
/// One profile per (defender, attacker) pair, each with exactly two
/// symmetry groups, one per role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoffFile {
    pub roles: Vec<RoleEntry>,
    pub profiles: Vec<ProfileEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleEntry {
    pub name: Role,
    pub count: usize,
    pub strategies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileEntry {
    pub id: usize,
    pub observations_count: usize,
    pub symmetry_groups: Vec<SymmetryGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymmetryGroup {
    pub role: Role,
    pub strategy: String,
    pub count: usize,
    pub id: usize,
    pub payoff: Utility,
}

impl From<&EmpiricalGame> for PayoffFile {
    fn from(game: &EmpiricalGame) -> Self {
        let defenders = game.strategies(Role::Defender);
        let attackers = game.strategies(Role::Attacker);
        let group = |role: Role, name: &str, payoff: Utility| SymmetryGroup {
            role,
            strategy: name.to_string(),
            count: 1,
            id: match role {
                Role::Defender => game.index(role, name).unwrap_or_default(),
                Role::Attacker => defenders.len() + game.index(role, name).unwrap_or_default(),
            },
            payoff,
        };
        let profiles = game
            .cells()
            .enumerate()
            .map(|(id, ((d, a), cell))| ProfileEntry {
                id,
                observations_count: cell.count,
                symmetry_groups: vec![
                    group(Role::Defender, d, cell.defender),
                    group(Role::Attacker, a, cell.attacker),
                ],
            })
            .collect();
        Self {
            roles: vec![
                RoleEntry {
                    name: Role::Defender,
                    count: 1,
                    strategies: defenders.to_vec(),
                },
                RoleEntry {
                    name: Role::Attacker,
                    count: 1,
                    strategies: attackers.to_vec(),
                },
            ],
            profiles,
        }
    }
}

impl TryFrom<PayoffFile> for EmpiricalGame {
    type Error = Error;
    fn try_from(file: PayoffFile) -> Result<Self> {
        let mut game = EmpiricalGame::new();
        for role in Role::all() {
            let entry = file
                .roles
                .iter()
                .find(|r| r.name == role)
                .ok_or_else(|| Error::InvariantViolation(format!("no {} role", role)))?;
            for name in entry.strategies.iter() {
                if game.index(role, name).is_some() {
                    return Err(Error::InvariantViolation(format!("duplicate {} strategy {}", role, name)));
                }
                game.add_strategy(role, name);
            }
        }
        let mut seen = BTreeSet::new();
        for profile in file.profiles {
            let [d, a] = match profile.symmetry_groups.as_slice() {
                [x, y] if x.role == Role::Defender && y.role == Role::Attacker => [x, y],
                [x, y] if x.role == Role::Attacker && y.role == Role::Defender => [y, x],
                _ => {
                    return Err(Error::InvariantViolation(format!(
                        "profile {} needs one symmetry group per role",
                        profile.id
                    )));
                }
            };
            if !seen.insert((d.strategy.clone(), a.strategy.clone())) {
                return Err(Error::InvariantViolation(format!(
                    "second profile for {} vs {}",
                    d.strategy, a.strategy
                )));
            }
            game.record(&d.strategy, &a.strategy, d.payoff, a.payoff, profile.observations_count)?;
        }
        game.validate()?;
        Ok(game)
    }
}

impl EmpiricalGame {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&PayoffFile::from(self))?)
    }
    pub fn from_json(text: &str) -> Result<Self> {
        Self::try_from(serde_json::from_str::<PayoffFile>(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> EmpiricalGame {
        let mut g = EmpiricalGame::new();
        g.add_strategy(Role::Defender, "def_seed");
        g.add_strategy(Role::Defender, "rw_epoch1_def");
        g.add_strategy(Role::Attacker, "att_seed");
        g.record("def_seed", "att_seed", -12.25, 3.1, 50).unwrap();
        g.record("rw_epoch1_def", "att_seed", -4.0 / 3.0, 0.1 + 0.2, 50).unwrap();
        g
    }

    #[test]
    fn roundtrip() {
        let g = game();
        let back = EmpiricalGame::from_json(&g.to_json().unwrap()).unwrap();
        assert_eq!(back, g);
    }

    #[test]
    fn layout() {
        let json = serde_json::to_value(PayoffFile::from(&game())).unwrap();
        assert_eq!(json["roles"][0]["name"], "defender");
        assert_eq!(json["roles"][1]["name"], "attacker");
        assert_eq!(json["roles"][0]["count"], 1);
        assert_eq!(json["profiles"].as_array().unwrap().len(), 2);
        let groups = json["profiles"][0]["symmetry_groups"].as_array().unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0]["role"], "defender");
        assert_eq!(groups[1]["id"], 2);
        assert_eq!(json["profiles"][0]["observations_count"], 50);
    }

    #[test]
    fn duplicates() {
        let mut file = PayoffFile::from(&game());
        let extra = file.profiles[0].clone();
        file.profiles.push(extra);
        assert!(matches!(
            EmpiricalGame::try_from(file),
            Err(Error::InvariantViolation(_))
        ));
    }

    #[test]
    fn incomplete() {
        let mut file = PayoffFile::from(&game());
        file.profiles.pop();
        assert!(EmpiricalGame::try_from(file).is_err());
    }

    #[test]
    fn lopsided() {
        let mut file = PayoffFile::from(&game());
        file.profiles[0].symmetry_groups[1].role = Role::Defender;
        assert!(EmpiricalGame::try_from(file).is_err());
    }
}
