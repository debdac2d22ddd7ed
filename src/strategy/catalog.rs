use super::*;
use crate::*;
use rand::Rng;
use std::collections::BTreeMap;

/// Every named strategy of a run plus the heuristic families they draw on.
///
/// Names are globally unique: registering a name twice is only allowed
/// when the definition is identical.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    strategies: BTreeMap<String, Strategy>,
    families: BTreeMap<String, Family>,
}

impl Catalog {
    pub fn new(families: impl IntoIterator<Item = Family>) -> Self {
        Self {
            strategies: BTreeMap::new(),
            families: families.into_iter().map(|f| (f.name.clone(), f)).collect(),
        }
    }

    pub fn insert(&mut self, name: &str, strategy: Strategy) -> Result<()> {
        match self.strategies.get(name) {
            Some(existing) if *existing == strategy => Ok(()),
            Some(existing) => Err(Error::InvariantViolation(format!(
                "strategy name {} already bound to {}",
                name, existing
            ))),
            None => {
                self.check(&strategy)?;
                self.strategies.insert(name.to_string(), strategy);
                Ok(())
            }
        }
    }
    pub fn get(&self, name: &str) -> Result<&Strategy> {
        self.strategies
            .get(name)
            .ok_or_else(|| Error::InvalidStrategy(format!("{} is not registered", name)))
    }
    pub fn contains(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }
    pub fn family(&self, name: &str) -> Result<&Family> {
        self.families
            .get(name)
            .ok_or_else(|| Error::InvalidStrategy(format!("unknown heuristic family {}", name)))
    }
    pub fn len(&self) -> usize {
        self.strategies.len()
    }
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Pick the concrete strategy to play for one episode.
    /// Mixtures are sampled, recursively, until a leaf strategy is reached.
    pub fn resolve<R: Rng>(&self, strategy: &Strategy, rng: &mut R) -> Result<Concrete> {
        let mut current = strategy;
        for _ in 0..=MAX_MIXTURE_DEPTH {
            match current {
                Strategy::Heuristic { family, params } => {
                    return Ok(Concrete::Heuristic {
                        family: family.clone(),
                        params: self.family(family)?.native(params)?,
                    });
                }
                Strategy::Trained { artifact, scope } => {
                    return Ok(Concrete::Trained {
                        artifact: artifact.clone(),
                        scope: scope.clone(),
                    });
                }
                Strategy::Mixture(mixture) => current = self.get(mixture.sample(rng))?,
            }
        }
        Err(Error::InvalidStrategy(format!(
            "mixtures nested deeper than {}",
            MAX_MIXTURE_DEPTH
        )))
    }

    fn check(&self, strategy: &Strategy) -> Result<()> {
        match strategy {
            Strategy::Heuristic { family, params } => self.family(family)?.native(params).map(|_| ()),
            Strategy::Trained { .. } => Ok(()),
            Strategy::Mixture(mixture) => mixture
                .support()
                .map(|name| self.get(name).map(|_| ()))
                .collect(),
        }
    }
}
