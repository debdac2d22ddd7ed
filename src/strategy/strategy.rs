use super::*;
use serde::Deserialize;
use serde::Serialize;

/// Any strategy a role can play, identified by name in a [`Catalog`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Strategy {
    /// A simulator-side heuristic with a point in its family's unit box.
    Heuristic { family: String, params: Params },
    /// A persisted policy artifact, scoped so several can share one process.
    Trained { artifact: String, scope: String },
    /// A distribution over other named strategies, sampled once per episode.
    Mixture(Mixture),
}

impl Strategy {
    pub fn heuristic(family: &str, params: Params) -> Self {
        Self::Heuristic {
            family: family.to_string(),
            params,
        }
    }
    pub fn trained(artifact: &str, scope: &str) -> Self {
        Self::Trained {
            artifact: artifact.to_string(),
            scope: scope.to_string(),
        }
    }
}

/// What the simulator actually plays for one episode.
///
/// Heuristic parameters are in native simulator units here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Concrete {
    Heuristic { family: String, params: Vec<f64> },
    Trained { artifact: String, scope: String },
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Heuristic { family, params } => write!(f, "{}{}", family, params),
            Self::Trained { artifact, scope } => write!(f, "{}@{}", scope, artifact),
            Self::Mixture(mixture) => write!(f, "{{{}}}", mixture),
        }
    }
}

impl std::fmt::Display for Concrete {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Heuristic { family, params } => write!(f, "{}{:?}", family, params),
            Self::Trained { artifact, scope } => write!(f, "{}@{}", scope, artifact),
        }
    }
}
