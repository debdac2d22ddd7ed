use crate::strategy::*;
use std::path::PathBuf;

/// A trained best response persisted on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct Policy {
    pub name: String,
    pub role: Role,
    pub artifact: PathBuf,
}

impl Policy {
    /// The strategy the simulator loads. The name doubles as the scope tag.
    pub fn strategy(&self) -> Strategy {
        Strategy::trained(&self.artifact.to_string_lossy(), &self.name)
    }
}
