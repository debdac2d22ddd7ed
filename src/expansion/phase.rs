use serde::Deserialize;
use serde::Serialize;

/// Where the loop is within an epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Init,
    Train,
    Fill,
    Solve,
    Probe,
    Done,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Init => f.pad("INIT"),
            Self::Train => f.pad("TRAIN"),
            Self::Fill => f.pad("FILL"),
            Self::Solve => f.pad("SOLVE"),
            Self::Probe => f.pad("PROBE"),
            Self::Done => f.pad("DONE"),
        }
    }
}
