/// Errors that can occur while expanding the strategy sets.
#[derive(Debug)]
pub enum Error {
    /// The game simulator failed to start, crashed, or stopped answering.
    SimulatorUnavailable(String),
    /// The external RL trainer failed or produced no artifact.
    TrainerUnavailable(String),
    /// The LCP solver could not be launched or exited abnormally.
    SolverUnavailable(String),
    /// The solver reported no equilibrium within its deadline.
    NoEquilibrium(String),
    /// The solver output did not match the expected encoding.
    SolverFormat(String),
    InvalidStrategy(String),
    InvalidMixture(String),
    InvariantViolation(String),
    Timeout(String),
    DuplicateArtifact(String),
    Config(String),
    Io(std::io::Error),
    Json(serde_json::Error),
    /// Graceful stop or global deadline reached at a safe point.
    Interrupted,
}

impl Error {
    /// Faults the payoff oracle retries per cell.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::SimulatorUnavailable(_) | Self::Timeout(_))
    }
    /// Faults the expansion loop retries once with a fresh handle.
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            Self::SimulatorUnavailable(_) | Self::TrainerUnavailable(_) | Self::SolverUnavailable(_)
        )
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SimulatorUnavailable(s) => write!(f, "simulator unavailable: {}", s),
            Self::TrainerUnavailable(s) => write!(f, "trainer unavailable: {}", s),
            Self::SolverUnavailable(s) => write!(f, "solver unavailable: {}", s),
            Self::NoEquilibrium(s) => write!(f, "no equilibrium: {}", s),
            Self::SolverFormat(s) => write!(f, "solver format error: {}", s),
            Self::InvalidStrategy(s) => write!(f, "invalid strategy: {}", s),
            Self::InvalidMixture(s) => write!(f, "invalid mixture: {}", s),
            Self::InvariantViolation(s) => write!(f, "invariant violation: {}", s),
            Self::Timeout(s) => write!(f, "timeout: {}", s),
            Self::DuplicateArtifact(s) => write!(f, "duplicate artifact: {}", s),
            Self::Config(s) => write!(f, "configuration error: {}", s),
            Self::Io(e) => write!(f, "io error: {}", e),
            Self::Json(e) => write!(f, "json error: {}", e),
            Self::Interrupted => write!(f, "interrupted"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
