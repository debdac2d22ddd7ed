use crate::oracle::*;
use crate::search::*;
use crate::strategy::*;
use crate::trainer::*;
use crate::*;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

/// Per-call deadlines, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// One simulator episode round trip.
    pub simulator: f64,
    /// One best-response training run.
    pub trainer: f64,
    /// One equilibrium computation.
    pub solver: f64,
    /// Simulator startup grace period.
    pub startup: f64,
    /// Waiting on someone else's port lock.
    pub lock: f64,
}

impl Timeouts {
    fn seconds(secs: f64) -> Result<Duration> {
        Duration::try_from_secs_f64(secs).map_err(|e| Error::Config(format!("timeout of {}s: {}", secs, e)))
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            simulator: 60.,
            trainer: 6. * 3600.,
            solver: 600.,
            startup: SIMULATOR_GRACE,
            lock: 600.,
        }
    }
}

/// An external program and its leading arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Program {
    fn named(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// The dependency-graph simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub program: String,
    pub args: Vec<String>,
    /// Dependency-graph file passed as the last argument.
    pub graph: PathBuf,
    pub lock: PathBuf,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            program: String::from("depgame-sim"),
            args: Vec::new(),
            graph: PathBuf::from("graphs/random_30.json"),
            lock: PathBuf::from("port_lock.txt"),
        }
    }
}

/// The RL trainer and the file suffix of the artifacts it writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub program: String,
    pub args: Vec<String>,
    pub suffix: String,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            program: String::from("depgame-train"),
            args: Vec::new(),
            suffix: String::from("pkl"),
        }
    }
}

/// The heuristic each role starts from. Its family is also the family
/// probed for beneficial deviations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seed {
    pub name: String,
    pub family: String,
    pub params: Params,
}

/// Everything a run needs. Every key has a default, so a partial JSON
/// object is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Short environment tag prefixed to every artifact name.
    pub env_short: String,
    pub out_dir: PathBuf,
    pub seed: u64,
    pub max_epochs: Epoch,
    /// Wall-clock budget for the whole run.
    pub deadline_secs: Option<u64>,
    /// Replace artifacts left by an earlier run with the same names.
    pub overwrite: bool,

    pub samples_per_payoff_cell: usize,
    pub samples_per_anneal_eval: usize,
    /// Fresh samples when re-scoring an annealed deviation.
    pub samples_per_ground_truth: usize,
    pub max_steps: usize,
    pub neighbor_variance: f64,
    pub max_temp: f64,
    pub anneal_ground_truth_max: usize,
    pub anneal_ground_truth_min: usize,
    pub early_stop_fraction: Probability,
    pub epsilon_tolerance: Utility,

    pub timeouts: Timeouts,
    pub simulator: SimulatorConfig,
    pub trainer: TrainerConfig,
    pub solver: Program,
    /// Decimal places the solver prints weights with.
    pub solver_precision: usize,
    pub training: Hyperparameters,
    /// Replacement training parameters from a given epoch onward.
    pub training_overrides: BTreeMap<Epoch, Hyperparameters>,
    pub families: Vec<Family>,
    pub seeds: PerRole<Seed>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            env_short: String::from("dg"),
            out_dir: PathBuf::from("runs"),
            seed: 0,
            max_epochs: 20,
            deadline_secs: None,
            overwrite: false,
            samples_per_payoff_cell: 200,
            samples_per_anneal_eval: 20,
            samples_per_ground_truth: 200,
            max_steps: 100,
            neighbor_variance: 0.05,
            max_temp: 1.,
            anneal_ground_truth_max: 10,
            anneal_ground_truth_min: 5,
            early_stop_fraction: 0.05,
            epsilon_tolerance: 0.05,
            timeouts: Timeouts::default(),
            simulator: SimulatorConfig::default(),
            trainer: TrainerConfig::default(),
            solver: Program::named("gambit-lcp", &["-q"]),
            solver_precision: SOLVER_PRECISION,
            training: Hyperparameters::default(),
            training_overrides: BTreeMap::new(),
            families: vec![
                Family::defender_random_walk(),
                Family::defender_min_cut(),
                Family::attacker_random_walk(),
            ],
            seeds: PerRole::new(
                Seed {
                    name: String::from("def_seed"),
                    family: String::from("def_random_walk"),
                    params: Params::clipped(vec![0.5; 3]),
                },
                Seed {
                    name: String::from("att_seed"),
                    family: String::from("att_random_walk"),
                    params: Params::clipped(vec![0.5; 3]),
                },
            ),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }
    pub fn from_json(text: &str) -> Result<Self> {
        let config = serde_json::from_str::<Self>(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let fail = |s: &str| Err(Error::Config(s.to_string()));
        if self.env_short.is_empty() || self.env_short.contains(['/', '\\', '\t']) {
            return fail("env_short must be a plain non-empty tag");
        }
        if self.samples_per_payoff_cell == 0 || self.samples_per_anneal_eval == 0 || self.samples_per_ground_truth == 0 {
            return fail("sample counts must be > 0");
        }
        if self.anneal_ground_truth_min == 0 {
            return fail("anneal_ground_truth_min must be >= 1");
        }
        if self.anneal_ground_truth_min > self.anneal_ground_truth_max {
            return fail("anneal_ground_truth_min must not exceed anneal_ground_truth_max");
        }
        if !(self.early_stop_fraction > 0. && self.early_stop_fraction <= 1.) {
            return fail("early_stop_fraction must lie in (0, 1]");
        }
        if !(self.neighbor_variance.is_finite() && self.neighbor_variance > 0.) {
            return fail("neighbor_variance must be > 0");
        }
        if !(self.max_temp.is_finite() && self.max_temp >= 0.) {
            return fail("max_temp must be >= 0");
        }
        if !(self.epsilon_tolerance.is_finite() && self.epsilon_tolerance >= 0.) {
            return fail("epsilon_tolerance must be >= 0");
        }
        let t = &self.timeouts;
        for secs in [t.simulator, t.trainer, t.solver, t.startup, t.lock] {
            Timeouts::seconds(secs)?;
        }
        if self.solver_precision == 0 {
            return fail("solver_precision must be >= 1");
        }
        self.training.validate()?;
        for hyperparameters in self.training_overrides.values() {
            hyperparameters.validate()?;
        }
        for family in self.families.iter() {
            family.validate()?;
        }
        for role in Role::all() {
            let seed = self.seeds.get(role);
            let family = self.family(&seed.family)?;
            if family.role != role {
                return Err(Error::Config(format!("{} seed uses {} family {}", role, family.role, family.name)));
            }
            if family.arity() != seed.params.len() {
                return Err(Error::Config(format!(
                    "{} seed has {} parameters, {} takes {}",
                    role,
                    seed.params.len(),
                    family.name,
                    family.arity()
                )));
            }
        }
        if self.seeds.defender.name == self.seeds.attacker.name {
            return fail("seed strategies need distinct names");
        }
        Ok(())
    }

    pub fn family(&self, name: &str) -> Result<&Family> {
        self.families
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| Error::Config(format!("unknown family {}", name)))
    }

    /// Training parameters in force for `epoch`: the latest override at
    /// or before it, else the base set.
    pub fn hyperparameters(&self, epoch: Epoch) -> &Hyperparameters {
        self.training_overrides
            .range(..=epoch)
            .next_back()
            .map(|(_, h)| h)
            .unwrap_or(&self.training)
    }

    pub fn launch(&self) -> Result<Launch> {
        Ok(Launch {
            program: self.simulator.program.clone(),
            args: self.simulator.args.clone(),
            graph: self.simulator.graph.clone(),
            lock: self.simulator.lock.clone(),
            grace: Timeouts::seconds(self.timeouts.startup)?,
            timeout: Timeouts::seconds(self.timeouts.simulator)?,
            patience: Timeouts::seconds(self.timeouts.lock)?,
        })
    }
    pub fn trainer_timeout(&self) -> Result<Duration> {
        Timeouts::seconds(self.timeouts.trainer)
    }
    pub fn solver_timeout(&self) -> Result<Duration> {
        Timeouts::seconds(self.timeouts.solver)
    }

    /// Annealer searching `role`'s probe family.
    pub fn annealer(&self, role: Role) -> Result<Annealer> {
        Ok(Annealer {
            count: self.family(&self.seeds.get(role).family)?.arity(),
            steps: self.max_steps,
            temperature: self.max_temp,
            samples: self.samples_per_anneal_eval,
            variance: self.neighbor_variance,
        })
    }

    pub fn prober(&self) -> Prober {
        Prober {
            min: self.anneal_ground_truth_min,
            max: self.anneal_ground_truth_max,
            early_stop: self.early_stop_fraction,
            epsilon: self.epsilon_tolerance,
            samples: self.samples_per_ground_truth,
        }
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        Config::default().validate().unwrap();
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial() {
        let config = Config::from_json(
            r#"{
                "max_epochs": 3,
                "early_stop_fraction": 0.1,
                "timeouts": { "solver": 5 },
                "simulator": { "program": "python3", "args": ["sim.py"] },
                "training_overrides": { "2": { "learning_rate": 0.001 } }
            }"#,
        )
        .unwrap();
        assert_eq!(config.max_epochs, 3);
        assert_eq!(config.timeouts.solver, 5.);
        assert_eq!(config.timeouts.simulator, 60.);
        assert_eq!(config.simulator.program, "python3");
        assert_eq!(config.simulator.lock, PathBuf::from("port_lock.txt"));
        assert_eq!(config.hyperparameters(1).learning_rate, 5e-5);
        assert_eq!(config.hyperparameters(2).learning_rate, 0.001);
        assert_eq!(config.hyperparameters(7).learning_rate, 0.001);
        assert_eq!(config.launch().unwrap().timeout, Duration::from_secs(60));
        assert_eq!(config.solver_precision, SOLVER_PRECISION);
    }

    #[test]
    fn ground_truth() {
        let config = Config {
            anneal_ground_truth_min: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
        let config = Config {
            anneal_ground_truth_min: 6,
            anneal_ground_truth_max: 5,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn seeds() {
        let mut config = Config::default();
        config.seeds.attacker.family = String::from("def_min_cut");
        assert!(config.validate().is_err());
        let mut config = Config::default();
        config.seeds.defender.params = Params::clipped(vec![0.5]);
        assert!(config.validate().is_err());
        let mut config = Config::default();
        config.seeds.defender.family = String::from("ghost");
        assert!(config.validate().is_err());
    }

    #[test]
    fn timeouts() {
        let mut config = Config::default();
        config.timeouts.trainer = 1e30;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
        assert!(matches!(config.trainer_timeout(), Err(Error::Config(_))));
        let mut config = Config::default();
        config.timeouts.simulator = -1.;
        assert!(config.validate().is_err());
        assert!(config.launch().is_err());
        assert!(Config::from_json(r#"{"timeouts": {"solver": 1e300}}"#).is_err());
        assert!(Config::from_json(r#"{"solver_precision": 0}"#).is_err());
        let config = Config::from_json(r#"{"solver_precision": 12}"#).unwrap();
        assert_eq!(config.solver_timeout().unwrap(), Duration::from_secs(600));
        assert_eq!(config.solver_precision, 12);
    }

    #[test]
    fn garbage() {
        assert!(matches!(Config::from_json("{\"max_epochs\": -1}"), Err(Error::Config(_))));
        assert!(Config::from_json("not json").is_err());
    }

    #[test]
    fn search() {
        let config = Config::default();
        let annealer = config.annealer(Role::Attacker).unwrap();
        assert_eq!(annealer.count, 3);
        assert_eq!(annealer.samples, 20);
        let prober = config.prober();
        assert_eq!((prober.min, prober.max), (5, 10));
    }
}
