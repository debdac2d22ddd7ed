use depgame::expansion::*;
use depgame::game::*;
use depgame::oracle::*;
use depgame::solver::*;
use depgame::strategy::*;
use depgame::trainer::*;
use depgame::*;
use std::path::Path;
use std::path::PathBuf;

/// Payoffs from a per-strategy value: defender gets `v(d) - v(a)`, the
/// attacker the negation. Trained policies are worth 1.
struct Table {
    heuristic: fn(&[f64]) -> f64,
    failures: Vec<usize>,
    calls: usize,
    restarts: usize,
}

impl Table {
    fn new(heuristic: fn(&[f64]) -> f64) -> Self {
        Self {
            heuristic,
            failures: Vec::new(),
            calls: 0,
            restarts: 0,
        }
    }
    fn failing(mut self, calls: &[usize]) -> Self {
        self.failures = calls.to_vec();
        self
    }
    fn value(&self, strategy: &Concrete) -> f64 {
        match strategy {
            Concrete::Heuristic { params, .. } => (self.heuristic)(params),
            Concrete::Trained { .. } => 1.,
        }
    }
}

#[async_trait::async_trait]
impl Simulator for Table {
    async fn episode(&mut self, defender: &Concrete, attacker: &Concrete) -> Result<(Utility, Utility)> {
        self.calls += 1;
        if self.failures.contains(&self.calls) {
            return Err(Error::SimulatorUnavailable(String::from("simulator killed")));
        }
        let payoff = self.value(defender) - self.value(attacker);
        Ok((payoff, -payoff))
    }
    async fn restart(&mut self) -> Result<()> {
        self.restarts += 1;
        Ok(())
    }
}

/// Heuristics are worthless next to any trained policy.
fn flat(_: &[f64]) -> f64 {
    0.
}
/// Heuristic value grows with the discount knob, native range [0.5, 1].
fn steep(params: &[f64]) -> f64 {
    10. * params[2] - 5.
}

/// Names its policy after `out` and fails the first `failures` calls.
struct Stub {
    calls: usize,
    failures: usize,
    configured: Vec<f64>,
}

impl Stub {
    fn new(failures: usize) -> Self {
        Self {
            calls: 0,
            failures,
            configured: Vec::new(),
        }
    }
}

#[async_trait::async_trait]
impl Train for Stub {
    fn configure(&mut self, hyperparameters: &Hyperparameters) {
        self.configured.push(hyperparameters.learning_rate);
    }
    async fn train(&mut self, role: Role, opponent: &Mixture, _seed: u64, out: &str) -> Result<Policy> {
        self.calls += 1;
        assert!(!opponent.is_empty());
        if self.calls <= self.failures {
            return Err(Error::TrainerUnavailable(String::from("trainer crashed")));
        }
        Ok(Policy {
            name: out.to_string(),
            role,
            artifact: PathBuf::from("policies").join(out),
        })
    }
}

/// First pure equilibrium in defender-major order, else uniform play.
struct Pure {
    calls: usize,
    failures: usize,
    silent: bool,
}

impl Pure {
    fn new() -> Self {
        Self {
            calls: 0,
            failures: 0,
            silent: false,
        }
    }
}

#[async_trait::async_trait]
impl Solve for Pure {
    async fn solve(&mut self, s: &Snapshot) -> Result<Equilibrium> {
        self.calls += 1;
        if self.calls <= self.failures {
            return Err(Error::SolverUnavailable(String::from("solver crashed")));
        }
        if self.silent {
            return Err(Error::NoEquilibrium(String::from("nothing within 1s")));
        }
        let (rows, cols) = s.shape();
        for i in 0..rows {
            for j in 0..cols {
                let cell = s.cell(i, j);
                let stable = (0..rows).all(|k| s.cell(k, j).defender <= cell.defender)
                    && (0..cols).all(|k| s.cell(i, k).attacker <= cell.attacker);
                if stable {
                    return Ok(Equilibrium::pure(
                        &s.strategies(Role::Defender)[i],
                        &s.strategies(Role::Attacker)[j],
                        s.version(),
                    ));
                }
            }
        }
        Ok(Equilibrium {
            defender: Mixture::uniform(s.strategies(Role::Defender))?,
            attacker: Mixture::uniform(s.strategies(Role::Attacker))?,
            version: s.version(),
        })
    }
}

fn config(out: &Path, max_epochs: usize) -> Config {
    Config {
        out_dir: out.to_path_buf(),
        max_epochs,
        samples_per_payoff_cell: 2,
        samples_per_anneal_eval: 1,
        samples_per_ground_truth: 1,
        max_steps: 40,
        max_temp: 0.,
        anneal_ground_truth_min: 3,
        anneal_ground_truth_max: 3,
        ..Config::default()
    }
}

#[tokio::test]
async fn one_epoch() {
    let tmp = tempfile::tempdir().unwrap();
    let ref mut expansion = Expansion::new(config(tmp.path(), 1), Table::new(flat), Stub::new(0), Pure::new()).unwrap();
    let summary = expansion.run().await.unwrap();
    let game = expansion.game();
    assert_eq!(game.strategies(Role::Defender), ["def_seed", "dg_epoch1_def"]);
    assert_eq!(game.strategies(Role::Attacker), ["att_seed", "dg_epoch1_att"]);
    assert!(game.complete());
    let eq = &summary.equilibrium;
    assert_eq!(eq.version, game.version());
    for role in Role::all() {
        assert!(eq.mixture(role).within(game.strategies(role)).is_ok());
        assert!(eq.mixture(role).support().count() >= 1);
    }
    assert_eq!(summary.epochs, 1);
    let artifacts = expansion.artifacts();
    assert!(artifacts.equilibrium(0, Role::Defender).exists());
    assert!(artifacts.equilibrium(1, Role::Attacker).exists());
    assert_eq!(&artifacts.load_payoffs(1).unwrap(), game);
    assert!(artifacts.state().exists());
}

#[tokio::test]
async fn convergence() {
    let tmp = tempfile::tempdir().unwrap();
    let ref mut expansion = Expansion::new(config(tmp.path(), 5), Table::new(flat), Stub::new(0), Pure::new()).unwrap();
    let summary = expansion.run().await.unwrap();
    assert_eq!(summary.termination, Termination::Converged);
    assert_eq!(summary.epochs, 1);
    assert_eq!(summary.equilibrium, Equilibrium::pure("dg_epoch1_def", "dg_epoch1_att", expansion.game().version()));
    let round = &summary.history[0];
    assert_eq!(round.probes.defender.fraction(), 0.);
    assert_eq!(round.probes.attacker.fraction(), 0.);
    assert_eq!(round.probes.defender.baseline, 0.);
    assert_eq!(expansion.state().phase, Phase::Done);
}

#[tokio::test]
async fn growth() {
    let tmp = tempfile::tempdir().unwrap();
    let ref mut expansion = Expansion::new(config(tmp.path(), 2), Table::new(steep), Stub::new(0), Pure::new()).unwrap();
    let summary = expansion.run().await.unwrap();
    assert_eq!(summary.termination, Termination::MaxEpochs);
    assert_eq!(summary.history.len(), 2);
    assert_eq!(summary.strategies, PerRole::new(3, 3));
    for round in summary.history.iter() {
        assert!(round.probes.defender.fraction() > 0.);
        assert!((0. ..=1.).contains(&round.probes.attacker.fraction()));
    }
}

#[tokio::test]
async fn restarts() {
    let tmp = tempfile::tempdir().unwrap();
    let simulator = Table::new(flat).failing(&[3, 7]);
    let ref mut expansion = Expansion::new(config(tmp.path(), 1), simulator, Stub::new(0), Pure::new()).unwrap();
    expansion.run().await.unwrap();
    assert_eq!(expansion.oracle().simulator().restarts, 2);
    assert!(expansion.game().complete());
}

#[tokio::test]
async fn outage() {
    let tmp = tempfile::tempdir().unwrap();
    let simulator = Table::new(flat).failing(&[3, 4, 5, 6]);
    let ref mut expansion = Expansion::new(config(tmp.path(), 1), simulator, Stub::new(0), Pure::new()).unwrap();
    expansion.run().await.unwrap();
    assert_eq!(expansion.oracle().simulator().restarts, CELL_RETRIES + 1);
    assert!(expansion.game().complete());
}

#[tokio::test]
async fn deviation_outage() {
    let tmp = tempfile::tempdir().unwrap();
    let simulator = Table::new(flat).failing(&[9, 10, 11, 12]);
    let ref mut expansion = Expansion::new(config(tmp.path(), 1), simulator, Stub::new(0), Pure::new()).unwrap();
    let summary = expansion.run().await.unwrap();
    assert_eq!(expansion.oracle().simulator().restarts, CELL_RETRIES + 1);
    assert_eq!(summary.history.len(), 1);
    assert_eq!(expansion.state().phase, Phase::Done);
}

#[tokio::test]
async fn retraining() {
    let tmp = tempfile::tempdir().unwrap();
    let ref mut expansion = Expansion::new(config(tmp.path(), 1), Table::new(flat), Stub::new(1), Pure::new()).unwrap();
    assert!(expansion.run().await.is_ok());
    let tmp = tempfile::tempdir().unwrap();
    let ref mut expansion = Expansion::new(config(tmp.path(), 1), Table::new(flat), Stub::new(2), Pure::new()).unwrap();
    assert!(matches!(expansion.run().await, Err(Error::TrainerUnavailable(_))));
}

#[tokio::test]
async fn resolving() {
    let tmp = tempfile::tempdir().unwrap();
    let solver = Pure {
        failures: 1,
        ..Pure::new()
    };
    let ref mut expansion = Expansion::new(config(tmp.path(), 1), Table::new(flat), Stub::new(0), solver).unwrap();
    assert!(expansion.run().await.is_ok());
    assert_eq!(expansion.solver().calls, 2);
}

#[tokio::test]
async fn halting() {
    let tmp = tempfile::tempdir().unwrap();
    let solver = Pure {
        silent: true,
        ..Pure::new()
    };
    let ref mut expansion = Expansion::new(config(tmp.path(), 3), Table::new(flat), Stub::new(0), solver).unwrap();
    assert!(matches!(expansion.run().await, Err(Error::NoEquilibrium(_))));
    let state = std::fs::read_to_string(expansion.artifacts().state()).unwrap();
    let state = serde_json::from_str::<serde_json::Value>(&state).unwrap();
    assert_eq!(state["state"]["phase"], "solve");
    assert_eq!(state["state"]["epoch"], 1);
    assert!(state["halted"].as_str().unwrap().contains("no equilibrium"));
    assert_eq!(state["payoffs"]["profiles"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn deadline() {
    let tmp = tempfile::tempdir().unwrap();
    let config = Config {
        deadline_secs: Some(0),
        ..config(tmp.path(), 3)
    };
    let ref mut expansion = Expansion::new(config, Table::new(flat), Stub::new(0), Pure::new()).unwrap();
    let summary = expansion.run().await.unwrap();
    assert_eq!(summary.termination, Termination::Interrupted);
    assert!(expansion.artifacts().state().exists());
}

#[tokio::test]
async fn scheduling() {
    let tmp = tempfile::tempdir().unwrap();
    let mut config = config(tmp.path(), 2);
    config.training_overrides.insert(
        2,
        Hyperparameters {
            learning_rate: 0.5,
            ..Hyperparameters::default()
        },
    );
    let ref mut expansion = Expansion::new(config, Table::new(steep), Stub::new(0), Pure::new()).unwrap();
    expansion.run().await.unwrap();
    assert_eq!(expansion.trainer().configured, vec![5e-5, 0.5]);
    assert_eq!(expansion.solver().calls, 2);
}
