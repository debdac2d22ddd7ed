use super::*;
use crate::artifacts::*;
use crate::game::*;
use crate::oracle::*;
use crate::search::*;
use crate::solver::*;
use crate::strategy::*;
use crate::trainer::*;
use crate::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::time::Instant;

/// The strategy-expansion loop.
///
/// Owns the empirical game and the epoch state outright. The three
/// external collaborators sit behind [`Simulator`], [`Train`] and [`Solve`].
pub struct Expansion<S: Simulator, T: Train, Q: Solve> {
    config: Config,
    artifacts: Artifacts,
    oracle: PayoffOracle<S>,
    trainer: T,
    solver: Q,
    game: EmpiricalGame,
    state: State,
    rng: SmallRng,
    start: Instant,
    deadline: Option<Instant>,
}

impl<S, T, Q> Expansion<S, T, Q>
where
    S: Simulator,
    T: Train,
    Q: Solve,
{
    pub fn new(config: Config, simulator: S, trainer: T, solver: Q) -> Result<Self> {
        config.validate()?;
        let start = Instant::now();
        let deadline = config.deadline().map(|d| start + d);
        let mut catalog = Catalog::new(config.families.iter().cloned());
        for role in Role::all() {
            let seed = config.seeds.get(role);
            catalog.insert(&seed.name, Strategy::heuristic(&seed.family, seed.params.clone()))?;
        }
        let game = EmpiricalGame::new();
        let state = State::initial(
            &game,
            Equilibrium::pure(&config.seeds.defender.name, &config.seeds.attacker.name, 0),
        );
        Ok(Self {
            artifacts: Artifacts::new(config.out_dir.clone(), &config.env_short),
            oracle: PayoffOracle::new(simulator, catalog, config.seed).with_deadline(deadline),
            rng: SmallRng::seed_from_u64(config.seed.wrapping_add(1)),
            config,
            trainer,
            solver,
            game,
            state,
            start,
            deadline,
        })
    }

    pub fn game(&self) -> &EmpiricalGame {
        &self.game
    }
    pub fn state(&self) -> &State {
        &self.state
    }
    pub fn oracle(&self) -> &PayoffOracle<S> {
        &self.oracle
    }
    pub fn artifacts(&self) -> &Artifacts {
        &self.artifacts
    }
    pub fn trainer(&self) -> &T {
        &self.trainer
    }
    pub fn solver(&self) -> &Q {
        &self.solver
    }

    /// Run until convergence, `max_epochs`, or an interrupt.
    ///
    /// A graceful stop still yields a summary. Any other failure writes
    /// the final state before it is returned.
    pub async fn run(&mut self) -> Result<Summary> {
        match self.expand().await {
            Ok(termination) => {
                self.state = self.state.at(self.state.epoch, Phase::Done);
                self.checkpoint(None)?;
                log::info!("{} after epoch {}", termination, self.state.epoch);
                Ok(self.summary(termination))
            }
            Err(Error::Interrupted) => {
                log::warn!(
                    "interrupted at epoch {} during {}",
                    self.state.epoch,
                    self.state.phase
                );
                self.checkpoint(Some(Error::Interrupted.to_string()))?;
                Ok(self.summary(Termination::Interrupted))
            }
            Err(e) => {
                log::error!(
                    "halting at epoch {} during {}: {}",
                    self.state.epoch,
                    self.state.phase,
                    e
                );
                if let Err(w) = self.checkpoint(Some(e.to_string())) {
                    log::error!("final state not written: {}", w);
                }
                Err(e)
            }
        }
    }

    async fn expand(&mut self) -> Result<Termination> {
        self.init().await?;
        for epoch in 1..=self.config.max_epochs {
            if self.expired() {
                return Err(Error::Interrupted);
            }
            let fresh = self.train(epoch).await?;
            self.fill(epoch, &fresh).await?;
            let snapshot = self.solve(epoch).await?;
            self.probe(epoch, &snapshot).await?;
            self.checkpoint(None)?;
            let threshold = self.config.early_stop_fraction;
            if self.state.latest().is_some_and(|round| round.converged(threshold)) {
                return Ok(Termination::Converged);
            }
        }
        Ok(Termination::MaxEpochs)
    }

    /// Seed heuristics, their 1x1 cell, and the trivial pure equilibrium.
    async fn init(&mut self) -> Result<()> {
        self.transition(0, Phase::Init);
        let defender = self.config.seeds.defender.name.clone();
        let attacker = self.config.seeds.attacker.name.clone();
        self.game.add_strategy(Role::Defender, &defender);
        self.game.add_strategy(Role::Attacker, &attacker);
        self.complete(Role::Defender, &defender).await?;
        let equilibrium = Equilibrium::pure(&defender, &attacker, self.game.version());
        self.artifacts.save_equilibrium(0, &equilibrium)?;
        self.state = State::initial(&self.game, equilibrium);
        Ok(())
    }

    /// One best response per role against the opponent's current mixture.
    async fn train(&mut self, epoch: Epoch) -> Result<Vec<(Role, String)>> {
        self.transition(epoch, Phase::Train);
        self.trainer.configure(self.config.hyperparameters(epoch));
        let mut fresh = Vec::new();
        for role in Role::all() {
            let name = self.artifacts.policy(epoch, role);
            let opponent = self.state.equilibrium.mixture(role.opponent()).clone();
            let seed = self.config.seed.wrapping_add((2 * epoch + role.index()) as u64);
            let mut attempt = 0;
            let policy = loop {
                match self.trainer.train(role, &opponent, seed, &name).await {
                    Err(e) if e.is_external() && attempt < EXTERNAL_RETRIES => {
                        attempt += 1;
                        log::warn!("{} (retry {}/{})", e, attempt, EXTERNAL_RETRIES);
                    }
                    result => break result?,
                }
            };
            if policy.role != role || self.game.index(role, &policy.name).is_some() {
                return Err(Error::InvariantViolation(format!(
                    "trainer returned {} {} for a new {}",
                    policy.role, policy.name, role
                )));
            }
            self.oracle.catalog_mut().insert(&policy.name, policy.strategy())?;
            self.game.add_strategy(role, &policy.name);
            log::info!("epoch {:>3} │ {} │ trained {}", epoch, role, policy.name);
            fresh.push((role, policy.name));
        }
        self.state = self.state.grown(&self.game);
        Ok(fresh)
    }

    async fn fill(&mut self, epoch: Epoch, fresh: &[(Role, String)]) -> Result<()> {
        self.transition(epoch, Phase::Fill);
        for (role, name) in fresh {
            self.complete(*role, name).await?;
            log::info!(
                "epoch {:>3} │ {} │ {} cells for {}",
                epoch,
                role,
                self.game.strategies(role.opponent()).len(),
                name
            );
        }
        Ok(())
    }

    /// Fill a strategy's row or column, once more on a fresh simulator
    /// when the oracle's own retries run out. Cells already filled stay.
    async fn complete(&mut self, role: Role, name: &str) -> Result<()> {
        let n = self.config.samples_per_payoff_cell;
        let mut attempt = 0;
        loop {
            let result = match role {
                Role::Defender => self.game.complete_rows(name, &mut self.oracle, n).await,
                Role::Attacker => self.game.complete_cols(name, &mut self.oracle, n).await,
            };
            match result {
                Err(e) if e.is_external() && attempt < EXTERNAL_RETRIES => {
                    attempt += 1;
                    log::warn!("{} (fresh simulator, retry {}/{})", e, attempt, EXTERNAL_RETRIES);
                    self.oracle.restart().await?;
                }
                result => return result.map(|_| ()),
            }
        }
    }

    async fn solve(&mut self, epoch: Epoch) -> Result<Snapshot> {
        self.transition(epoch, Phase::Solve);
        let snapshot = self.game.snapshot()?;
        let mut attempt = 0;
        let equilibrium = loop {
            match self.solver.solve(&snapshot).await {
                Err(e) if e.is_external() && attempt < EXTERNAL_RETRIES => {
                    attempt += 1;
                    log::warn!("{} (retry {}/{})", e, attempt, EXTERNAL_RETRIES);
                }
                result => break result?,
            }
        };
        equilibrium.validate(&snapshot)?;
        if equilibrium.version != snapshot.version() {
            return Err(Error::InvariantViolation(format!(
                "equilibrium solved on v{}, table is v{}",
                equilibrium.version,
                snapshot.version()
            )));
        }
        self.artifacts.save_equilibrium(epoch, &equilibrium)?;
        self.artifacts.save_payoffs(epoch, &self.game)?;
        log::info!("epoch {:>3} │ defender │ {}", epoch, equilibrium.defender);
        log::info!("epoch {:>3} │ attacker │ {}", epoch, equilibrium.attacker);
        self.state = self.state.solved(equilibrium);
        Ok(snapshot)
    }

    async fn probe(&mut self, epoch: Epoch, snapshot: &Snapshot) -> Result<()> {
        self.transition(epoch, Phase::Probe);
        let equilibrium = self.state.equilibrium.clone();
        let baseline = snapshot.expected(&equilibrium)?;
        let round = PerRole::new(
            self.deviation(epoch, Role::Defender, &equilibrium, baseline.defender)
                .await?,
            self.deviation(epoch, Role::Attacker, &equilibrium, baseline.attacker)
                .await?,
        );
        self.state = self.state.probed(round);
        Ok(())
    }

    /// Search one role's heuristic family for deviations that beat its
    /// payoff under the equilibrium. The whole search reruns on a fresh
    /// simulator when the oracle's own retries run out.
    async fn deviation(
        &mut self,
        epoch: Epoch,
        role: Role,
        equilibrium: &Equilibrium,
        baseline: Utility,
    ) -> Result<Probe> {
        let prober = self.config.prober();
        let annealer = self.config.annealer(role)?;
        let family = self.config.seeds.get(role).family.clone();
        let mut attempt = 0;
        let probe = loop {
            let result = {
                let ref mut scorer = OracleScorer::new(&mut self.oracle, role, &family)?;
                prober
                    .probe(
                        &annealer,
                        scorer,
                        equilibrium.mixture(role.opponent()),
                        baseline,
                        &mut self.rng,
                    )
                    .await
            };
            match result {
                Err(e) if e.is_external() && attempt < EXTERNAL_RETRIES => {
                    attempt += 1;
                    log::warn!("{} (fresh simulator, retry {}/{})", e, attempt, EXTERNAL_RETRIES);
                    self.oracle.restart().await?;
                }
                result => break result?,
            }
        };
        log::info!("epoch {:>3} │ {} │ {}", epoch, role, probe);
        Ok(probe)
    }

    fn transition(&mut self, epoch: Epoch, phase: Phase) {
        self.state = self.state.at(epoch, phase);
        log::info!(
            "epoch {:>3} │ {:<5} │ {} def × {} att │ {:>8.1}s",
            epoch,
            phase,
            self.game.strategies(Role::Defender).len(),
            self.game.strategies(Role::Attacker).len(),
            self.start.elapsed().as_secs_f64()
        );
    }

    fn checkpoint(&self, halted: Option<String>) -> Result<()> {
        self.artifacts.save_state(&Checkpoint {
            state: &self.state,
            payoffs: PayoffFile::from(&self.game),
            halted,
        })
    }

    fn summary(&self, termination: Termination) -> Summary {
        Summary {
            epochs: self.state.epoch,
            termination,
            equilibrium: self.state.equilibrium.clone(),
            history: self.state.history.clone(),
            strategies: PerRole::new(
                self.game.strategies(Role::Defender).len(),
                self.game.strategies(Role::Attacker).len(),
            ),
            episodes: self.oracle.episodes(),
            elapsed: self.start.elapsed(),
        }
    }

    fn expired(&self) -> bool {
        crate::interrupted() || self.deadline.map_or(false, |d| Instant::now() >= d)
    }
}
