//! Strategy Expansion Binary
//!
//! Runs the double-oracle loop against the external simulator, RL trainer
//! and LCP solver named in the configuration.
//!
//! Options: --config, --out, --seed, --max-epochs, --deadline

use clap::Parser;
use depgame::artifacts::*;
use depgame::expansion::*;
use depgame::oracle::*;
use depgame::solver::*;
use depgame::trainer::*;
use depgame::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Expand defender and attacker strategy sets until no beneficial deviation remains", long_about = None)]
struct Args {
    /// JSON configuration; every key is optional.
    #[arg(long, short)]
    config: Option<PathBuf>,
    /// Output directory for equilibria, payoffs, policies and state.
    #[arg(long, short)]
    out: Option<PathBuf>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    max_epochs: Option<usize>,
    /// Wall-clock budget such as "90m" or "12h".
    #[arg(long)]
    deadline: Option<String>,
}

impl Args {
    fn config(&self) -> anyhow::Result<Config> {
        let mut config = match self.config {
            Some(ref path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(ref out) = self.out {
            config.out_dir = out.clone();
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(max_epochs) = self.max_epochs {
            config.max_epochs = max_epochs;
        }
        if let Some(ref deadline) = self.deadline {
            let duration = parse_duration(deadline)
                .ok_or_else(|| anyhow::anyhow!("unreadable deadline {:?}", deadline))?;
            config.deadline_secs = Some(duration.as_secs());
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    log();
    kys();
    brb();
    let config = Args::parse().config()?;
    let simulator = ProcessSimulator::spawn(config.launch()?).await?;
    let trainer = ExternalTrainer::new(
        &config.trainer.program,
        &config.trainer.args,
        Artifacts::new(config.out_dir.clone(), &config.env_short).policies(),
        config.trainer_timeout()?,
    )
    .with_suffix(&config.trainer.suffix)
    .with_overwrite(config.overwrite);
    let solver = LcpSolver::new(
        &config.solver.program,
        &config.solver.args,
        config.solver_timeout()?,
    )
    .with_precision(config.solver_precision);
    let summary = Expansion::new(config, simulator, trainer, solver)?
        .run()
        .await?;
    summary.to_string().lines().for_each(|line| log::info!("{}", line));
    Ok(())
}
