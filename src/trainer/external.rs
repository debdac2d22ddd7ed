use super::*;
use crate::strategy::*;
use crate::*;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Sidecar written next to every artifact.
#[derive(Serialize)]
struct Record<'a> {
    name: &'a str,
    role: Role,
    seed: u64,
    opponent: &'a Mixture,
    hyperparameters: &'a Hyperparameters,
}

/// Runs an external RL trainer command once per best response.
///
/// The command is invoked as
/// `<program> <args..> --role <role> --opponent <tsv> --seed <n> --out <artifact> --params <json>`
/// and must leave a file at `<artifact>` when it exits successfully.
#[derive(Debug, Clone)]
pub struct ExternalTrainer {
    program: String,
    args: Vec<String>,
    dir: PathBuf,
    suffix: String,
    timeout: Duration,
    overwrite: bool,
    hyperparameters: Hyperparameters,
}

impl ExternalTrainer {
    pub fn new(program: &str, args: &[String], dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.to_string(),
            args: args.to_vec(),
            dir: dir.into(),
            suffix: String::from("pkl"),
            timeout,
            overwrite: false,
            hyperparameters: Hyperparameters::default(),
        }
    }
    pub fn with_suffix(mut self, suffix: &str) -> Self {
        self.suffix = suffix.to_string();
        self
    }
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
    pub fn artifact(&self, out: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", out, self.suffix))
    }

    fn sidecars(&self, out: &str, role: Role, opponent: &Mixture, seed: u64) -> Result<(PathBuf, PathBuf)> {
        std::fs::create_dir_all(&self.dir)?;
        let tsv = self.dir.join(format!("{}.opponent.tsv", out));
        let json = self.dir.join(format!("{}.params.json", out));
        std::fs::write(&tsv, opponent.to_tsv())?;
        let record = Record {
            name: out,
            role,
            seed,
            opponent,
            hyperparameters: &self.hyperparameters,
        };
        std::fs::write(&json, serde_json::to_string_pretty(&record)?)?;
        Ok((tsv, json))
    }

    async fn run(&self, role: Role, tsv: &Path, json: &Path, seed: u64, artifact: &Path) -> Result<()> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg("--role")
            .arg(role.to_string())
            .arg("--opponent")
            .arg(tsv)
            .arg("--seed")
            .arg(seed.to_string())
            .arg("--out")
            .arg(artifact)
            .arg("--params")
            .arg(json)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .status();
        match tokio::time::timeout(self.timeout, status).await {
            Err(_) => Err(Error::TrainerUnavailable(format!(
                "no artifact within {:.1}s",
                self.timeout.as_secs_f64()
            ))),
            Ok(Err(e)) => Err(Error::TrainerUnavailable(format!("{}: {}", self.program, e))),
            Ok(Ok(status)) if !status.success() => Err(Error::TrainerUnavailable(format!(
                "{} exited with {}",
                self.program, status
            ))),
            Ok(Ok(_)) => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl Train for ExternalTrainer {
    fn configure(&mut self, hyperparameters: &Hyperparameters) {
        self.hyperparameters = hyperparameters.clone();
    }

    async fn train(&mut self, role: Role, opponent: &Mixture, seed: u64, out: &str) -> Result<Policy> {
        let artifact = self.artifact(out);
        if artifact.exists() && !self.overwrite {
            return Err(Error::DuplicateArtifact(artifact.display().to_string()));
        }
        let (tsv, json) = self.sidecars(out, role, opponent, seed)?;
        log::info!("training {} best response {} against {}", role, out, opponent);
        if let Err(e) = self.run(role, &tsv, &json, seed, &artifact).await {
            if artifact.exists() {
                std::fs::remove_file(&artifact)?;
            }
            return Err(e);
        }
        if !artifact.exists() {
            return Err(Error::TrainerUnavailable(format!(
                "{} finished without writing {}",
                self.program,
                artifact.display()
            )));
        }
        Ok(Policy {
            name: out.to_string(),
            role,
            artifact,
        })
    }
}
