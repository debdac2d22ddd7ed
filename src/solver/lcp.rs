use super::*;
use crate::game::*;
use crate::*;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Computes a mixed equilibrium of a snapshot.
#[async_trait::async_trait]
pub trait Solve: Send {
    async fn solve(&mut self, snapshot: &Snapshot) -> Result<Equilibrium>;
}

/// The external LCP solver, fed strategic-form text on stdin.
///
/// One process per solve. It is killed if it outlives `timeout`.
#[derive(Debug, Clone)]
pub struct LcpSolver {
    program: String,
    args: Vec<String>,
    precision: usize,
    timeout: Duration,
}

impl LcpSolver {
    pub fn new(program: &str, args: &[String], timeout: Duration) -> Self {
        Self {
            program: program.to_string(),
            args: args.to_vec(),
            precision: SOLVER_PRECISION,
            timeout,
        }
    }
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    async fn run(&self, input: String) -> Result<String> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg("-d")
            .arg(self.precision.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::SolverUnavailable(format!("{}: {}", self.program, e)))?;
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::SolverUnavailable(String::from("no stdin pipe")))?;
        stdin
            .write_all(input.as_bytes())
            .await
            .map_err(|e| Error::SolverUnavailable(e.to_string()))?;
        drop(stdin);
        let output = child
            .wait_with_output()
            .await
            .map_err(|e| Error::SolverUnavailable(e.to_string()))?;
        if !output.status.success() {
            return Err(Error::SolverUnavailable(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait::async_trait]
impl Solve for LcpSolver {
    async fn solve(&mut self, snapshot: &Snapshot) -> Result<Equilibrium> {
        let (rows, cols) = snapshot.shape();
        log::debug!("solving {}x{} game v{}", rows, cols, snapshot.version());
        let output = tokio::time::timeout(self.timeout, self.run(nfg(snapshot)))
            .await
            .map_err(|_| {
                Error::NoEquilibrium(format!(
                    "{} produced nothing within {:.1}s",
                    self.program,
                    self.timeout.as_secs_f64()
                ))
            })??;
        log::debug!("solver output:\n{}", output.trim_end());
        decode(&output, snapshot)
    }
}
