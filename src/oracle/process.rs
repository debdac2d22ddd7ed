use super::*;
use crate::strategy::*;
use crate::*;
use serde::Deserialize;
use serde::Serialize;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncWriteExt;
use tokio::io::BufReader;
use tokio::io::Lines;
use tokio::process::Child;
use tokio::process::ChildStdin;
use tokio::process::ChildStdout;
use tokio::process::Command;

/// How to launch the simulator and how long to wait on it.
#[derive(Debug, Clone)]
pub struct Launch {
    pub program: String,
    pub args: Vec<String>,
    /// Dependency-graph file handed to the simulator as its last argument.
    pub graph: PathBuf,
    pub lock: PathBuf,
    /// Time the process is given to come up.
    pub grace: Duration,
    /// Deadline for a single episode round trip.
    pub timeout: Duration,
    /// How long to wait for someone else's port lock.
    pub patience: Duration,
}

#[derive(Serialize)]
struct Request<'a> {
    defender: &'a Concrete,
    attacker: &'a Concrete,
}

#[derive(Deserialize)]
struct Response {
    defender: Utility,
    attacker: Utility,
}

/// A live simulator child process speaking newline-delimited JSON.
///
/// The child is killed when the handle is dropped or restarted, so at most
/// one simulator exists per handle.
pub struct ProcessSimulator {
    launch: Launch,
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
}

impl ProcessSimulator {
    pub async fn spawn(launch: Launch) -> Result<Self> {
        let (child, stdin, stdout) = Self::start(&launch).await?;
        Ok(Self {
            launch,
            child,
            stdin,
            stdout,
        })
    }

    async fn start(launch: &Launch) -> Result<(Child, ChildStdin, Lines<BufReader<ChildStdout>>)> {
        let guard = PortLock::new(&launch.lock).acquire(launch.patience).await?;
        log::info!(
            "launching simulator {} on {}",
            launch.program,
            launch.graph.display()
        );
        let mut child = Command::new(&launch.program)
            .args(&launch.args)
            .arg(&launch.graph)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::SimulatorUnavailable(format!("{}: {}", launch.program, e)))?;
        tokio::time::sleep(launch.grace).await;
        if let Some(status) = child
            .try_wait()
            .map_err(|e| Error::SimulatorUnavailable(e.to_string()))?
        {
            return Err(Error::SimulatorUnavailable(format!(
                "simulator exited during startup with {}",
                status
            )));
        }
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::SimulatorUnavailable(String::from("no stdin pipe")))?;
        let stdout = child
            .stdout
            .take()
            .map(|out| BufReader::new(out).lines())
            .ok_or_else(|| Error::SimulatorUnavailable(String::from("no stdout pipe")))?;
        guard.release()?;
        Ok((child, stdin, stdout))
    }

    async fn exchange(&mut self, line: String) -> Result<String> {
        self.stdin
            .write_all(line.as_bytes())
            .await
            .map_err(|e| Error::SimulatorUnavailable(e.to_string()))?;
        self.stdin
            .flush()
            .await
            .map_err(|e| Error::SimulatorUnavailable(e.to_string()))?;
        self.stdout
            .next_line()
            .await
            .map_err(|e| Error::SimulatorUnavailable(e.to_string()))?
            .ok_or_else(|| Error::SimulatorUnavailable(String::from("simulator closed its output")))
    }
}

#[async_trait::async_trait]
impl Simulator for ProcessSimulator {
    async fn episode(&mut self, defender: &Concrete, attacker: &Concrete) -> Result<(Utility, Utility)> {
        let line = serde_json::to_string(&Request { defender, attacker })? + "\n";
        let timeout = self.launch.timeout;
        let reply = tokio::time::timeout(timeout, self.exchange(line))
            .await
            .map_err(|_| Error::Timeout(format!("no episode result within {:.1}s", timeout.as_secs_f64())))??;
        let response = serde_json::from_str::<Response>(&reply)
            .map_err(|e| Error::SimulatorUnavailable(format!("malformed reply {:?}: {}", reply, e)))?;
        Ok((response.defender, response.attacker))
    }

    async fn restart(&mut self) -> Result<()> {
        log::warn!("restarting simulator {}", self.launch.program);
        if let Err(e) = self.child.kill().await {
            log::debug!("simulator already gone: {}", e);
        }
        let (child, stdin, stdout) = Self::start(&self.launch).await?;
        self.child = child;
        self.stdin = stdin;
        self.stdout = stdout;
        Ok(())
    }
}
