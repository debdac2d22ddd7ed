use crate::*;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;
use std::time::Instant;

/// Two-state lock file guarding reuse of the simulator port.
///
/// The file holds `"1"` while some process is bringing a simulator up on
/// the port and `"0"` once it is free again. A missing file counts as free.
#[derive(Debug, Clone)]
pub struct PortLock {
    path: PathBuf,
}

impl PortLock {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
    pub fn path(&self) -> &Path {
        &self.path
    }
    pub fn held(&self) -> Result<bool> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(text.trim() == "1"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
    /// Wait until the lock reads free, then mark it held.
    pub async fn acquire(&self, patience: Duration) -> Result<LockGuard> {
        let start = Instant::now();
        while self.held()? {
            if start.elapsed() >= patience {
                return Err(Error::Timeout(format!(
                    "port lock {} held for {:.1}s",
                    self.path.display(),
                    start.elapsed().as_secs_f64()
                )));
            }
            tokio::time::sleep(LOCK_POLL).await;
        }
        self.write("1")?;
        log::debug!("acquired port lock {}", self.path.display());
        Ok(LockGuard {
            lock: self.clone(),
            released: false,
        })
    }
    pub fn release(&self) -> Result<()> {
        self.write("0")?;
        log::debug!("released port lock {}", self.path.display());
        Ok(())
    }
    fn write(&self, state: &str) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&self.path, state)?;
        Ok(())
    }
}

/// Holds the port lock until released or dropped.
#[derive(Debug)]
pub struct LockGuard {
    lock: PortLock,
    released: bool,
}

impl LockGuard {
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.lock.release()
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if !self.released {
            if let Err(e) = self.lock.release() {
                log::warn!("failed to clear port lock {}: {}", self.lock.path.display(), e);
            }
        }
    }
}
