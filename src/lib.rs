//! Double-oracle strategy expansion for dependency-graph security games.
//!
//! A defender and an attacker play on a dependency graph simulated by an
//! external process. Each epoch trains a best response per role against the
//! opponent's equilibrium mixture, fills the empirical payoff table, solves
//! for a new equilibrium, and probes a parameterized heuristic family for
//! beneficial deviations.

pub mod artifacts;
pub mod error;
pub mod expansion;
pub mod game;
pub mod oracle;
pub mod search;
pub mod solver;
pub mod strategy;
pub mod trainer;

pub use error::*;

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Expected values and per-episode payoffs.
pub type Utility = f64;
/// Mixture weights and acceptance probabilities.
pub type Probability = f64;
/// Expansion loop iteration counter.
pub type Epoch = usize;

// ============================================================================
// TRAITS
// ============================================================================
/// Method-chaining helper: `x.pipe(f)` is `f(x)`.
pub trait Pipe: Sized {
    fn pipe<T>(self, f: impl FnOnce(Self) -> T) -> T {
        f(self)
    }
}
impl<T> Pipe for T {}

// ============================================================================
// MIXTURES
// ============================================================================
/// Mixture weights must sum to one within this tolerance.
pub const WEIGHT_TOLERANCE: Probability = 1e-6;
/// Solver weights below this are dropped before renormalizing.
pub const WEIGHT_CUTOFF: Probability = 1e-8;
/// Decimal places requested from the LCP solver.
pub const SOLVER_PRECISION: usize = 8;

// ============================================================================
// RETRIES
// ============================================================================
/// Per-cell retries on transient simulator faults before halting.
pub const CELL_RETRIES: usize = 3;
/// Loop-level retries of an external subsystem with a fresh handle.
pub const EXTERNAL_RETRIES: usize = 1;
/// Deepest mixture-of-mixtures nesting resolved per episode.
pub const MAX_MIXTURE_DEPTH: usize = 8;

// ============================================================================
// EXTERNAL PROCESSES
// ============================================================================
/// Time the simulator is given to come up before the first request (seconds).
pub const SIMULATOR_GRACE: f64 = 5.0;
/// Interval between reads of a held port lock.
pub const LOCK_POLL: std::time::Duration = std::time::Duration::from_millis(100);

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
#[cfg(feature = "server")]
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

/// Ctrl-C requests a graceful stop. A second Ctrl-C exits immediately.
#[cfg(feature = "server")]
pub fn kys() {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("interrupt received, stopping at next safe point (again to exit now)");
            INTERRUPTED.store(true, std::sync::atomic::Ordering::Relaxed);
        }
        if tokio::signal::ctrl_c().await.is_ok() {
            println!();
            log::warn!("violent interrupt received, exiting immediately");
            std::process::exit(130);
        }
    });
}

/// Global interrupt flag for graceful shutdown coordination.
static INTERRUPTED: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(false);
/// Optional run deadline from RUN_DURATION env var.
static DEADLINE: std::sync::OnceLock<std::time::Instant> = std::sync::OnceLock::new();

/// Check if graceful shutdown was requested (via stdin "Q") or deadline reached.
pub fn interrupted() -> bool {
    INTERRUPTED.load(std::sync::atomic::Ordering::Relaxed)
        || DEADLINE
            .get()
            .map_or(false, |d| std::time::Instant::now() >= *d)
}

/// Register graceful interrupt handler. Type "Q" + Enter to stop at the next safe point.
/// Optionally set RUN_DURATION env var (e.g., "2h", "30m") for timed runs.
#[cfg(feature = "server")]
pub fn brb() {
    if let Ok(duration) = std::env::var("RUN_DURATION") {
        if let Some(deadline) = parse_duration(&duration) {
            let _ = DEADLINE.set(std::time::Instant::now() + deadline);
            log::info!("run will stop after {}", duration);
        }
    }
    std::thread::spawn(|| {
        loop {
            let ref mut buffer = String::new();
            match std::io::stdin().read_line(buffer) {
                Ok(0) | Err(_) => break,
                Ok(_) if buffer.trim().to_uppercase() == "Q" => {
                    log::warn!("graceful interrupt requested, stopping at next safe point...");
                    INTERRUPTED.store(true, std::sync::atomic::Ordering::Relaxed);
                    break;
                }
                Ok(_) => continue,
            }
        }
    });
}

/// Parse duration string like "30s", "5m", "2h", "1d" into Duration.
pub fn parse_duration(s: &str) -> Option<std::time::Duration> {
    let s = s.trim();
    let (num, unit) = s.split_at(s.len().saturating_sub(1));
    let value: u64 = num.parse().ok()?;
    match unit {
        "s" => Some(std::time::Duration::from_secs(value)),
        "m" => Some(std::time::Duration::from_secs(value * 60)),
        "h" => Some(std::time::Duration::from_secs(value * 3600)),
        "d" => Some(std::time::Duration::from_secs(value * 86400)),
        _ => None,
    }
}
