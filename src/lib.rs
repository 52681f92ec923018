//! Self-play training of branching policies for cube-and-conquer search.
//!
//! Actors play episodes against a search substrate, guided by a learned
//! oracle and a one-step lookahead. Each decision's importance-sampling
//! probability feeds a backward estimate of the search tree size, which
//! becomes the regression target. A coordinator ingests the resulting
//! datapoints into a replay buffer, trains, and republishes weights.
#![allow(dead_code)]

pub mod actor;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod oracle;
pub mod sat;
pub mod search;
pub mod training;

pub use actor::*;
pub use config::*;
pub use coordinator::*;
pub use error::*;
pub use oracle::*;
pub use sat::*;
pub use search::*;
pub use training::*;

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Selection weights, branch probabilities, and sampling distributions.
pub type Probability = f32;
/// Expected number of search steps, or its log-scaled reparametrization.
pub type Esteps = f32;
/// Unnormalized per-variable policy scores.
pub type Logit = f32;

// ============================================================================
// ESTEPS TARGETS
// Targets are regressed in log space: scaled(E) = log2(E) · scale.
// ============================================================================
/// Multiplier of the log2 reparametrization.
pub const LOG_ESTEPS_SCALE: f32 = 1.0;
/// Ceiling on a subtree cost read off an oracle value.
pub const ESTEPS_MAX: Esteps = 1e30;

// ============================================================================
// REPLAY BUFFER
// ============================================================================
/// Fixed number of datapoint slots.
pub const REPLAY_BUFFER_SIZE: usize = 1 << 16;
/// Filled prefix required before the first batch is drawn.
pub const REPLAY_BUFFER_MIN_SIZE: usize = 1 << 10;

// ============================================================================
// TRAINING LOOP
// ============================================================================
/// Datapoints per optimization step.
pub const TRAINING_BATCH_SIZE: usize = 32;
/// Optimization steps between weight republications.
pub const UPDATE_WEIGHTS_FREQ: usize = 16;
/// Optimization steps between checkpoints.
pub const CHECKPOINT_FREQ: usize = 1024;
/// Checkpoints retained on disk; older ones are pruned.
pub const MAX_SAVES_TO_KEEP: usize = 8;
/// Longest single sleep on an underfilled buffer.
pub const LEARNER_BACKOFF: std::time::Duration = std::time::Duration::from_secs(20);
/// Interval between progress log messages during training.
pub const TRAINING_LOG_INTERVAL: std::time::Duration = std::time::Duration::from_secs(60);

// ============================================================================
// LOOKAHEAD SELECTION
// select = w · softmax(logits · τp) + (1 − w) · softmax(−scaled(cost) · τq)
// ============================================================================
/// Candidates evaluated per decision.
pub const LOOKAHEAD_WIDTH: usize = 4;
/// Temperature on the oracle's logits.
pub const PRIOR_TAU: f32 = 1.0;
/// Temperature on the lookahead's log cost.
pub const POSTERIOR_TAU: f32 = 1.0;
/// Convex weight of the prior.
pub const PRIOR_WEIGHT: Probability = 0.5;

// ============================================================================
// ROOT EXPLORATION NOISE
// p' = ε · Dir(α / n) + (1 − ε) · p over free variables.
// ============================================================================
/// Noise mixture weight (ε).
pub const DIRICHLET_EPSILON: Probability = 0.25;
/// Total concentration (α), split evenly across free variables.
pub const DIRICHLET_ASCALE: f32 = 10.0;
/// Floor for normalization denominators.
pub const POLICY_MIN: Probability = Probability::MIN_POSITIVE;

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

/// Register Ctrl+C handler for immediate termination.
/// Actors mid-episode and unsaved optimizer steps are lost.
#[cfg(feature = "server")]
pub fn kys() {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!();
            log::warn!("violent interrupt received, exiting immediately");
            std::process::exit(0);
        }
    });
}

/// Global interrupt flag for graceful shutdown coordination.
static INTERRUPTED: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(false);
/// Optional training deadline from TRAIN_DURATION env var.
static DEADLINE: std::sync::OnceLock<std::time::Instant> = std::sync::OnceLock::new();
/// Check if graceful shutdown was requested (via stdin "Q") or deadline reached.
pub fn interrupted() -> bool {
    INTERRUPTED.load(std::sync::atomic::Ordering::Relaxed)
        || DEADLINE
            .get()
            .map_or(false, |d| std::time::Instant::now() >= *d)
}
/// Register graceful interrupt handler. Type "Q" + Enter to let actors
/// finish their episode and the trainer write a final checkpoint.
/// Optionally set TRAIN_DURATION env var (e.g., "2h", "30m") for timed runs.
#[cfg(feature = "server")]
pub fn brb() {
    if let Ok(duration) = std::env::var("TRAIN_DURATION") {
        if let Some(deadline) = parse_duration(&duration) {
            let _ = DEADLINE.set(std::time::Instant::now() + deadline);
            log::info!("training will stop after {}", duration);
        }
    }
    std::thread::spawn(|| {
        loop {
            let ref mut buffer = String::new();
            match std::io::stdin().read_line(buffer) {
                Ok(0) | Err(_) => break,
                Ok(_) if buffer.trim().to_uppercase() == "Q" => {
                    log::warn!("graceful interrupt requested, finishing current episodes...");
                    INTERRUPTED.store(true, std::sync::atomic::Ordering::Relaxed);
                    break;
                }
                Ok(_) => continue,
            }
        }
    });
}
/// Parse duration string like "30s", "5m", "2h", "1d" into Duration.
#[cfg(feature = "server")]
fn parse_duration(s: &str) -> Option<std::time::Duration> {
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

#[cfg(all(test, feature = "server"))]
mod tests {
    use super::*;

    #[test]
    fn parses_durations() {
        assert_eq!(parse_duration("30s"), Some(std::time::Duration::from_secs(30)));
        assert_eq!(parse_duration("2h"), Some(std::time::Duration::from_secs(7200)));
        assert_eq!(parse_duration("5x"), None);
        assert_eq!(parse_duration(""), None);
    }
}
