use crate::*;
use std::path::PathBuf;

/// Coordinator-side settings. Actors read a snapshot through
/// [`Server::config`](crate::Server::config) for the shared esteps scale.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Seeds the learner's sampling and the actors' base seed.
    pub seed: u64,
    /// Multiplier of the log2 reparametrization of esteps.
    pub log_esteps_scale: f32,
    /// Fixed replay capacity.
    pub replay_buffer_size: usize,
    /// Filled prefix required before the first batch is drawn.
    pub replay_buffer_min_size: usize,
    pub batch_size: usize,
    /// Optimization steps between weight snapshot republications.
    pub update_weights_freq: usize,
    /// Optimization steps between checkpoints.
    pub checkpoint_freq: usize,
    pub max_saves_to_keep: usize,
    /// Upper bound on how long the trainer sleeps on an underfilled buffer.
    pub learner_backoff_secs: u64,
    /// Checkpoint file to restore parameters from before training.
    pub restore_path: Option<PathBuf>,
    pub learner: LearnerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            log_esteps_scale: LOG_ESTEPS_SCALE,
            replay_buffer_size: REPLAY_BUFFER_SIZE,
            replay_buffer_min_size: REPLAY_BUFFER_MIN_SIZE,
            batch_size: TRAINING_BATCH_SIZE,
            update_weights_freq: UPDATE_WEIGHTS_FREQ,
            checkpoint_freq: CHECKPOINT_FREQ,
            max_saves_to_keep: MAX_SAVES_TO_KEEP,
            learner_backoff_secs: LEARNER_BACKOFF.as_secs(),
            restore_path: None,
            learner: LearnerConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn scale(&self) -> Scale {
        Scale::from(self.log_esteps_scale)
    }
    pub fn backoff(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.learner_backoff_secs)
    }
    pub fn validate(&self) -> Result<(), Error> {
        let fail = |s: &str| -> Result<(), Error> { Err(Error::Configuration(s.to_string())) };
        match self {
            c if !(c.log_esteps_scale > 0.) => fail("log_esteps_scale must be positive"),
            c if c.replay_buffer_size == 0 => fail("replay_buffer_size must be positive"),
            c if c.replay_buffer_min_size > c.replay_buffer_size => {
                fail("replay_buffer_min_size exceeds replay_buffer_size")
            }
            c if c.batch_size == 0 => fail("batch_size must be positive"),
            c if c.batch_size > c.replay_buffer_size => {
                fail("batch_size exceeds replay_buffer_size")
            }
            c if c.update_weights_freq == 0 => fail("update_weights_freq must be positive"),
            c if c.checkpoint_freq == 0 => fail("checkpoint_freq must be positive"),
            c => c.learner.validate(),
        }
    }
}

/// Loss weighting and optimizer settings for the reference learner.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LearnerConfig {
    pub p_cost_scale: f32,
    pub v_cost_scale: f32,
    pub l2_cost_scale: f32,
    /// Global gradient norm clip.
    pub clip_val: f32,
    pub learning_rate: LearningRate,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            p_cost_scale: 1.,
            v_cost_scale: 1.,
            l2_cost_scale: 1e-4,
            clip_val: 1.,
            learning_rate: LearningRate::default(),
        }
    }
}

impl LearnerConfig {
    fn validate(&self) -> Result<(), Error> {
        match self {
            c if c.clip_val <= 0. => Err(Error::Configuration("clip_val must be positive".into())),
            c if c.p_cost_scale < 0. || c.v_cost_scale < 0. || c.l2_cost_scale < 0. => Err(
                Error::Configuration("cost scales must be non-negative".into()),
            ),
            c => c.learning_rate.validate(),
        }
    }
}

/// Step-size schedule as a function of the optimization step.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum LearningRate {
    None {
        start: f32,
    },
    Poly {
        start: f32,
        end: f32,
        decay_steps: usize,
        power: f32,
    },
    Exp {
        start: f32,
        decay_steps: usize,
        decay_rate: f32,
    },
}

impl Default for LearningRate {
    fn default() -> Self {
        Self::None { start: 1e-2 }
    }
}

impl LearningRate {
    pub fn at(&self, step: usize) -> f32 {
        match *self {
            Self::None { start } => start,
            Self::Poly {
                start,
                end,
                decay_steps,
                power,
            } => {
                let t = step.min(decay_steps) as f32 / decay_steps as f32;
                (start - end) * (1. - t).powf(power) + end
            }
            Self::Exp {
                start,
                decay_steps,
                decay_rate,
            } => start * decay_rate.powf(step as f32 / decay_steps as f32),
        }
    }
    fn validate(&self) -> Result<(), Error> {
        match *self {
            Self::Poly { decay_steps: 0, .. } | Self::Exp { decay_steps: 0, .. } => Err(
                Error::Configuration("learning rate decay_steps must be positive".into()),
            ),
            _ => Ok(()),
        }
    }
}
