use crate::*;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::RwLock;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;
use tokio::task::JoinHandle;

/// Owns the replay buffer, the learner, and the published weight snapshot.
///
/// Lifecycle is `new` → `spawn` → `shutdown`. Between the last two, actors
/// call [`Server`] methods concurrently; the training loop is the sole writer
/// of the snapshot and the sole reader of the buffer.
pub struct Coordinator {
    config: ServerConfig,
    run: Option<RunDir>,
    buffer: Arc<ReplayBuffer>,
    weights: Arc<RwLock<Arc<WeightSet>>>,
    halt: Arc<AtomicBool>,
    events: Mutex<Option<UnboundedSender<Event>>>,
    pending: Mutex<Option<(Box<dyn Learner>, UnboundedReceiver<Event>)>>,
    trainer: Mutex<Option<JoinHandle<()>>>,
    telemetry: Mutex<Option<JoinHandle<Scoreboard>>>,
}

impl Coordinator {
    /// Restore the learner if configured and publish its initial weights.
    pub fn new(
        config: ServerConfig,
        mut learner: Box<dyn Learner>,
        run: Option<RunDir>,
    ) -> Result<Self, Error> {
        config.validate()?;
        if let Some(ref path) = config.restore_path {
            let weights = Checkpoints::restore(path)?;
            learner.restore(&weights)?;
            log::info!(
                "restored {} parameters at step {} from {}",
                weights.size(),
                weights.iteration(),
                path.display()
            );
        }
        let (tx, rx) = unbounded_channel();
        Ok(Self {
            buffer: Arc::new(ReplayBuffer::new(
                config.replay_buffer_size,
                config.replay_buffer_min_size,
                config.seed,
            )),
            weights: Arc::new(RwLock::new(Arc::new(learner.weights()))),
            halt: Arc::new(AtomicBool::new(false)),
            events: Mutex::new(Some(tx)),
            pending: Mutex::new(Some((learner, rx))),
            trainer: Mutex::new(None),
            telemetry: Mutex::new(None),
            config,
            run,
        })
    }

    pub fn buffer(&self) -> &ReplayBuffer {
        &self.buffer
    }

    /// Start the training loop and the telemetry drain on the current runtime.
    pub fn spawn(&self) -> Result<(), Error> {
        let (learner, rx) = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or_else(|| Error::Configuration("coordinator already spawned".into()))?;
        let events = self
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| Error::Configuration("coordinator already shut down".into()))?;
        let summaries = self.run.as_ref().map(|r| r.summaries().join("events.jsonl"));
        let trainer = Trainer {
            config: self.config.clone(),
            learner,
            buffer: self.buffer.clone(),
            weights: self.weights.clone(),
            halt: self.halt.clone(),
            events,
            checkpoints: self
                .run
                .as_ref()
                .map(|r| Checkpoints::new(r.checkpoints(), self.config.max_saves_to_keep)),
        };
        *self.telemetry.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(tokio::spawn(drain(rx, summaries)));
        *self.trainer.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(tokio::task::spawn_blocking(move || trainer.run()));
        log::info!("coordinator started");
        Ok(())
    }

    /// Stop training, write a final checkpoint, and flush telemetry.
    pub async fn shutdown(&self) -> Result<Scoreboard, Error> {
        self.halt.store(true, Ordering::Relaxed);
        self.buffer.close();
        let trainer = self.trainer.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(trainer) = trainer {
            trainer
                .await
                .map_err(|e| Error::Task(format!("trainer: {}", e)))?;
        }
        drop(self.events.lock().unwrap_or_else(PoisonError::into_inner).take());
        drop(self.pending.lock().unwrap_or_else(PoisonError::into_inner).take());
        let telemetry = self.telemetry.lock().unwrap_or_else(PoisonError::into_inner).take();
        let scoreboard = match telemetry {
            Some(telemetry) => telemetry
                .await
                .map_err(|e| Error::Task(format!("telemetry: {}", e)))?,
            None => Scoreboard::default(),
        };
        log::info!("coordinator stopped after {} episodes", scoreboard.episodes());
        Ok(scoreboard)
    }
}

impl Server for Coordinator {
    fn config(&self) -> ServerConfig {
        self.config.clone()
    }
    fn weights(&self) -> Result<Arc<WeightSet>, Error> {
        Ok(self
            .weights
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
    fn process_episode(&self, result: EpisodeResult) -> Result<(), Error> {
        log::debug!(
            "[coordinator] {} via {}/{}: esteps {:.1}, {} datapoints",
            result.problem,
            result.cuber,
            result.brancher,
            result.esteps,
            result.datapoints.len()
        );
        let event = Event::Episode {
            problem: result.problem,
            cuber: result.cuber,
            brancher: result.brancher,
            esteps: result.esteps,
            datapoints: result.datapoints.len(),
        };
        self.buffer.add(result.datapoints);
        if let Some(ref events) = *self.events.lock().unwrap_or_else(PoisonError::into_inner) {
            let _ = events.send(event);
        }
        Ok(())
    }
}

/// The blocking half of the coordinator.
struct Trainer {
    config: ServerConfig,
    learner: Box<dyn Learner>,
    buffer: Arc<ReplayBuffer>,
    weights: Arc<RwLock<Arc<WeightSet>>>,
    halt: Arc<AtomicBool>,
    events: UnboundedSender<Event>,
    checkpoints: Option<Checkpoints>,
}

impl Trainer {
    fn halted(&self) -> bool {
        self.halt.load(Ordering::Relaxed) || interrupted()
    }

    fn run(mut self) {
        let start = self.learner.weights().iteration();
        let mut step = start;
        let mut last = (Instant::now(), step);
        log::info!("[trainer] waiting for {} datapoints", self.config.replay_buffer_min_size);
        while !self.halted() {
            let batch = self.buffer.wait(self.config.batch_size, self.config.backoff());
            if batch.is_empty() {
                log::debug!("[trainer] buffer underfilled ({}), backing off", self.buffer.len());
                continue;
            }
            let loss = self.learner.step(&batch);
            step += 1;
            let _ = self.events.send(Event::Training { step, loss });
            if step % self.config.update_weights_freq == 0 {
                self.publish();
            }
            if step % self.config.checkpoint_freq == 0 {
                self.checkpoint();
            }
            if last.0.elapsed() >= TRAINING_LOG_INTERVAL {
                let rate = (step - last.1) as f64 / last.0.elapsed().as_secs_f64().max(1.);
                log::info!(
                    "{:<20}{:<20}{:<20}{}",
                    format!("step {}", step),
                    format!("buffer {}", self.buffer.len()),
                    format!("steps/sec {:.1}", rate),
                    loss
                );
                last = (Instant::now(), step);
            }
        }
        if step > start {
            self.publish();
            self.checkpoint();
        }
        log::info!("[trainer] stopped at step {}", step);
    }

    fn publish(&self) {
        let snapshot = Arc::new(self.learner.weights());
        log::debug!("[trainer] publishing weights at step {}", snapshot.iteration());
        *self.weights.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }

    fn checkpoint(&self) {
        if let Some(ref checkpoints) = self.checkpoints {
            if let Err(e) = checkpoints.save(&self.learner.weights()) {
                log::warn!("[trainer] checkpoint failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config() -> ServerConfig {
        ServerConfig {
            replay_buffer_size: 64,
            replay_buffer_min_size: 4,
            batch_size: 4,
            update_weights_freq: 1,
            checkpoint_freq: 1000,
            learner_backoff_secs: 1,
            ..ServerConfig::default()
        }
    }

    fn episode(n: usize) -> EpisodeResult {
        let problem = crate::sat::fixtures::twin_xor();
        let query = Propagator::from(problem.clone()).query(&[]);
        EpisodeResult {
            problem: "twin".into(),
            cuber: "neuro-look-4".into(),
            brancher: "neuro-is".into(),
            esteps: 3.,
            datapoints: (0..n)
                .map(|_| Datapoint {
                    n_vars: problem.n_vars(),
                    n_clauses: problem.n_clauses(),
                    incidence: query.cells().to_vec(),
                    target_var: Var::from(0u32),
                    target: 3f32.log2(),
                })
                .collect(),
        }
    }

    #[test]
    fn ingestion_fills_the_buffer() {
        let coordinator = Coordinator::new(config(), Box::new(Linear::default()), None).unwrap();
        coordinator.process_episode(episode(3)).unwrap();
        coordinator.process_episode(episode(0)).unwrap();
        assert_eq!(coordinator.buffer().len(), 3);
        assert_eq!(coordinator.weights().unwrap().iteration(), 0);
    }

    #[test]
    fn rejects_invalid_config() {
        let config = ServerConfig {
            batch_size: 0,
            ..config()
        };
        assert!(Coordinator::new(config, Box::new(Linear::default()), None).is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn training_republishes_weights() {
        let coordinator = Coordinator::new(config(), Box::new(Linear::default()), None).unwrap();
        coordinator.spawn().unwrap();
        assert!(coordinator.spawn().is_err());
        coordinator.process_episode(episode(8)).unwrap();
        let deadline = Instant::now() + Duration::from_secs(10);
        while coordinator.weights().unwrap().iteration() == 0 && Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(coordinator.weights().unwrap().iteration() > 0);
        let scoreboard = coordinator.shutdown().await.unwrap();
        assert_eq!(scoreboard.episodes(), 1);
        assert!(scoreboard.get("neuro-look-4", "neuro-is").is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn shutdown_writes_final_checkpoint() {
        let base = std::env::temp_dir().join(format!("alphacuber-coord-{}", std::process::id()));
        let run = RunDir::create(&base, "test", &config()).unwrap();
        let checkpoints = run.checkpoints();
        let coordinator = Coordinator::new(config(), Box::new(Linear::default()), Some(run)).unwrap();
        coordinator.spawn().unwrap();
        coordinator.process_episode(episode(8)).unwrap();
        let deadline = Instant::now() + Duration::from_secs(10);
        while coordinator.weights().unwrap().iteration() == 0 && Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        coordinator.shutdown().await.unwrap();
        let saved = Checkpoints::new(checkpoints, 0).latest().unwrap().unwrap();
        assert!(Checkpoints::restore(&saved).unwrap().iteration() > 0);
        std::fs::remove_dir_all(&base).unwrap();
    }

    #[test]
    fn restores_from_checkpoint() {
        let dir = std::env::temp_dir().join(format!("alphacuber-restore-{}", std::process::id()));
        let mut learner = Linear::default();
        learner.step(&[Arc::new(episode(1).datapoints.remove(0))]);
        let path = Checkpoints::new(dir.clone(), 0)
            .save(&Learner::weights(&learner))
            .unwrap();
        let config = ServerConfig {
            restore_path: Some(path),
            ..config()
        };
        let coordinator = Coordinator::new(config, Box::new(Linear::default()), None).unwrap();
        assert_eq!(coordinator.weights().unwrap().iteration(), 1);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
