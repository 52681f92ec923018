use crate::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::sync::Arc;

/// Plays episodes on problems from its corpus and reports them to a [`Server`].
///
/// Episodes are independent: any failure is logged and the next episode
/// starts from a fresh weight pull. With `pull_every_step` the weights are
/// also refreshed before each decision; the cached root answer is kept, so
/// only the lookaheads see the new snapshot.
pub struct Actor {
    id: usize,
    config: ActorConfig,
    server: Arc<dyn Server>,
    oracle: Arc<dyn Oracle>,
    corpus: Corpus,
    policy: Policy,
    estimator: Estimator,
    rng: SmallRng,
}

impl Actor {
    pub fn new(
        id: usize,
        config: ActorConfig,
        server: Arc<dyn Server>,
        oracle: Arc<dyn Oracle>,
        corpus: Corpus,
        seed: u64,
    ) -> Result<Self, Error> {
        config.validate()?;
        if corpus.is_empty() {
            return Err(Error::Configuration(format!("actor {} has no problems", id)));
        }
        let scale = server.config().scale();
        Ok(Self {
            id,
            policy: Policy::new(&config.policy, scale),
            estimator: Estimator::from(scale),
            rng: SmallRng::seed_from_u64(seed),
            config,
            server,
            oracle,
            corpus,
        })
    }

    fn pull(&self) -> Result<(), Error> {
        self.oracle.set_weights(&*self.server.weights()?)
    }

    /// Play one episode on a uniformly drawn problem.
    pub fn episode(&mut self) -> Result<EpisodeResult, Error> {
        self.pull()?;
        let (name, problem) = self.corpus.sample(&mut self.rng);
        let name = name.to_string();
        self.policy.begin(&mut self.rng);
        let (cuber, brancher) = self.policy.names();
        let ref mut state = SearchState::new(
            Box::new(Propagator::from(problem.as_ref().clone())),
            self.oracle.clone(),
        );
        let server = &self.server;
        let every = self.config.pull_every_step;
        let trajectory = play(state, &self.policy, &mut self.rng, |state| {
            match every {
                true => state.oracle().set_weights(&*server.weights()?),
                false => Ok(()),
            }
        })?;
        let decisions = trajectory.len();
        let (esteps, datapoints) = self.estimator.datapoints(&problem, trajectory);
        log::debug!(
            "[actor {}] {} with {}/{}: {} decisions, esteps {:.1}",
            self.id,
            name,
            cuber,
            brancher,
            decisions,
            esteps
        );
        Ok(EpisodeResult {
            problem: name,
            cuber,
            brancher,
            esteps,
            datapoints: match self.config.train {
                true => datapoints,
                false => vec![],
            },
        })
    }

    /// Loop until interrupted or `limit` episodes have been attempted.
    /// Returns the number attempted.
    pub fn run(mut self, limit: Option<usize>) -> usize {
        let mut episodes = 0;
        log::debug!("[actor {}] starting", self.id);
        while !interrupted() && limit.is_none_or(|n| episodes < n) {
            match self
                .episode()
                .and_then(|result| self.server.process_episode(result))
            {
                Ok(()) => {}
                Err(e @ Error::UnexpectedSatisfiable(_)) => {
                    log::warn!("[actor {}] episode aborted: {}", self.id, e)
                }
                Err(e) if e.is_transient() => {
                    log::warn!("[actor {}] episode failed: {}", self.id, e)
                }
                Err(e) => log::error!("[actor {}] episode failed: {}", self.id, e),
            }
            episodes += 1;
        }
        log::debug!("[actor {}] stopped after {} episodes", self.id, episodes);
        episodes
    }
}
