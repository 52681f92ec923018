use crate::*;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;

/// Every actor of a client, each on its own blocking task.
pub struct Pool {
    handles: Vec<JoinHandle<usize>>,
    started: Instant,
}

impl Pool {
    /// Load each group's corpus once and start its actors. Actor `i` is
    /// seeded with `seed + i`.
    pub fn spawn<F>(
        client: &ClientConfig,
        server: Arc<dyn Server>,
        oracle: F,
        limit: Option<usize>,
    ) -> Result<Self, Error>
    where
        F: Fn() -> Arc<dyn Oracle>,
    {
        client.validate()?;
        let seed = server.config().seed;
        let mut handles = Vec::with_capacity(client.count());
        for group in client.actors.iter() {
            let corpus = Corpus::load(&group.actor.problems)?;
            for _ in 0..group.n {
                let id = handles.len();
                let actor = Actor::new(
                    id,
                    group.actor.clone(),
                    server.clone(),
                    oracle(),
                    corpus.clone(),
                    seed.wrapping_add(id as u64),
                )?;
                handles.push(tokio::task::spawn_blocking(move || actor.run(limit)));
            }
        }
        log::info!("spawned {} actors", handles.len());
        Ok(Self {
            handles,
            started: Instant::now(),
        })
    }

    /// Wait for every actor to stop. Returns the total episodes attempted.
    pub async fn join(self) -> usize {
        let mut total = 0;
        for (id, handle) in self.handles.into_iter().enumerate() {
            match handle.await {
                Ok(episodes) => total += episodes,
                Err(e) => log::error!("[actor {}] panicked: {}", id, e),
            }
        }
        let secs = self.started.elapsed().as_secs_f64().max(1.);
        log::info!(
            "{:<20}{:<20}",
            format!("episodes {}", total),
            format!("E/sec {:.1}", total as f64 / secs),
        );
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn actors_feed_a_live_coordinator() {
        let dir = std::env::temp_dir().join(format!("alphacuber-pool-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("twin.cnf"), crate::sat::fixtures::twin_xor().to_string()).unwrap();
        let client = serde_json::from_value::<ClientConfig>(serde_json::json!({
            "actors": [
                { "n": 2, "problems": dir, "kind": "lookahead" },
                { "n": 1, "problems": dir, "kind": "asat",
                  "cubers": [{ "name": "rand", "kind": "random" }],
                  "branchers": [{ "name": "coin", "kind": "random" }] }
            ]
        }))
        .unwrap();
        let config = ServerConfig {
            replay_buffer_size: 64,
            replay_buffer_min_size: 8,
            batch_size: 4,
            learner_backoff_secs: 1,
            ..ServerConfig::default()
        };
        let coordinator = Arc::new(
            Coordinator::new(config, Box::new(Linear::default()), None).unwrap(),
        );
        coordinator.spawn().unwrap();
        let pool = Pool::spawn(
            &client,
            coordinator.clone(),
            || Arc::new(Linear::default()),
            Some(5),
        )
        .unwrap();
        assert_eq!(pool.join().await, 15);
        let scoreboard = coordinator.shutdown().await.unwrap();
        assert_eq!(scoreboard.episodes(), 15);
        assert_eq!(scoreboard.get("rand", "coin").unwrap().episodes, 5);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
