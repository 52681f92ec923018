use crate::*;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedReceiver;

/// Something worth recording about a run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum Event {
    Episode {
        problem: String,
        cuber: String,
        brancher: String,
        esteps: Esteps,
        datapoints: usize,
    },
    Training {
        step: usize,
        loss: Loss,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Score {
    pub episodes: usize,
    log2_esteps: f64,
}

impl Score {
    /// Geometric mean of the reported esteps.
    pub fn mean(&self) -> f64 {
        (self.log2_esteps / self.episodes.max(1) as f64).exp2()
    }
}

/// Episode statistics per `(cuber, brancher)` pair.
#[derive(Debug, Clone, Default)]
pub struct Scoreboard(BTreeMap<(String, String), Score>);

impl Scoreboard {
    pub fn record(&mut self, cuber: &str, brancher: &str, esteps: Esteps) {
        let score = self
            .0
            .entry((cuber.to_string(), brancher.to_string()))
            .or_default();
        score.episodes += 1;
        score.log2_esteps += (esteps as f64).log2();
    }
    pub fn get(&self, cuber: &str, brancher: &str) -> Option<&Score> {
        self.0.get(&(cuber.to_string(), brancher.to_string()))
    }
    pub fn episodes(&self) -> usize {
        self.0.values().map(|s| s.episodes).sum()
    }
    fn report(&self) {
        for ((cuber, brancher), score) in self.0.iter() {
            log::info!(
                "{:<24}{:<16}{:<20}{:<20}",
                cuber,
                brancher,
                format!("episodes {}", score.episodes),
                format!("esteps {:.1}", score.mean()),
            );
        }
    }
}

/// Consume events until every sender is dropped, appending each as a JSON
/// line to `path` and keeping the scoreboard.
pub async fn drain(mut events: UnboundedReceiver<Event>, path: Option<PathBuf>) -> Scoreboard {
    let mut scoreboard = Scoreboard::default();
    let mut sink = match path.as_ref().map(std::fs::File::create).transpose() {
        Ok(file) => file.map(std::io::BufWriter::new),
        Err(e) => {
            log::warn!("telemetry file unavailable, logging only: {}", e);
            None
        }
    };
    let mut last = Instant::now();
    while let Some(event) = events.recv().await {
        if let Event::Episode {
            ref cuber,
            ref brancher,
            esteps,
            ..
        } = event
        {
            scoreboard.record(cuber, brancher, esteps);
        }
        if let Some(ref mut sink) = sink {
            let written = serde_json::to_writer(&mut *sink, &event)
                .map_err(Error::from)
                .and_then(|_| sink.write_all(b"\n").map_err(Error::from))
                .and_then(|_| sink.flush().map_err(Error::from));
            if let Err(e) = written {
                log::warn!("telemetry write failed: {}", e);
            }
        }
        if last.elapsed() >= TRAINING_LOG_INTERVAL {
            last = Instant::now();
            scoreboard.report();
        }
    }
    scoreboard.report();
    scoreboard
}
