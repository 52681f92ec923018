use crate::*;

/// What an actor reports after one episode.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EpisodeResult {
    pub problem: String,
    pub cuber: String,
    pub brancher: String,
    /// Unscaled estimate of the episode's search tree size.
    pub esteps: Esteps,
    pub datapoints: Vec<Datapoint>,
}
