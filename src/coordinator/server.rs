use crate::*;
use std::sync::Arc;

/// What an actor needs from the coordinator, independent of transport.
pub trait Server: Send + Sync {
    fn config(&self) -> ServerConfig;
    /// Latest published snapshot. May lag the trainer by design.
    fn weights(&self) -> Result<Arc<WeightSet>, Error>;
    fn process_episode(&self, result: EpisodeResult) -> Result<(), Error>;
}
