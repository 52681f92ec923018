use crate::*;
use std::sync::Arc;

/// Components of one optimization step's objective, already weighted.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Loss {
    pub policy: f32,
    pub value: f32,
    pub l2: f32,
    pub total: f32,
}

impl std::fmt::Display for Loss {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "loss {:.4} (policy {:.4} value {:.4} l2 {:.4})",
            self.total, self.policy, self.value, self.l2
        )
    }
}

/// Training seam. Owned exclusively by the coordinator's training loop.
pub trait Learner: Send {
    fn step(&mut self, batch: &[Arc<Datapoint>]) -> Loss;
    /// Current parameters, tagged with the optimization step.
    fn weights(&self) -> WeightSet;
    fn restore(&mut self, weights: &WeightSet) -> Result<(), Error>;
}
