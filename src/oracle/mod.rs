//! The learned policy/value model, seen from both sides.
//!
//! Actors query an [`Oracle`] for per-variable logits and a subtree value.
//! The coordinator publishes [`WeightSet`] snapshots that actors install
//! with [`Oracle::set_weights`]. [`Linear`] is a small reference model that
//! plays both the oracle and the learner role.
mod linear;
mod result;
mod scale;
mod weights;

pub use linear::*;
pub use result::*;
pub use scale::*;
pub use weights::*;

use crate::*;

/// Inference seam. Shared across lookahead threads, so methods take `&self`.
pub trait Oracle: Send + Sync {
    /// Evaluate a search state given as literal–clause incidence cells.
    fn query(&self, n_vars: usize, n_clauses: usize, cells: &[Cell]) -> Result<QueryResult, Error>;
    fn weights(&self) -> WeightSet;
    fn set_weights(&self, weights: &WeightSet) -> Result<(), Error>;
}
