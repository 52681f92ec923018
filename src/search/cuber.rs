use crate::*;
use rand::Rng;
use rand::seq::IndexedRandom;

/// A named variable-selection rule from an asat actor's repertoire.
#[derive(Debug, Clone)]
pub struct Cuber(CuberConfig);

impl From<CuberConfig> for Cuber {
    fn from(config: CuberConfig) -> Self {
        Self(config)
    }
}

impl Cuber {
    pub fn name(&self) -> &str {
        &self.0.name
    }
    /// Variable to split on next. `None` when the cuber considers the
    /// instance resolved at this state.
    pub fn cube<R: Rng>(&self, state: &mut SearchState, rng: &mut R) -> Result<Option<Var>, Error> {
        match self.0.kind {
            CuberKind::Random => Ok(state.free_variables().choose(rng).copied()),
            CuberKind::Probe { ref heuristics } => {
                let heuristic = heuristics.choose(rng).copied().unwrap_or_default();
                match state.probe(heuristic) {
                    (Status::Unknown, lits) => Ok(lits.first().map(Lit::var)),
                    (Status::Sat, _) => Err(Error::UnexpectedSatisfiable(format!(
                        "cuber {} found a model",
                        self.name()
                    ))),
                    (Status::Unsat, _) => Ok(None),
                }
            }
            CuberKind::Neuro { tau } => {
                let free = state.free_variables().to_vec();
                if free.is_empty() {
                    return Ok(None);
                }
                let result = state.query()?;
                let logits = free
                    .iter()
                    .map(|v| result.logit(*v) * tau)
                    .collect::<Vec<_>>();
                Ok(Some(free[categorical(&softmax(&logits), rng)]))
            }
        }
    }
}
