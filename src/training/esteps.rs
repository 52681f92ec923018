use crate::*;

/// Backward estimate of search tree size from branch probabilities.
///
/// Walking the trajectory from the leaf, `E ← 1 + E / p` at every decision,
/// starting from `E = 1`. Each intermediate `E` is an unbiased estimate of the
/// subtree size below that decision and becomes its (scaled) target.
#[derive(Debug, Clone, Copy, Default)]
pub struct Estimator {
    scale: Scale,
}

impl From<Scale> for Estimator {
    fn from(scale: Scale) -> Self {
        Self { scale }
    }
}

impl Estimator {
    /// Outcome estimate and unscaled per-decision targets, root first.
    pub fn estimate(&self, ps: &[Probability]) -> (Esteps, Vec<Esteps>) {
        let mut targets = vec![0.; ps.len()];
        let mut e = 1.;
        for (i, p) in ps.iter().enumerate().rev() {
            e = 1. + e / p;
            targets[i] = e;
        }
        (e, targets)
    }

    /// Turn a finished trajectory into scaled datapoints.
    pub fn datapoints(&self, problem: &Problem, trajectory: Trajectory) -> (Esteps, Vec<Datapoint>) {
        let ps = trajectory.iter().map(|d| d.p).collect::<Vec<_>>();
        let (esteps, targets) = self.estimate(&ps);
        let datapoints = trajectory
            .into_iter()
            .zip(targets)
            .map(|(decision, target)| Datapoint {
                n_vars: problem.n_vars(),
                n_clauses: problem.n_clauses(),
                target_var: decision.var(),
                incidence: decision.query.into_cells(),
                target: self.scale.scaled(target),
            })
            .collect();
        (esteps, datapoints)
    }
}
