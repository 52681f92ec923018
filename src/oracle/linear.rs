use crate::*;
use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;

const POLICY: &str = "policy";
const VALUE: &str = "value";

/// Per-variable occurrence features of the open clauses: positive and
/// negative degree and their minimum, each normalized by the open clause count.
type Local = [f32; 3];
/// `[ln(1 + cells), ln(1 + free), 1]`.
type Global = [f32; 3];

#[derive(Debug, Clone, Copy)]
struct Params {
    policy: Local,
    value: Global,
    iteration: usize,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            policy: [1., 1., 0.],
            value: [0., 0., 0.],
            iteration: 0,
        }
    }
}

struct Features {
    local: Vec<Local>,
    free: Vec<usize>,
    global: Global,
}

impl Features {
    fn from(n_vars: usize, cells: &[Cell]) -> Self {
        let mut pos = vec![0f32; n_vars];
        let mut neg = vec![0f32; n_vars];
        let mut clauses = cells.iter().map(|(_, c)| *c).collect::<Vec<_>>();
        clauses.sort_unstable();
        clauses.dedup();
        for (lit, _) in cells.iter().map(|(l, c)| (*l as usize, c)) {
            match lit < n_vars {
                true => pos[lit] += 1.,
                false if lit < 2 * n_vars => neg[lit - n_vars] += 1.,
                false => debug_assert!(false, "literal index out of range"),
            }
        }
        let open = clauses.len().max(1) as f32;
        let free = (0..n_vars)
            .filter(|v| pos[*v] + neg[*v] > 0.)
            .collect::<Vec<_>>();
        let local = (0..n_vars)
            .map(|v| [pos[v] / open, neg[v] / open, pos[v].min(neg[v]) / open])
            .collect();
        let global = [
            (cells.len() as f32).ln_1p(),
            (free.len() as f32).ln_1p(),
            1.,
        ];
        Self {
            local,
            free,
            global,
        }
    }
}

fn dot(a: &[f32; 3], b: &[f32; 3]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Linear policy/value model over hand-made clause-occurrence features.
///
/// Small enough to train on CPU inside the coordinator, and a drop-in for
/// any [`Oracle`] + [`Learner`] pair. Optimized with clipped SGD.
#[derive(Debug)]
pub struct Linear {
    params: RwLock<Params>,
    config: LearnerConfig,
}

impl Default for Linear {
    fn default() -> Self {
        Self::from(LearnerConfig::default())
    }
}

impl From<LearnerConfig> for Linear {
    fn from(config: LearnerConfig) -> Self {
        Self {
            params: RwLock::new(Params::default()),
            config,
        }
    }
}

impl Linear {
    fn params(&self) -> Params {
        *self.params.read().unwrap_or_else(PoisonError::into_inner)
    }
    fn export(params: &Params) -> WeightSet {
        WeightSet::new(params.iteration)
            .with(POLICY, params.policy.to_vec())
            .with(VALUE, params.value.to_vec())
    }
    fn import(weights: &WeightSet) -> Result<Params, Error> {
        let array = |name: &str| -> Result<[f32; 3], Error> {
            weights
                .get(name)
                .and_then(|a| <[f32; 3]>::try_from(a).ok())
                .ok_or_else(|| Error::Parse(format!("weight array '{}' missing or misshapen", name)))
        };
        Ok(Params {
            policy: array(POLICY)?,
            value: array(VALUE)?,
            iteration: weights.iteration(),
        })
    }
}

impl Oracle for Linear {
    fn query(&self, n_vars: usize, _: usize, cells: &[Cell]) -> Result<QueryResult, Error> {
        let params = self.params();
        let features = Features::from(n_vars, cells);
        Ok(QueryResult {
            logits: features.local.iter().map(|f| dot(&params.policy, f)).collect(),
            value: dot(&params.value, &features.global),
        })
    }
    fn weights(&self) -> WeightSet {
        Self::export(&self.params())
    }
    fn set_weights(&self, weights: &WeightSet) -> Result<(), Error> {
        let params = Self::import(weights)?;
        *self.params.write().unwrap_or_else(PoisonError::into_inner) = params;
        Ok(())
    }
}

impl Learner for Linear {
    fn step(&mut self, batch: &[Arc<Datapoint>]) -> Loss {
        let config = self.config.clone();
        let params = self.params.get_mut().unwrap_or_else(PoisonError::into_inner);
        let n = batch.len().max(1) as f32;
        let mut gp = [0f32; 3];
        let mut gv = [0f32; 3];
        let mut lp = 0f32;
        let mut lv = 0f32;
        for datapoint in batch.iter() {
            let features = Features::from(datapoint.n_vars, &datapoint.incidence);
            let target = datapoint.target_var.idx();
            if let Some(t) = features.free.iter().position(|v| *v == target) {
                let logits = features
                    .free
                    .iter()
                    .map(|v| dot(&params.policy, &features.local[*v]))
                    .collect::<Vec<_>>();
                let probs = softmax(&logits);
                lp -= probs[t].max(POLICY_MIN).ln();
                for (i, v) in features.free.iter().enumerate() {
                    let g = probs[i] - if i == t { 1. } else { 0. };
                    for k in 0..3 {
                        gp[k] += g * features.local[*v][k];
                    }
                }
            }
            let err = dot(&params.value, &features.global) - datapoint.target;
            lv += err * err;
            for k in 0..3 {
                gv[k] += 2. * err * features.global[k];
            }
        }
        let l2 = config.l2_cost_scale
            * (dot(&params.policy, &params.policy) + dot(&params.value, &params.value));
        for k in 0..3 {
            gp[k] = gp[k] * config.p_cost_scale / n + 2. * config.l2_cost_scale * params.policy[k];
            gv[k] = gv[k] * config.v_cost_scale / n + 2. * config.l2_cost_scale * params.value[k];
        }
        let norm = (dot(&gp, &gp) + dot(&gv, &gv)).sqrt();
        let clip = match norm > config.clip_val {
            true => config.clip_val / norm,
            false => 1.,
        };
        let lr = config.learning_rate.at(params.iteration);
        for k in 0..3 {
            params.policy[k] -= lr * clip * gp[k];
            params.value[k] -= lr * clip * gv[k];
        }
        params.iteration += 1;
        let policy = config.p_cost_scale * lp / n;
        let value = config.v_cost_scale * lv / n;
        Loss {
            policy,
            value,
            l2,
            total: policy + value + l2,
        }
    }
    fn weights(&self) -> WeightSet {
        Self::export(&self.params())
    }
    fn restore(&mut self, weights: &WeightSet) -> Result<(), Error> {
        *self.params.get_mut().unwrap_or_else(PoisonError::into_inner) = Self::import(weights)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn datapoint(target_var: u32, target: f32) -> Arc<Datapoint> {
        let problem = Problem::try_from("p cnf 3 2\n1 2 3 0\n-1 -2 0\n").unwrap();
        let query = Propagator::from(problem.clone()).query(&[]);
        Arc::new(Datapoint {
            n_vars: problem.n_vars(),
            n_clauses: problem.n_clauses(),
            incidence: query.into_cells(),
            target_var: Var::from(target_var),
            target,
        })
    }

    #[test]
    fn query_covers_every_variable() {
        let problem = crate::sat::fixtures::twin_xor();
        let query = Propagator::from(problem.clone()).query(&[]);
        let result = Linear::default()
            .query(problem.n_vars(), problem.n_clauses(), query.cells())
            .unwrap();
        assert_eq!(result.logits.len(), 4);
        assert_eq!(result.value, 0.);
    }

    #[test]
    fn weights_round_trip_through_oracle() {
        let mut learner = Linear::default();
        learner.step(&[datapoint(0, 3.)]);
        let snapshot = Learner::weights(&learner);
        assert_eq!(snapshot.iteration(), 1);
        let oracle = Linear::default();
        oracle.set_weights(&snapshot).unwrap();
        assert_eq!(Oracle::weights(&oracle), snapshot);
    }

    #[test]
    fn rejects_misshapen_weights() {
        let oracle = Linear::default();
        let bad = WeightSet::new(0).with("policy", vec![1., 2.]);
        assert!(matches!(oracle.set_weights(&bad), Err(Error::Parse(_))));
    }

    #[test]
    fn sgd_fits_a_constant_target() {
        let mut learner = Linear::from(LearnerConfig {
            learning_rate: LearningRate::None { start: 0.05 },
            ..LearnerConfig::default()
        });
        let batch = vec![datapoint(0, 5.); 4];
        let first = learner.step(&batch);
        let last = (0..300).map(|_| learner.step(&batch)).last().unwrap();
        assert!(last.value < first.value / 10.);
        assert!(last.policy < first.policy);
    }
}
