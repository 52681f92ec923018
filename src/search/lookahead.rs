use crate::*;
use rand::Rng;

/// Neural lookahead branching.
///
/// Each decision narrows the free variables to a few promising candidates
/// by the oracle's (noised) prior, evaluates both children of each, and
/// picks a variable by blending the prior with a posterior that favors
/// small lookahead subtrees. The branch is then importance-sampled by cost.
#[derive(Debug, Clone)]
pub struct LookaheadPolicy {
    config: LookaheadConfig,
    scale: Scale,
}

impl LookaheadPolicy {
    pub fn new(config: LookaheadConfig, scale: Scale) -> Self {
        Self { config, scale }
    }

    pub fn name(&self) -> String {
        format!("neuro-look-{}", self.config.width)
    }

    pub fn decide<R: Rng>(
        &self,
        state: &mut SearchState,
        rng: &mut R,
    ) -> Result<Option<Decision>, Error> {
        if state.free_variables().is_empty() {
            return Ok(None);
        }
        let probed = match self.config.try_probe {
            false => None,
            true => match state.probe(self.config.probe) {
                (Status::Unknown, lits) => lits.first().map(Lit::var),
                (Status::Unsat, _) => return Ok(None),
                (Status::Sat, _) => {
                    return Err(Error::UnexpectedSatisfiable("probe found a model".into()));
                }
            },
        };
        let free = state.free_variables().to_vec();
        let logits = state.query()?.logits.clone();
        let candidates = self.candidates(&free, &logits, probed, rng);
        let lits = candidates
            .iter()
            .flat_map(|v| [Lit::from((*v, false)), Lit::from((*v, true))])
            .collect::<Vec<_>>();
        let mut children = state.lookaheads(&lits)?;
        let totals = children
            .chunks(2)
            .map(|pair| pair.iter().map(|c| c.cost(self.scale)).sum::<Esteps>())
            .collect::<Vec<_>>();
        let priors = candidates
            .iter()
            .map(|v| logits[v.idx()])
            .collect::<Vec<_>>();
        let selection = self.select(&priors, &totals);
        let i = categorical(&selection, rng);
        log::trace!(
            "candidates {:?} totals {:?} selection {:?}",
            candidates,
            totals,
            selection
        );
        let second = children.swap_remove(2 * i + 1);
        let first = children.swap_remove(2 * i);
        let branch = importance([first, second], self.scale, rng);
        let decision = Decision {
            query: state.current().clone(),
            lit: branch.lit,
            p: branch.p,
        };
        match branch.child {
            Some(child) => state.commit(child),
            None => state.extend(branch.lit),
        }
        Ok(Some(decision))
    }

    /// Top-`width` free variables by the noised root prior, plus the probe's
    /// variable when configured to consider it.
    fn candidates<R: Rng>(
        &self,
        free: &[Var],
        logits: &[Logit],
        probed: Option<Var>,
        rng: &mut R,
    ) -> Vec<Var> {
        let root = softmax(&free.iter().map(|v| logits[v.idx()]).collect::<Vec<_>>());
        let dirichlet = self.config.dirichlet;
        let noisy = perturb(&root, dirichlet.epsilon, dirichlet.ascale, rng);
        let mut candidates = top_k(&noisy, self.config.width.min(free.len()))
            .into_iter()
            .map(|i| free[i])
            .collect::<Vec<_>>();
        if let Some(var) = probed.filter(|_| self.config.consider_probe) {
            if !candidates.contains(&var) {
                candidates.push(var);
            }
        }
        candidates
    }

    /// Convex blend of the logit prior and the lookahead-cost posterior,
    /// renormalized.
    pub fn select(&self, logits: &[Logit], totals: &[Esteps]) -> Vec<Probability> {
        let w = self.config.prior_weight;
        let prior = softmax(
            &logits
                .iter()
                .map(|l| l * self.config.prior_tau)
                .collect::<Vec<_>>(),
        );
        let posterior = softmax(
            &totals
                .iter()
                .map(|t| -self.scale.scaled(*t) * self.config.posterior_tau)
                .collect::<Vec<_>>(),
        );
        normalize(
            &prior
                .iter()
                .zip(posterior.iter())
                .map(|(p, q)| w * p + (1. - w) * q)
                .collect::<Vec<_>>(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::fixtures::pigeonhole;
    use crate::sat::fixtures::twin_xor;
    use crate::search::state::tests::state;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn deterministic() -> LookaheadPolicy {
        LookaheadPolicy::new(
            LookaheadConfig {
                dirichlet: DirichletConfig {
                    epsilon: 0.,
                    ..DirichletConfig::default()
                },
                prior_weight: 0.,
                ..LookaheadConfig::default()
            },
            Scale::default(),
        )
    }

    #[test]
    fn selection_is_normalized() {
        let policy = LookaheadPolicy::new(LookaheadConfig::default(), Scale::from(2.));
        let selection = policy.select(&[0.3, -2., 5., 0.], &[2., 9., 130., 4.]);
        assert_eq!(selection.len(), 4);
        assert!((selection.iter().sum::<f32>() - 1.).abs() < 1e-6);
        let posterior_only = deterministic().select(&[9., 0.], &[64., 2.]);
        assert!(posterior_only[1] > posterior_only[0]);
    }

    #[test]
    fn doubly_closed_candidates_total_two() {
        let state = state(twin_xor());
        let children = state
            .lookaheads(&[Lit::try_from(3).unwrap(), Lit::try_from(-3).unwrap()])
            .unwrap();
        let total = children.iter().map(|c| c.cost(Scale::default())).sum::<f32>();
        assert_eq!(total, 2.);
    }

    #[test]
    fn depth_one_episode_is_deterministic() {
        let ref mut rng = SmallRng::seed_from_u64(11);
        let ref mut state = state(twin_xor());
        let policy = deterministic();
        let decision = policy.decide(state, rng).unwrap().unwrap();
        assert_eq!(decision.p, 0.5);
        assert_eq!(decision.query.free().len(), 4);
        assert_eq!(state.status(), Status::Unsat);
        assert!(policy.decide(state, rng).unwrap().is_none());
        assert_eq!(policy.name(), format!("neuro-look-{}", LOOKAHEAD_WIDTH));
    }

    #[test]
    fn refuted_probe_ends_the_episode() {
        let ref mut rng = SmallRng::seed_from_u64(11);
        let ref mut state = state(twin_xor());
        let policy = LookaheadPolicy::new(
            LookaheadConfig {
                try_probe: true,
                ..LookaheadConfig::default()
            },
            Scale::default(),
        );
        assert!(policy.decide(state, rng).unwrap().is_none());
        assert_eq!(state.oracle_calls(), 0);
    }

    #[test]
    fn probed_variable_widens_the_candidates() {
        let ref mut rng = SmallRng::seed_from_u64(11);
        let policy = LookaheadPolicy::new(
            LookaheadConfig {
                width: 1,
                try_probe: true,
                consider_probe: true,
                ..LookaheadConfig::default()
            },
            Scale::default(),
        );
        let free = (0..4u32).map(Var::from).collect::<Vec<_>>();
        let candidates = policy.candidates(&free, &[9., 0., 0., 0.], Some(Var::from(3u32)), rng);
        assert!(candidates.contains(&Var::from(3u32)));
        assert!(candidates.len() <= 2);
    }

    #[test]
    fn unsatisfiable_episode_terminates() {
        let ref mut rng = SmallRng::seed_from_u64(2);
        let ref mut state = state(pigeonhole(4, 3));
        let policy = LookaheadPolicy::new(LookaheadConfig::default(), Scale::default());
        let mut depth = 0;
        while state.status() == Status::Unknown {
            match policy.decide(state, rng).unwrap() {
                Some(decision) => {
                    assert!(decision.p > 0. && decision.p <= 1.);
                    depth += 1;
                }
                None => break,
            }
        }
        assert!(depth > 0);
        assert!(depth <= 12);
    }
}
