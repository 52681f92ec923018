use crate::*;
use rand::Rng;

/// The closed set of episode policies, built from [`PolicyConfig`].
#[derive(Debug, Clone)]
pub enum Policy {
    Lookahead(LookaheadPolicy),
    Asat(AsatPolicy),
}

impl Policy {
    pub fn new(config: &PolicyConfig, scale: Scale) -> Self {
        match config {
            PolicyConfig::Lookahead(c) => Self::Lookahead(LookaheadPolicy::new(c.clone(), scale)),
            PolicyConfig::Asat(c) => Self::Asat(AsatPolicy::new(c.clone(), scale)),
        }
    }
    /// Prepare for a fresh episode.
    pub fn begin<R: Rng>(&mut self, rng: &mut R) {
        if let Self::Asat(policy) = self {
            policy.begin(rng);
        }
    }
    /// `(cuber, brancher)` names reported with every episode.
    pub fn names(&self) -> (String, String) {
        match self {
            Self::Lookahead(policy) => (policy.name(), "neuro-is".to_string()),
            Self::Asat(policy) => policy.names(),
        }
    }
    /// Take one branching step, or `None` when the episode is over.
    pub fn decide<R: Rng>(
        &self,
        state: &mut SearchState,
        rng: &mut R,
    ) -> Result<Option<Decision>, Error> {
        match self {
            Self::Lookahead(policy) => policy.decide(state, rng),
            Self::Asat(policy) => policy.decide(state, rng),
        }
    }
}
