use crate::*;

/// One branching step: the state before it, the literal taken, and the
/// probability with which that literal was drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub query: SearchQuery,
    pub lit: Lit,
    pub p: Probability,
}

impl Decision {
    pub fn var(&self) -> Var {
        self.lit.var()
    }
}

/// Decisions of one episode, root first.
pub type Trajectory = Vec<Decision>;
