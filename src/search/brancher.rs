use crate::*;
use rand::Rng;

/// A chosen literal, its draw probability, and its evaluated child if the
/// brancher looked ahead.
#[derive(Debug, Clone)]
pub struct Branch {
    pub lit: Lit,
    pub p: Probability,
    pub child: Option<Child>,
}

/// Draw one of a variable's two children proportionally to its cost.
/// The reported probability is that of the weights actually drawn from.
pub fn importance<R: Rng>(pair: [Child; 2], scale: Scale, rng: &mut R) -> Branch {
    let costs = floored(&pair.each_ref().map(|c| c.cost(scale)));
    let total = costs[0] + costs[1];
    let i = categorical(&costs, rng);
    let [first, second] = pair;
    let child = if i == 0 { first } else { second };
    Branch {
        lit: child.lit(),
        p: costs[i] / total,
        child: Some(child),
    }
}

/// A named branching rule from an asat actor's repertoire.
#[derive(Debug, Clone)]
pub struct Brancher(BrancherConfig);

impl From<BrancherConfig> for Brancher {
    fn from(config: BrancherConfig) -> Self {
        Self(config)
    }
}

impl Brancher {
    pub fn name(&self) -> &str {
        &self.0.name
    }
    pub fn branch<R: Rng>(
        &self,
        state: &SearchState,
        var: Var,
        scale: Scale,
        rng: &mut R,
    ) -> Result<Branch, Error> {
        match self.0.kind {
            BrancherKind::Random => Ok(Branch {
                lit: Lit::from((var, rng.random_bool(0.5))),
                p: 0.5,
                child: None,
            }),
            BrancherKind::NeuroIs => {
                let children = state.lookaheads(&[Lit::from((var, false)), Lit::from((var, true))])?;
                let pair = <[Child; 2]>::try_from(children).map_err(|_| {
                    Error::OracleUnavailable("lookahead lost a branch".into())
                })?;
                Ok(importance(pair, scale, rng))
            }
        }
    }
}
