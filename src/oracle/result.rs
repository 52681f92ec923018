use crate::*;

/// The oracle's answer for one [`SearchQuery`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct QueryResult {
    /// One logit per problem variable, free or not.
    pub logits: Vec<Logit>,
    /// Scaled esteps estimate of the remaining subtree.
    pub value: Esteps,
}

impl QueryResult {
    pub fn logit(&self, var: Var) -> Logit {
        self.logits[var.idx()]
    }
}
