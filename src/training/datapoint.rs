use crate::*;

/// One supervised example: a search state, the variable branched on there,
/// and the scaled esteps of the subtree below it.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Datapoint {
    pub n_vars: usize,
    pub n_clauses: usize,
    pub incidence: Vec<Cell>,
    pub target_var: Var,
    pub target: Esteps,
}
