use super::*;

/// Variable-scoring rule used by the deterministic one-step probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Heuristic {
    /// Most occurrences in open clauses.
    #[default]
    Occurrence,
    /// Jeroslow–Wang: occurrences weighted by `2^-len`.
    JeroslowWang,
    /// Balance of positive and negative occurrences, `pos * neg`.
    Product,
}

/// The assumption-based search engine an episode runs against.
///
/// `query` and `cube` must not mutate committed state, so that lookahead
/// branches can be evaluated from shared references in parallel.
pub trait Substrate: Send + Sync {
    fn problem(&self) -> &Problem;
    /// Decide the formula under committed literals plus `assumptions`.
    fn check(&mut self, assumptions: &[Lit]) -> Status;
    /// Commit literals permanently (until the enclosing `pop`).
    fn add(&mut self, lits: &[Lit]);
    fn push(&mut self);
    fn pop(&mut self);
    /// Assumptions responsible for the last `Unsat` from `check`.
    fn unsat_core(&self) -> Vec<Lit>;
    /// One-step lookahead probe. `Unknown` comes with the literals to split on:
    /// two for a regular split, one when the other side is a failed literal.
    fn cube(&self, assumptions: &[Lit], heuristic: Heuristic) -> (Status, Vec<Lit>);
    fn query(&self, assumptions: &[Lit]) -> SearchQuery;
}
