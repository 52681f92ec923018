use crate::*;
use rayon::prelude::*;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

/// A one-literal extension of the current state, evaluated but not committed.
#[derive(Debug, Clone)]
pub struct Child {
    lit: Lit,
    query: SearchQuery,
    result: Option<QueryResult>,
}

impl Child {
    pub fn lit(&self) -> Lit {
        self.lit
    }
    pub fn query(&self) -> &SearchQuery {
        &self.query
    }
    pub fn is_closed(&self) -> bool {
        self.query.is_closed()
    }
    /// Estimated subtree size below this child, in `[1, ESTEPS_MAX]`.
    /// A closed child costs one step.
    pub fn cost(&self, scale: Scale) -> Esteps {
        match self.result {
            Some(ref result) if !self.is_closed() => {
                scale.esteps(result.value).max(1.).min(ESTEPS_MAX)
            }
            _ => 1.,
        }
    }
}

/// The partial assignment an episode is exploring.
///
/// Caches the oracle's answer for the current query: [`extend`](Self::extend)
/// drops it, [`commit`](Self::commit) replaces it with the child's, so a
/// lookahead-driven episode never evaluates a state twice.
pub struct SearchState {
    substrate: Box<dyn Substrate>,
    oracle: Arc<dyn Oracle>,
    status: Status,
    query: SearchQuery,
    cache: Option<QueryResult>,
    calls: AtomicUsize,
}

impl SearchState {
    pub fn new(mut substrate: Box<dyn Substrate>, oracle: Arc<dyn Oracle>) -> Self {
        let status = substrate.check(&[]);
        let query = substrate.query(&[]);
        Self {
            substrate,
            oracle,
            status,
            query,
            cache: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }
    pub fn free_variables(&self) -> &[Var] {
        self.query.free()
    }
    pub fn current(&self) -> &SearchQuery {
        &self.query
    }
    pub fn oracle(&self) -> &Arc<dyn Oracle> {
        &self.oracle
    }
    /// Number of oracle evaluations so far.
    pub fn oracle_calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// Oracle answer for the current state, evaluated at most once.
    pub fn query(&mut self) -> Result<&QueryResult, Error> {
        let result = match self.cache.take() {
            Some(result) => result,
            None => self.evaluate(&self.query)?,
        };
        Ok(self.cache.insert(result))
    }

    /// Evaluate the state reached by assuming `lit`, without committing it.
    pub fn lookahead(&self, lit: Lit) -> Result<Child, Error> {
        let query = self.substrate.query(&[lit]);
        let result = match query.is_closed() {
            true => None,
            false => Some(self.evaluate(&query)?),
        };
        Ok(Child { lit, query, result })
    }

    /// [`lookahead`](Self::lookahead) on every literal, in parallel, in order.
    pub fn lookaheads(&self, lits: &[Lit]) -> Result<Vec<Child>, Error> {
        lits.par_iter().map(|lit| self.lookahead(*lit)).collect()
    }

    /// Commit `lit` and recompute the state from the substrate.
    pub fn extend(&mut self, lit: Lit) {
        self.substrate.add(&[lit]);
        self.status = self.substrate.check(&[]);
        self.query = self.substrate.query(&[]);
        self.cache = None;
    }

    /// Commit an evaluated child, adopting its query and oracle answer.
    pub fn commit(&mut self, child: Child) {
        self.substrate.add(&[child.lit]);
        self.status = self.substrate.check(&[]);
        self.query = child.query;
        self.cache = child.result;
    }

    /// The substrate's deterministic one-step probe at the current state.
    pub fn probe(&self, heuristic: Heuristic) -> (Status, Vec<Lit>) {
        self.substrate.cube(&[], heuristic)
    }

    fn evaluate(&self, query: &SearchQuery) -> Result<QueryResult, Error> {
        let problem = self.substrate.problem();
        self.calls.fetch_add(1, Ordering::Relaxed);
        let result = self
            .oracle
            .query(problem.n_vars(), problem.n_clauses(), query.cells())?;
        match result.logits.len() == problem.n_vars() {
            true => Ok(result),
            false => Err(Error::OracleUnavailable(format!(
                "expected {} logits, got {}",
                problem.n_vars(),
                result.logits.len()
            ))),
        }
    }
}
