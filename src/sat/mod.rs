//! Propositional substrate: variables, literals, problems, and the
//! assumption-based search engine interface episodes run against.
//!
//! ## Core Types
//!
//! - [`Problem`] — CNF formula, parsed from DIMACS
//! - [`SearchQuery`] — free variables + literal–clause incidence for the oracle
//! - [`Substrate`] — check / cube / query / push / pop engine interface
//! - [`Propagator`] — reference unit-propagation substrate
//! - [`Corpus`] — problem pool sampled uniformly per episode
mod corpus;
mod lit;
mod problem;
mod propagator;
mod query;
mod status;
mod substrate;
mod var;

pub use corpus::*;
pub use lit::*;
pub use problem::*;
pub use propagator::*;
pub use query::*;
pub use status::*;
pub use substrate::*;
pub use var::*;

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Two independent copies of the complete 2-variable clause set.
    /// Root propagation cannot refute it; any single decision can.
    pub fn twin_xor() -> Problem {
        Problem::try_from(
            "p cnf 4 8\n1 2 0\n1 -2 0\n-1 2 0\n-1 -2 0\n3 4 0\n3 -4 0\n-3 4 0\n-3 -4 0\n",
        )
        .unwrap()
    }

    /// `pigeons` into `holes`; unsatisfiable whenever pigeons > holes.
    pub fn pigeonhole(pigeons: usize, holes: usize) -> Problem {
        let var = |p: usize, h: usize| Var::from(p * holes + h);
        let mut clauses = (0..pigeons)
            .map(|p| (0..holes).map(|h| Lit::from((var(p, h), false))).collect())
            .collect::<Vec<Clause>>();
        for h in 0..holes {
            for p in 0..pigeons {
                for q in p + 1..pigeons {
                    clauses.push(vec![
                        Lit::from((var(p, h), true)),
                        Lit::from((var(q, h), true)),
                    ]);
                }
            }
        }
        Problem::new(pigeons * holes, clauses)
    }
}
