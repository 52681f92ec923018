use super::*;

/// Reference substrate: unit propagation to fixpoint, nothing more.
///
/// `check` refutes the formula or satisfies every clause by propagation
/// alone; anything else is `Unknown`.
#[derive(Debug, Clone)]
pub struct Propagator {
    problem: Problem,
    committed: Vec<Lit>,
    frames: Vec<usize>,
    core: Vec<Lit>,
}

/// Per-variable truth values; `None` is unassigned.
type Assignment = Vec<Option<bool>>;

enum Clausal {
    Satisfied,
    Falsified,
    Unit(Lit),
    Open,
}

impl From<Problem> for Propagator {
    fn from(problem: Problem) -> Self {
        Self {
            problem,
            committed: Vec::new(),
            frames: Vec::new(),
            core: Vec::new(),
        }
    }
}

impl Propagator {
    pub fn committed(&self) -> &[Lit] {
        &self.committed
    }

    fn value(assignment: &Assignment, lit: &Lit) -> Option<bool> {
        assignment[lit.var().idx()].map(|v| v != lit.sign())
    }

    fn classify(assignment: &Assignment, clause: &Clause) -> Clausal {
        let mut open = None;
        let mut count = 0;
        for lit in clause.iter() {
            match Self::value(assignment, lit) {
                Some(true) => return Clausal::Satisfied,
                Some(false) => continue,
                None => {
                    open = Some(*lit);
                    count += 1;
                }
            }
        }
        match (count, open) {
            (0, _) => Clausal::Falsified,
            (1, Some(lit)) => Clausal::Unit(lit),
            _ => Clausal::Open,
        }
    }

    /// Assign `lit`; false on contradiction with an existing value.
    fn assign(assignment: &mut Assignment, lit: &Lit) -> bool {
        match Self::value(assignment, lit) {
            Some(v) => v,
            None => {
                assignment[lit.var().idx()] = Some(!lit.sign());
                true
            }
        }
    }

    /// Propagate committed literals plus `assumptions`. `None` on conflict.
    fn propagate(&self, assumptions: &[Lit]) -> Option<Assignment> {
        let mut assignment = vec![None; self.problem.n_vars()];
        for lit in self.committed.iter().chain(assumptions.iter()) {
            if !Self::assign(&mut assignment, lit) {
                return None;
            }
        }
        loop {
            let mut changed = false;
            for clause in self.problem.clauses() {
                match Self::classify(&assignment, clause) {
                    Clausal::Falsified => return None,
                    Clausal::Satisfied | Clausal::Open => continue,
                    Clausal::Unit(lit) => {
                        Self::assign(&mut assignment, &lit);
                        changed = true;
                    }
                }
            }
            if !changed {
                return Some(assignment);
            }
        }
    }

    /// Unsatisfied clauses with at least two unassigned literals, by index.
    fn open(&self, assignment: &Assignment) -> Vec<(usize, Vec<Lit>)> {
        self.problem
            .clauses()
            .iter()
            .enumerate()
            .filter(|(_, clause)| {
                !clause
                    .iter()
                    .any(|lit| Self::value(assignment, lit) == Some(true))
            })
            .map(|(c, clause)| {
                (
                    c,
                    clause
                        .iter()
                        .filter(|lit| Self::value(assignment, lit).is_none())
                        .copied()
                        .collect::<Vec<_>>(),
                )
            })
            .filter(|(_, lits)| lits.len() > 1)
            .collect()
    }

    fn score(&self, assignment: &Assignment, heuristic: Heuristic) -> Option<Var> {
        let n = self.problem.n_vars();
        let mut pos = vec![0f32; n];
        let mut neg = vec![0f32; n];
        for (_, lits) in self.open(assignment) {
            let weight = match heuristic {
                Heuristic::JeroslowWang => (-(lits.len() as f32)).exp2(),
                Heuristic::Occurrence | Heuristic::Product => 1.,
            };
            for lit in lits.iter() {
                match lit.sign() {
                    false => pos[lit.var().idx()] += weight,
                    true => neg[lit.var().idx()] += weight,
                }
            }
        }
        (0..n)
            .filter(|v| pos[*v] + neg[*v] > 0.)
            .map(|v| match heuristic {
                Heuristic::Product => (v, pos[v] * neg[v] + pos[v] + neg[v]),
                Heuristic::Occurrence | Heuristic::JeroslowWang => (v, pos[v] + neg[v]),
            })
            .fold(None, |best: Option<(usize, f32)>, (v, s)| match best {
                Some((_, b)) if b >= s => best,
                _ => Some((v, s)),
            })
            .map(|(v, _)| Var::from(v))
    }

    fn satisfied(&self, assignment: &Assignment) -> bool {
        self.problem
            .clauses()
            .iter()
            .all(|clause| matches!(Self::classify(assignment, clause), Clausal::Satisfied))
    }
}

impl Substrate for Propagator {
    fn problem(&self) -> &Problem {
        &self.problem
    }
    fn check(&mut self, assumptions: &[Lit]) -> Status {
        match self.propagate(assumptions) {
            None => {
                self.core = assumptions.to_vec();
                Status::Unsat
            }
            Some(ref assignment) if self.satisfied(assignment) => Status::Sat,
            Some(_) => Status::Unknown,
        }
    }
    fn add(&mut self, lits: &[Lit]) {
        self.committed.extend_from_slice(lits);
    }
    fn push(&mut self) {
        self.frames.push(self.committed.len());
    }
    fn pop(&mut self) {
        if let Some(len) = self.frames.pop() {
            self.committed.truncate(len);
        }
    }
    fn unsat_core(&self) -> Vec<Lit> {
        self.core.clone()
    }
    fn cube(&self, assumptions: &[Lit], heuristic: Heuristic) -> (Status, Vec<Lit>) {
        let ref assignment = match self.propagate(assumptions) {
            None => return (Status::Unsat, vec![]),
            Some(a) => a,
        };
        if self.satisfied(assignment) {
            return (Status::Sat, vec![]);
        }
        let var = match self.score(assignment, heuristic) {
            None => return (Status::Unknown, vec![]),
            Some(var) => var,
        };
        let pos = Lit::from((var, false));
        let neg = Lit::from((var, true));
        let fails = |lit: Lit| {
            self.propagate(&assumptions.iter().copied().chain([lit]).collect::<Vec<_>>())
                .is_none()
        };
        match (fails(pos), fails(neg)) {
            (true, true) => (Status::Unsat, vec![]),
            (true, false) => (Status::Unknown, vec![neg]),
            (false, true) => (Status::Unknown, vec![pos]),
            (false, false) => (Status::Unknown, vec![pos, neg]),
        }
    }
    fn query(&self, assumptions: &[Lit]) -> SearchQuery {
        let ref assignment = match self.propagate(assumptions) {
            None => return SearchQuery::default(),
            Some(a) => a,
        };
        let n = self.problem.n_vars();
        let mut free = std::collections::BTreeSet::new();
        let mut cells = Vec::new();
        for (c, lits) in self.open(assignment) {
            for lit in lits {
                free.insert(lit.var());
                cells.push((lit.index(n) as u32, c as u32));
            }
        }
        SearchQuery::new(free.into_iter().collect(), cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::fixtures::twin_xor;

    fn lit(i: i32) -> Lit {
        Lit::try_from(i).unwrap()
    }

    #[test]
    fn root_is_unknown_with_all_vars_free() {
        let mut s = Propagator::from(twin_xor());
        assert_eq!(s.check(&[]), Status::Unknown);
        let q = s.query(&[]);
        assert_eq!(q.free().len(), 4);
        assert_eq!(q.cells().len(), 16);
    }

    #[test]
    fn single_decision_refutes() {
        let mut s = Propagator::from(twin_xor());
        assert_eq!(s.check(&[lit(1)]), Status::Unsat);
        assert_eq!(s.unsat_core(), vec![lit(1)]);
        assert!(s.query(&[lit(-3)]).is_closed());
    }

    #[test]
    fn probe_detects_refutation() {
        let s = Propagator::from(twin_xor());
        assert_eq!(s.cube(&[], Heuristic::Occurrence).0, Status::Unsat);
    }

    #[test]
    fn probe_splits_open_variable() {
        let s = Propagator::from(Problem::try_from("p cnf 3 2\n1 2 3 0\n-1 -2 0\n").unwrap());
        let (status, lits) = s.cube(&[], Heuristic::Occurrence);
        assert_eq!(status, Status::Unknown);
        assert_eq!(lits.len(), 2);
        assert_eq!(lits[0].flip(), lits[1]);
    }

    #[test]
    fn satisfied_formula_reports_sat() {
        let mut s = Propagator::from(Problem::try_from("p cnf 2 1\n1 2 0\n").unwrap());
        s.add(&[lit(1)]);
        assert_eq!(s.check(&[]), Status::Sat);
        assert!(s.query(&[]).is_closed());
    }

    #[test]
    fn pop_restores_committed_literals() {
        let mut s = Propagator::from(twin_xor());
        s.push();
        s.add(&[lit(1)]);
        assert_eq!(s.check(&[]), Status::Unsat);
        s.pop();
        assert_eq!(s.check(&[]), Status::Unknown);
        assert!(s.committed().is_empty());
    }

    #[test]
    fn units_are_propagated_out_of_the_query() {
        let s = Propagator::from(Problem::try_from("p cnf 3 2\n-1 0\n1 2 3 0\n").unwrap());
        let q = s.query(&[]);
        assert_eq!(q.free(), &[Var::from(1u32), Var::from(2u32)]);
        assert_eq!(q.cells(), &[(1, 1), (2, 1)]);
    }
}
