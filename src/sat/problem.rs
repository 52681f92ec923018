use super::*;
use std::path::Path;

pub type Clause = Vec<Lit>;

/// A CNF formula.
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    n_vars: usize,
    clauses: Vec<Clause>,
}

impl Problem {
    pub fn new(n_vars: usize, clauses: Vec<Clause>) -> Self {
        Self { n_vars, clauses }
    }
    pub fn n_vars(&self) -> usize {
        self.n_vars
    }
    pub fn n_clauses(&self) -> usize {
        self.clauses.len()
    }
    pub fn n_cells(&self) -> usize {
        self.clauses.iter().map(|c| c.len()).sum()
    }
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }
    pub fn load(path: &Path) -> Result<Self, crate::Error> {
        Self::try_from(std::fs::read_to_string(path)?.as_str())
            .map_err(|e| crate::Error::Parse(format!("{}: {}", path.display(), e)))
    }
}

/// DIMACS CNF. Clauses may span lines; `%` ends the body.
impl TryFrom<&str> for Problem {
    type Error = crate::Error;
    fn try_from(text: &str) -> Result<Self, Self::Error> {
        let mut header = None;
        let mut clauses = Vec::new();
        let mut clause = Vec::new();
        for line in text.lines().map(str::trim) {
            match line.chars().next() {
                None | Some('c') => continue,
                Some('%') => break,
                Some('p') => {
                    let tokens = line.split_whitespace().collect::<Vec<_>>();
                    match tokens.as_slice() {
                        ["p", "cnf", v, c] => {
                            header = Some((
                                v.parse::<usize>().map_err(|_| bad(line))?,
                                c.parse::<usize>().map_err(|_| bad(line))?,
                            ))
                        }
                        _ => return Err(bad(line)),
                    }
                }
                Some(_) => {
                    let (n_vars, _) = header.ok_or_else(|| bad("clause before header"))?;
                    for token in line.split_whitespace() {
                        match token.parse::<i32>().map_err(|_| bad(token))? {
                            0 => clauses.push(std::mem::take(&mut clause)),
                            i if i.unsigned_abs() as usize > n_vars => return Err(bad(token)),
                            i => clause.push(Lit::try_from(i)?),
                        }
                    }
                }
            }
        }
        if !clause.is_empty() {
            clauses.push(clause);
        }
        let (n_vars, n_clauses) = header.ok_or_else(|| bad("missing header"))?;
        if clauses.len() != n_clauses {
            log::warn!(
                "header declares {} clauses but {} were read",
                n_clauses,
                clauses.len()
            );
        }
        Ok(Self::new(n_vars, clauses))
    }
}

fn bad(s: &str) -> crate::Error {
    crate::Error::Parse(format!("malformed dimacs near '{}'", s))
}

impl std::fmt::Display for Problem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "p cnf {} {}", self.n_vars, self.n_clauses())?;
        for clause in self.clauses.iter() {
            for lit in clause.iter() {
                write!(f, "{} ", lit.ilit())?;
            }
            writeln!(f, "0")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIMACS: &str = "c tiny\np cnf 3 2\n1 -2 0\n2 3\n-1 0\n";

    #[test]
    fn parses_multiline_clauses() {
        let problem = Problem::try_from(DIMACS).unwrap();
        assert_eq!(problem.n_vars(), 3);
        assert_eq!(problem.n_clauses(), 2);
        assert_eq!(problem.n_cells(), 5);
        assert_eq!(problem.clauses()[1][2].ilit(), -1);
    }

    #[test]
    fn display_reparses() {
        let problem = Problem::try_from(DIMACS).unwrap();
        assert_eq!(Problem::try_from(problem.to_string().as_str()).unwrap(), problem);
    }

    #[test]
    fn rejects_out_of_range_literals() {
        assert!(Problem::try_from("p cnf 2 1\n1 3 0\n").is_err());
        assert!(Problem::try_from("1 2 0\n").is_err());
    }
}
