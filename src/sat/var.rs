/// A propositional variable, 0-indexed.
///
/// DIMACS variables are 1-indexed; the conversion happens in [`Lit`](super::Lit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct Var(u32);

impl Var {
    pub fn idx(&self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for Var {
    fn from(idx: u32) -> Self {
        Self(idx)
    }
}
impl From<usize> for Var {
    fn from(idx: usize) -> Self {
        Self(idx as u32)
    }
}
impl From<Var> for u32 {
    fn from(var: Var) -> Self {
        var.0
    }
}

impl std::fmt::Display for Var {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.0)
    }
}
