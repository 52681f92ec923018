use super::*;

/// A literal. `sign == true` means the variable is negated.
///
/// Branch value `b` on variable `v` is the literal `Lit::from((v, b))`,
/// so branch `false` asserts `v` and branch `true` asserts `¬v`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct Lit {
    var: Var,
    sign: bool,
}

impl Lit {
    pub fn var(&self) -> Var {
        self.var
    }
    pub fn sign(&self) -> bool {
        self.sign
    }
    pub fn flip(&self) -> Self {
        Self {
            var: self.var,
            sign: !self.sign,
        }
    }
    /// Row of this literal in the incidence structure: positives first, then negatives.
    pub fn index(&self, n_vars: usize) -> usize {
        self.var.idx() + if self.sign { n_vars } else { 0 }
    }
    /// Signed 1-indexed DIMACS form.
    pub fn ilit(&self) -> i32 {
        let i = self.var.idx() as i32 + 1;
        if self.sign { -i } else { i }
    }
}

impl From<(Var, bool)> for Lit {
    fn from((var, sign): (Var, bool)) -> Self {
        Self { var, sign }
    }
}

impl TryFrom<i32> for Lit {
    type Error = crate::Error;
    fn try_from(ilit: i32) -> Result<Self, Self::Error> {
        match ilit {
            0 => Err(crate::Error::Parse("literal 0 is a clause terminator".into())),
            i => Ok(Self {
                var: Var::from(i.unsigned_abs() - 1),
                sign: i < 0,
            }),
        }
    }
}

impl std::fmt::Display for Lit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.sign {
            write!(f, "¬{}", self.var)
        } else {
            write!(f, "{}", self.var)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bijective_ilit() {
        for i in [-7, -1, 1, 3] {
            assert_eq!(Lit::try_from(i).unwrap().ilit(), i);
        }
    }

    #[test]
    fn negatives_follow_positives() {
        let x = Var::from(2u32);
        assert_eq!(Lit::from((x, false)).index(5), 2);
        assert_eq!(Lit::from((x, true)).index(5), 7);
        assert_eq!(Lit::from((x, true)).flip(), Lit::from((x, false)));
    }
}
