use crate::*;

/// The log2 reparametrization shared by targets and oracle values.
///
/// `scaled(E) = log2(E) · s`, so a value `v` corresponds to `2^(v / s)` steps.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Scale(f32);

impl From<f32> for Scale {
    fn from(s: f32) -> Self {
        Self(s)
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self(LOG_ESTEPS_SCALE)
    }
}

impl Scale {
    pub fn scaled(&self, esteps: Esteps) -> f32 {
        esteps.log2() * self.0
    }
    pub fn esteps(&self, scaled: f32) -> Esteps {
        (scaled / self.0).exp2()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverse_pair() {
        let scale = Scale::from(3.);
        assert!((scale.scaled(8.) - 9.).abs() < 1e-6);
        assert!((scale.esteps(scale.scaled(11.)) - 11.).abs() < 1e-4);
        assert_eq!(scale.scaled(1.), 0.);
    }
}
