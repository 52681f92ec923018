use crate::*;
use std::path::PathBuf;

/// Settings for one actor process. The policy is selected by `kind`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ActorConfig {
    /// Directory of DIMACS files, loaded recursively at startup.
    pub problems: PathBuf,
    /// Report datapoints to the replay buffer. Off for evaluation-only actors.
    #[serde(default = "yes")]
    pub train: bool,
    /// Pull weights before every decision instead of once per episode.
    #[serde(default)]
    pub pull_every_step: bool,
    #[serde(flatten)]
    pub policy: PolicyConfig,
}

fn yes() -> bool {
    true
}

impl ActorConfig {
    pub fn validate(&self) -> Result<(), Error> {
        self.policy.validate()
    }
}

/// The closed set of episode policies.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PolicyConfig {
    Lookahead(LookaheadConfig),
    Asat(AsatConfig),
}

impl PolicyConfig {
    pub fn validate(&self) -> Result<(), Error> {
        match self {
            Self::Lookahead(c) => c.validate(),
            Self::Asat(c) => c.validate(),
        }
    }
}

/// Symmetric Dirichlet exploration noise on root priors.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DirichletConfig {
    /// Mixture weight of the noise.
    pub epsilon: f32,
    /// Total concentration; each component gets `ascale / n`.
    pub ascale: f32,
}

impl Default for DirichletConfig {
    fn default() -> Self {
        Self {
            epsilon: DIRICHLET_EPSILON,
            ascale: DIRICHLET_ASCALE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LookaheadConfig {
    /// Number of promising candidates evaluated per decision.
    pub width: usize,
    pub dirichlet: DirichletConfig,
    pub prior_tau: f32,
    pub posterior_tau: f32,
    /// Convex weight of the prior score against the posterior score.
    pub prior_weight: f32,
    /// Run the deterministic probe before every decision.
    pub try_probe: bool,
    /// Add the probe's variable to the candidate set. Requires `try_probe`.
    pub consider_probe: bool,
    pub probe: Heuristic,
}

impl Default for LookaheadConfig {
    fn default() -> Self {
        Self {
            width: LOOKAHEAD_WIDTH,
            dirichlet: DirichletConfig::default(),
            prior_tau: PRIOR_TAU,
            posterior_tau: POSTERIOR_TAU,
            prior_weight: PRIOR_WEIGHT,
            try_probe: false,
            consider_probe: false,
            probe: Heuristic::default(),
        }
    }
}

impl LookaheadConfig {
    pub fn validate(&self) -> Result<(), Error> {
        let fail = |s: &str| -> Result<(), Error> { Err(Error::Configuration(s.to_string())) };
        match self {
            c if c.width == 0 => fail("lookahead width must be positive"),
            c if !(0. ..=1.).contains(&c.prior_weight) => fail("prior_weight must be in [0, 1]"),
            c if !(0. ..=1.).contains(&c.dirichlet.epsilon) => {
                fail("dirichlet epsilon must be in [0, 1]")
            }
            c if c.dirichlet.epsilon > 0. && !(c.dirichlet.ascale > 0.) => {
                fail("dirichlet ascale must be positive when epsilon > 0")
            }
            c if c.consider_probe && !c.try_probe => fail("consider_probe requires try_probe"),
            _ => Ok(()),
        }
    }
}

/// Cuber × brancher policy family; one of each is drawn per episode.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AsatConfig {
    pub cubers: Vec<CuberConfig>,
    pub branchers: Vec<BrancherConfig>,
}

impl AsatConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.cubers.is_empty() {
            return Err(Error::Configuration("asat actor needs at least one cuber".into()));
        }
        if self.branchers.is_empty() {
            return Err(Error::Configuration("asat actor needs at least one brancher".into()));
        }
        for cuber in self.cubers.iter() {
            if let CuberKind::Probe { heuristics } = &cuber.kind {
                if heuristics.is_empty() {
                    return Err(Error::Configuration(format!(
                        "probe cuber '{}' lists no heuristics",
                        cuber.name
                    )));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CuberConfig {
    pub name: String,
    #[serde(flatten)]
    pub kind: CuberKind,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum CuberKind {
    Random,
    Probe { heuristics: Vec<Heuristic> },
    Neuro { tau: f32 },
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BrancherConfig {
    pub name: String,
    #[serde(flatten)]
    pub kind: BrancherKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum BrancherKind {
    Random,
    NeuroIs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookahead_kind_dispatch() {
        let config = serde_json::from_str::<ActorConfig>(
            r#"{ "problems": "data", "kind": "lookahead", "width": 8, "dirichlet": { "epsilon": 0.0 } }"#,
        )
        .unwrap();
        assert!(config.train);
        match config.policy {
            PolicyConfig::Lookahead(ref c) => {
                assert_eq!(c.width, 8);
                assert_eq!(c.dirichlet.epsilon, 0.);
                assert_eq!(c.dirichlet.ascale, DIRICHLET_ASCALE);
            }
            PolicyConfig::Asat(_) => panic!("expected lookahead"),
        }
        assert!(config.validate().is_ok());
    }

    #[test]
    fn asat_kind_dispatch() {
        let config = serde_json::from_str::<ActorConfig>(
            r#"{
                "problems": "data", "kind": "asat", "train": false,
                "cubers": [
                    { "name": "rand", "kind": "random" },
                    { "name": "march", "kind": "probe", "heuristics": ["occurrence", "jeroslow-wang"] },
                    { "name": "nn", "kind": "neuro", "tau": 2.0 }
                ],
                "branchers": [{ "name": "is", "kind": "neuro-is" }]
            }"#,
        )
        .unwrap();
        match config.policy {
            PolicyConfig::Asat(ref c) => {
                assert_eq!(c.cubers.len(), 3);
                assert_eq!(c.cubers[2].kind, CuberKind::Neuro { tau: 2. });
                assert_eq!(c.branchers[0].kind, BrancherKind::NeuroIs);
            }
            PolicyConfig::Lookahead(_) => panic!("expected asat"),
        }
        assert!(!config.train);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!(
            serde_json::from_str::<ActorConfig>(r#"{ "problems": "data", "kind": "mcts" }"#)
                .is_err()
        );
    }

    #[test]
    fn consider_probe_requires_probe() {
        let config = LookaheadConfig {
            consider_probe: true,
            ..LookaheadConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }
}
