use crate::*;

/// A homogeneous group of `n` actors sharing one configuration.
/// `n` defaults to one actor per core.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ActorGroup {
    #[serde(default = "cores")]
    pub n: usize,
    #[serde(flatten)]
    pub actor: ActorConfig,
}

#[cfg(feature = "server")]
fn cores() -> usize {
    num_cpus::get()
}
#[cfg(not(feature = "server"))]
fn cores() -> usize {
    1
}

/// Everything needed to launch the actor side of a run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ClientConfig {
    pub actors: Vec<ActorGroup>,
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.actors.iter().map(|g| g.n).sum::<usize>() == 0 {
            return Err(Error::Configuration("client launches no actors".into()));
        }
        self.actors.iter().try_for_each(|g| g.actor.validate())
    }
    pub fn count(&self) -> usize {
        self.actors.iter().map(|g| g.n).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexes_across_groups() {
        let config = serde_json::from_str::<ClientConfig>(
            r#"{ "actors": [
                { "n": 2, "problems": "a", "kind": "lookahead" },
                { "n": 1, "problems": "b", "kind": "asat",
                  "cubers": [{ "name": "r", "kind": "random" }],
                  "branchers": [{ "name": "r", "kind": "random" }] }
            ] }"#,
        )
        .unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.count(), 3);
        assert_eq!(config.actors[0].actor.problems.to_str(), Some("a"));
        assert_eq!(config.actors[1].actor.problems.to_str(), Some("b"));
    }

    #[test]
    fn group_size_defaults_to_cores() {
        let group = serde_json::from_str::<ActorGroup>(r#"{ "problems": "a", "kind": "lookahead" }"#)
            .unwrap();
        assert!(group.n >= 1);
    }
}
