use crate::*;
use rand::Rng;

/// Cuber × brancher policy family. Every episode draws one cuber and one
/// brancher from the configured repertoire and plays them to the end.
#[derive(Debug, Clone)]
pub struct AsatPolicy {
    cubers: Vec<Cuber>,
    branchers: Vec<Brancher>,
    scale: Scale,
    cuber: usize,
    brancher: usize,
}

impl AsatPolicy {
    pub fn new(config: AsatConfig, scale: Scale) -> Self {
        Self {
            cubers: config.cubers.into_iter().map(Cuber::from).collect(),
            branchers: config.branchers.into_iter().map(Brancher::from).collect(),
            scale,
            cuber: 0,
            brancher: 0,
        }
    }
    pub fn begin<R: Rng>(&mut self, rng: &mut R) {
        self.cuber = rng.random_range(0..self.cubers.len());
        self.brancher = rng.random_range(0..self.branchers.len());
    }
    pub fn names(&self) -> (String, String) {
        (
            self.cubers[self.cuber].name().to_string(),
            self.branchers[self.brancher].name().to_string(),
        )
    }
    pub fn decide<R: Rng>(
        &self,
        state: &mut SearchState,
        rng: &mut R,
    ) -> Result<Option<Decision>, Error> {
        if state.free_variables().is_empty() {
            return Ok(None);
        }
        let cuber = &self.cubers[self.cuber];
        let var = match cuber.cube(state, rng)? {
            Some(var) => var,
            None => {
                log::debug!("[{}] cuber resolved the instance", cuber.name());
                return Ok(None);
            }
        };
        let branch = self.branchers[self.brancher].branch(state, var, self.scale, rng)?;
        let decision = Decision {
            query: state.current().clone(),
            lit: branch.lit,
            p: branch.p,
        };
        match branch.child {
            Some(child) => state.commit(child),
            None => state.extend(branch.lit),
        }
        Ok(Some(decision))
    }
}
