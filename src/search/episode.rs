use crate::*;
use rand::Rng;

/// Drive `policy` from `state` until the substrate reaches a definite status.
///
/// `before` runs ahead of every decision; actors use it to pull fresh weights.
/// A satisfiable outcome aborts the episode with
/// [`Error::UnexpectedSatisfiable`].
pub fn play<R, F>(
    state: &mut SearchState,
    policy: &Policy,
    rng: &mut R,
    mut before: F,
) -> Result<Trajectory, Error>
where
    R: Rng,
    F: FnMut(&mut SearchState) -> Result<(), Error>,
{
    let mut trajectory = Trajectory::new();
    loop {
        match state.status() {
            Status::Unsat => return Ok(trajectory),
            Status::Sat => {
                return Err(Error::UnexpectedSatisfiable(format!(
                    "model found after {} decisions",
                    trajectory.len()
                )));
            }
            Status::Unknown => {}
        }
        before(state)?;
        match policy.decide(state, rng)? {
            Some(decision) => trajectory.push(decision),
            None => return Ok(trajectory),
        }
    }
}
