//! From finished episodes to parameter updates.
//!
//! ## Pipeline
//!
//! - [`Estimator`] — backward esteps recursion, trajectory to [`Datapoint`]s
//! - [`ReplayBuffer`] — fixed-capacity store shared by actors and the trainer
//! - [`Learner`] — one optimization step per sampled batch
//! - [`Checkpoints`] — numbered weight snapshots with retention
//! - [`drain`] — telemetry sink and per-policy scoreboard
mod buffer;
mod checkpoint;
mod datapoint;
mod episode;
mod esteps;
mod learner;
mod telemetry;

pub use buffer::*;
pub use checkpoint::*;
pub use datapoint::*;
pub use episode::*;
pub use esteps::*;
pub use learner::*;
pub use telemetry::*;
