//! Self-play workers.
mod actor;
mod pool;

pub use actor::*;
pub use pool::*;
