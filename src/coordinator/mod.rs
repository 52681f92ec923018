//! The training side of a run, and the interface actors see it through.
mod coordinator;
mod server;

pub use coordinator::*;
pub use server::*;
