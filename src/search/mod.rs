//! Episode policies over a [`SearchState`].
//!
//! ## Policies
//!
//! - [`LookaheadPolicy`] — oracle prior, one-step lookahead, cost posterior
//! - [`AsatPolicy`] — per-episode draw of a [`Cuber`] and a [`Brancher`]
//!
//! Both record one [`Decision`] per branching step. The probability of each
//! is what the esteps estimator divides by.
mod asat;
mod brancher;
mod cuber;
mod decision;
mod episode;
mod lookahead;
mod math;
mod policy;
mod state;

pub use asat::*;
pub use brancher::*;
pub use cuber::*;
pub use decision::*;
pub use episode::*;
pub use lookahead::*;
pub use math::*;
pub use policy::*;
pub use state::*;
