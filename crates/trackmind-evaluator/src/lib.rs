//! Policy evaluation for the trackmind racing simulator.
//!
//! - [`policy`]: the [`Policy`](policy::Policy) trait and the 1080-weight
//!   [`TabularPolicy`](policy::TabularPolicy)
//! - [`simulator`]: single-episode simulation with reward shaping, used as
//!   the fitness function by every optimizer
//! - [`weights`]: random initialization and Gaussian mutation of weight vectors

pub mod policy;
pub mod simulator;
pub mod weights;
