//! Optimizers that search for good driving.
//!
//! Two population-based optimizers search the 1080-dimensional weight space
//! of a [`TabularPolicy`](trackmind_evaluator::policy::TabularPolicy), using
//! the episode reward from
//! [`EpisodeSimulator`](trackmind_evaluator::simulator::EpisodeSimulator) as
//! fitness:
//!
//! - [`genetic`]: keep the top K, refill by cloning and mutating them
//! - [`swarm`]: particle swarm with inertia, cognitive and social terms
//!
//! Both stop as soon as a policy completes the track and return a
//! [`TrainingOutcome`](outcome::TrainingOutcome) holding the best policy seen
//! and per-generation statistics.
//!
//! [`hill_climb`] is the odd one out: it tunes the waypoints of the scripted
//! follower instead of a policy.
//!
//! # Architecture
//!
//! ```text
//! Optimizer (genetic / swarm)
//!     ↓ proposes
//! TabularPolicy
//!     ↓ drives
//! EpisodeSimulator (trackmind-evaluator)
//!     ↓ produces
//! EpisodeOutcome { total_reward, success }
//!     ↓ guides
//! Selection / particle moves
//! ```
//!
//! Every evaluation runs on the calling thread, one after another, and all
//! randomness comes from the generator passed in. A seeded generator therefore
//! reproduces a run exactly.

pub mod genetic;
pub mod hill_climb;
pub mod outcome;
pub mod stats;
pub mod swarm;
