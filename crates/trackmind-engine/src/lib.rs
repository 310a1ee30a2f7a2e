//! Core simulation types for trackmind racing.
//!
//! This crate has no randomness and no I/O. It provides the geometry, the
//! discrete action set, the state discretizer, the kinematic vehicle model,
//! track definitions and the scripted waypoint follower used by the
//! evaluator and training crates.

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum TrackError {
    #[display("track needs at least {min} checkpoints, got {count}")]
    TooFewCheckpoints { count: usize, min: usize },
    #[display("start point coincides with the first checkpoint")]
    StartOnFirstCheckpoint,
    #[display("track coordinates must be finite")]
    NonFiniteCoordinate,
    #[display("invalid ring radii: inner {inner_radius}, outer {outer_radius}")]
    InvalidRing { inner_radius: f32, outer_radius: f32 },
}
