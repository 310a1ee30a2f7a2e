//! Vehicle dynamics, tracks and the scripted waypoint driver.
//!
//! - [`VehicleState`] / [`VehicleParams`] - Kinematic model stepped by one [`Action`](crate::Action) at a time
//! - [`Track`] / [`Boundary`] - Validated checkpoint sequences, optionally bounded
//! - [`WaypointFollower`] - Driver that steers directly at literal points
//!
//! Everything here is deterministic: the same inputs always produce the same
//! trajectory, which the training crates rely on for reproducible fitness.

pub use self::{follower::*, track::*, vehicle::*};

mod follower;
mod track;
mod vehicle;
