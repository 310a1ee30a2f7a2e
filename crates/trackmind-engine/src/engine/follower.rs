//! Scripted driver that follows a list of literal waypoints.

use serde::{Deserialize, Serialize};

use crate::core::{Vec2, signed_angle_diff};

use super::{track::Track, vehicle::VehicleState};

/// Constants for the scripted waypoint-following driver.
///
/// The follower is gentler than the trained cars: it turns at most 2° per
/// step and tops out at 3.5.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowerParams {
    /// Maximum heading change per step, in degrees.
    pub turn_step: f32,
    pub acceleration: f32,
    pub deceleration: f32,
    pub max_speed: f32,
    /// Distance under which the current waypoint counts as reached.
    pub capture_radius: f32,
    /// Distance under which the follower brakes instead of accelerating.
    pub slow_radius: f32,
}

impl Default for FollowerParams {
    fn default() -> Self {
        Self {
            turn_step: 2.0,
            acceleration: 0.12,
            deceleration: 0.08,
            max_speed: 3.5,
            capture_radius: 15.0,
            slow_radius: 20.0,
        }
    }
}

/// What to do after the last waypoint.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant,
)]
#[serde(rename_all = "snake_case")]
pub enum FollowMode {
    /// Wrap around and keep lapping.
    #[default]
    Loop,
    /// Stop once every waypoint has been visited.
    Once,
}

/// Progress of a follower along a waypoint list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowerState {
    pub vehicle: VehicleState,
    next_waypoint: usize,
    visited: usize,
    collisions: usize,
    finished: bool,
}

impl FollowerState {
    /// Starts at `position` facing 0°, heading for waypoint `first_waypoint`.
    ///
    /// The index wraps around the waypoint list on the first step.
    #[must_use]
    pub fn new(position: Vec2, first_waypoint: usize) -> Self {
        Self {
            vehicle: VehicleState::at_start(position),
            next_waypoint: first_waypoint,
            visited: 0,
            collisions: 0,
            finished: false,
        }
    }

    #[must_use]
    pub fn next_waypoint(&self) -> usize {
        self.next_waypoint
    }

    /// Total number of waypoints reached, across laps.
    #[must_use]
    pub fn visited(&self) -> usize {
        self.visited
    }

    #[must_use]
    pub fn collisions(&self) -> usize {
        self.collisions
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

/// Result of one follower step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FollowStep {
    pub reached_waypoint: bool,
    pub collided: bool,
}

/// Summary of a follower run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowOutcome {
    pub steps: usize,
    pub waypoints_visited: usize,
    pub laps: usize,
    pub collisions: usize,
    pub finished: bool,
}

/// Scripted driver that steers straight at literal waypoints.
///
/// Each step the follower turns towards the current waypoint by at most
/// [`FollowerParams::turn_step`], accelerates while far from it and brakes
/// when close, then moves. A move that would leave the track boundary is
/// reverted and counted as a collision.
///
/// # Example
///
/// ```
/// use trackmind_engine::{FollowMode, Track, WaypointFollower};
///
/// let track = Track::default_ring();
/// let waypoints = track.ring_waypoints(10.0).unwrap();
/// let follower = WaypointFollower::new(Default::default(), FollowMode::Once);
/// let outcome = follower.run(&track, &waypoints, 10_000);
/// assert!(outcome.finished);
/// ```
#[derive(Debug, Clone, Default)]
pub struct WaypointFollower {
    params: FollowerParams,
    mode: FollowMode,
}

impl WaypointFollower {
    #[must_use]
    pub fn new(params: FollowerParams, mode: FollowMode) -> Self {
        Self { params, mode }
    }

    #[must_use]
    pub fn params(&self) -> &FollowerParams {
        &self.params
    }

    #[must_use]
    pub fn mode(&self) -> FollowMode {
        self.mode
    }

    /// Initial state at the track start, aiming for the waypoint nearest to it.
    #[must_use]
    pub fn start(&self, track: &Track, waypoints: &[Vec2]) -> FollowerState {
        let start = track.start();
        let first = waypoints
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.distance(start).total_cmp(&b.distance(start)))
            .map_or(0, |(i, _)| i);
        FollowerState::new(start, first)
    }

    /// Advances the follower by one step.
    pub fn step(&self, state: &mut FollowerState, track: &Track, waypoints: &[Vec2]) -> FollowStep {
        let mut result = FollowStep::default();
        if state.finished || waypoints.is_empty() {
            state.finished = true;
            return result;
        }

        let p = &self.params;
        state.next_waypoint %= waypoints.len();
        let mut target = waypoints[state.next_waypoint];
        if state.vehicle.position.distance(target) < p.capture_radius {
            result.reached_waypoint = true;
            state.visited += 1;
            state.next_waypoint = (state.next_waypoint + 1) % waypoints.len();
            if self.mode.is_once() && state.visited >= waypoints.len() {
                state.finished = true;
                return result;
            }
            target = waypoints[state.next_waypoint];
        }

        let vehicle = &mut state.vehicle;
        let desired = vehicle.position.heading_deg_to(target);
        let diff = signed_angle_diff(vehicle.orientation, desired);
        vehicle.turn_by(diff.clamp(-p.turn_step, p.turn_step));

        if vehicle.position.distance(target) > p.slow_radius {
            vehicle.change_speed(p.acceleration, p.max_speed);
        } else {
            vehicle.change_speed(-p.deceleration, p.max_speed);
        }

        let next = vehicle.peek_advance();
        if track.is_on_track(next) {
            vehicle.position = next;
        } else {
            result.collided = true;
            state.collisions += 1;
        }
        result
    }

    /// Runs up to `max_steps` steps (or until finished in [`FollowMode::Once`]).
    #[must_use]
    pub fn run(&self, track: &Track, waypoints: &[Vec2], max_steps: usize) -> FollowOutcome {
        self.run_with(track, waypoints, max_steps, |_| {})
    }

    /// Like [`run`](Self::run), also returning every position visited.
    #[must_use]
    pub fn run_with_path(
        &self,
        track: &Track,
        waypoints: &[Vec2],
        max_steps: usize,
    ) -> (FollowOutcome, Vec<Vec2>) {
        let mut path = vec![track.start()];
        let outcome = self.run_with(track, waypoints, max_steps, |state| {
            path.push(state.vehicle.position);
        });
        (outcome, path)
    }

    fn run_with<F>(
        &self,
        track: &Track,
        waypoints: &[Vec2],
        max_steps: usize,
        mut on_step: F,
    ) -> FollowOutcome
    where
        F: FnMut(&FollowerState),
    {
        let mut state = self.start(track, waypoints);
        let mut steps = 0;
        while steps < max_steps && !state.finished {
            self.step(&mut state, track, waypoints);
            if state.finished {
                break;
            }
            steps += 1;
            on_step(&state);
        }
        FollowOutcome {
            steps,
            waypoints_visited: state.visited,
            laps: state.visited.checked_div(waypoints.len()).unwrap_or(0),
            collisions: state.collisions,
            finished: state.finished,
        }
    }
}
