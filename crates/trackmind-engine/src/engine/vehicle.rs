//! Kinematic vehicle model.
//!
//! A car is a position, a heading in screen-space degrees and a scalar speed.
//! Trained policies step it one [`Action`] at a time; the follower drives the
//! lower-level primitives directly.

use serde::{Deserialize, Serialize};

use crate::core::{Action, StateBin, Vec2, normalize_degrees};

/// Per-step constants of the kinematic vehicle model.
///
/// The defaults match the training cars: 5° per steering step, ±0.2 speed per
/// accelerate/brake step, a top speed of 5 and a 1% speed decay when coasting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleParams {
    /// Degrees turned per steering step.
    pub turn_rate: f32,
    /// Speed gained per accelerate step.
    pub acceleration: f32,
    /// Speed lost per brake step.
    pub deceleration: f32,
    /// Fraction of `acceleration` gained while steering.
    pub turn_boost: f32,
    /// Multiplicative speed factor applied on [`Action::Noop`].
    pub noop_decay: f32,
    pub max_speed: f32,
}

impl Default for VehicleParams {
    fn default() -> Self {
        Self {
            turn_rate: 5.0,
            acceleration: 0.2,
            deceleration: 0.2,
            turn_boost: 0.5,
            noop_decay: 0.99,
            max_speed: 5.0,
        }
    }
}

/// Kinematic state of a single car.
///
/// `orientation` is kept in `[0, 360)` degrees and `speed` in
/// `[0, max_speed]` by every mutating operation.
///
/// # Example
///
/// ```
/// use trackmind_engine::{Action, Vec2, VehicleParams, VehicleState};
///
/// let params = VehicleParams::default();
/// let state = VehicleState::at_start(Vec2::ZERO)
///     .apply_action(Action::Accelerate, &params)
///     .apply_action(Action::Accelerate, &params);
/// assert!((state.speed - 0.4).abs() < 1e-6);
/// assert!(state.position.x > 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    pub position: Vec2,
    pub orientation: f32,
    pub speed: f32,
}

impl VehicleState {
    /// A stationary car facing 0° at `position`.
    #[must_use]
    pub const fn at_start(position: Vec2) -> Self {
        Self {
            position,
            orientation: 0.0,
            speed: 0.0,
        }
    }

    /// Discretized view of this state.
    #[must_use]
    pub fn state_bin(&self) -> StateBin {
        StateBin::from_continuous(self.orientation, self.speed)
    }

    /// Applies one action and advances the position by one step.
    #[must_use]
    pub fn apply_action(mut self, action: Action, params: &VehicleParams) -> Self {
        match action {
            Action::SteerLeft => {
                self.turn_by(-params.turn_rate);
                self.change_speed(params.acceleration * params.turn_boost, params.max_speed);
            }
            Action::SteerRight => {
                self.turn_by(params.turn_rate);
                self.change_speed(params.acceleration * params.turn_boost, params.max_speed);
            }
            Action::Accelerate => self.change_speed(params.acceleration, params.max_speed),
            Action::Brake => self.change_speed(-params.deceleration, params.max_speed),
            Action::Noop => {
                self.speed *= params.noop_decay;
                self.change_speed(0.0, params.max_speed);
            }
        }
        self.advance();
        self
    }

    /// Rotates by `degrees` (positive is clockwise on screen).
    pub fn turn_by(&mut self, degrees: f32) {
        self.orientation = normalize_degrees(self.orientation + degrees);
    }

    /// Adds `delta` to the speed, clamping into `[0, max_speed]`.
    pub fn change_speed(&mut self, delta: f32, max_speed: f32) {
        self.speed = (self.speed + delta).clamp(0.0, max_speed);
    }

    /// Moves one step along the current heading.
    pub fn advance(&mut self) {
        self.position += Vec2::from_angle_deg(self.orientation) * self.speed;
    }

    /// Position after [`advance`](Self::advance), without moving.
    #[must_use]
    pub fn peek_advance(&self) -> Vec2 {
        self.position + Vec2::from_angle_deg(self.orientation) * self.speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_steering_turns_and_boosts() {
        let params = VehicleParams::default();
        let start = VehicleState::at_start(Vec2::ZERO);

        let left = start.apply_action(Action::SteerLeft, &params);
        assert!(approx(left.orientation, 355.0));
        assert!(approx(left.speed, 0.1));

        let right = start.apply_action(Action::SteerRight, &params);
        assert!(approx(right.orientation, 5.0));
        assert!(approx(right.speed, 0.1));
    }

    #[test]
    fn test_speed_clamped_to_range() {
        let params = VehicleParams::default();
        let mut state = VehicleState::at_start(Vec2::ZERO);
        for _ in 0..100 {
            state = state.apply_action(Action::Accelerate, &params);
        }
        assert!(approx(state.speed, params.max_speed));

        for _ in 0..100 {
            state = state.apply_action(Action::Brake, &params);
        }
        assert!(approx(state.speed, 0.0));
        assert!(state.speed >= 0.0);
    }

    #[test]
    fn test_noop_decays_towards_zero() {
        let params = VehicleParams::default();
        let mut state = VehicleState {
            speed: 4.0,
            ..VehicleState::at_start(Vec2::ZERO)
        };
        let mut previous = state.speed;
        for _ in 0..2000 {
            state = state.apply_action(Action::Noop, &params);
            assert!(state.speed >= 0.0);
            assert!(state.speed <= previous);
            previous = state.speed;
        }
        assert!(state.speed < 0.01);
    }

    #[test]
    fn test_position_advances_along_heading() {
        let params = VehicleParams::default();
        let state = VehicleState {
            orientation: 90.0,
            speed: 2.0,
            ..VehicleState::at_start(Vec2::new(10.0, 10.0))
        };
        let next = state.apply_action(Action::Noop, &params);
        assert!(approx(next.position.x, 10.0));
        assert!(approx(next.position.y, 10.0 + 2.0 * 0.99));
    }

    #[test]
    fn test_orientation_wraps() {
        let params = VehicleParams::default();
        let mut state = VehicleState::at_start(Vec2::ZERO);
        for _ in 0..1000 {
            state = state.apply_action(Action::SteerRight, &params);
            assert!((0.0..360.0).contains(&state.orientation));
        }
    }
}
