use std::ops::Mul;

use serde::{Deserialize, Serialize};

/// A point or displacement on the track plane.
///
/// The plane uses screen-style coordinates: `x` grows to the right and `y`
/// grows downwards, so a heading of 90° points "down".
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Serialize,
    Deserialize,
    derive_more::Add,
    derive_more::Sub,
    derive_more::AddAssign,
)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Vec2 {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing along `degrees`.
    ///
    /// ```
    /// use trackmind_engine::Vec2;
    ///
    /// let east = Vec2::from_angle_deg(0.0);
    /// assert_eq!(east, Vec2::new(1.0, 0.0));
    /// ```
    #[must_use]
    pub fn from_angle_deg(degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::new(cos, sin)
    }

    #[must_use]
    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        (other - self).length()
    }

    /// Absolute heading from `self` towards `target`, in degrees within (-180, 180].
    #[must_use]
    pub fn heading_deg_to(self, target: Self) -> f32 {
        let d = target - self;
        d.y.atan2(d.x).to_degrees()
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Wraps an angle into `[0, 360)`.
#[must_use]
pub fn normalize_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Signed difference `to - from`, wrapped into `(-180, 180]`.
#[must_use]
pub fn signed_angle_diff(from: f32, to: f32) -> f32 {
    let diff = normalize_degrees(to - from);
    if diff > 180.0 { diff - 360.0 } else { diff }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_distance_and_length() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(4.0, 6.0);
        assert!(approx(a.distance(b), 5.0));
        assert!(approx((b - a).length(), 5.0));
        assert_eq!(a + b, Vec2::new(5.0, 8.0));
        assert_eq!(a * 2.0, Vec2::new(2.0, 4.0));
    }

    #[test]
    fn test_heading_deg_to() {
        let origin = Vec2::ZERO;
        assert!(approx(origin.heading_deg_to(Vec2::new(1.0, 0.0)), 0.0));
        assert!(approx(origin.heading_deg_to(Vec2::new(0.0, 1.0)), 90.0));
        assert!(approx(origin.heading_deg_to(Vec2::new(-1.0, 0.0)), 180.0));
        assert!(approx(origin.heading_deg_to(Vec2::new(0.0, -1.0)), -90.0));
    }

    #[test]
    fn test_normalize_degrees() {
        assert!(approx(normalize_degrees(370.0), 10.0));
        assert!(approx(normalize_degrees(-10.0), 350.0));
        assert!(approx(normalize_degrees(720.0), 0.0));
        let tiny = normalize_degrees(-1e-9);
        assert!((0.0..360.0).contains(&tiny));
    }

    #[test]
    fn test_signed_angle_diff() {
        assert!(approx(signed_angle_diff(350.0, 10.0), 20.0));
        assert!(approx(signed_angle_diff(10.0, 350.0), -20.0));
        assert!(approx(signed_angle_diff(0.0, 180.0), 180.0));
        assert!(approx(signed_angle_diff(90.0, -90.0), 180.0));
    }
}
