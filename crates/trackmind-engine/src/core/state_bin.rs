use serde::{Deserialize, Serialize};

use super::geometry::normalize_degrees;

/// Number of orientation bins (10° each).
pub const NUM_ANGLE_BINS: usize = 36;
/// Number of speed bins (integer speeds 0 through 5).
pub const NUM_SPEED_BINS: usize = 6;
/// Number of distinct discretized states.
pub const NUM_STATES: usize = NUM_ANGLE_BINS * NUM_SPEED_BINS;

const ANGLE_BIN_WIDTH: f32 = 10.0;
const MAX_SPEED_BIN: f32 = 5.0;

/// Discretized vehicle state used to index a tabular policy.
///
/// Both components are always in range: the angle bin lies in
/// `[0, NUM_ANGLE_BINS)` and the speed bin in `[0, NUM_SPEED_BINS)`,
/// whatever continuous values were fed in.
///
/// # Example
///
/// ```
/// use trackmind_engine::StateBin;
///
/// let bin = StateBin::from_continuous(725.0, 3.7);
/// assert_eq!(bin.angle_bin(), 0);
/// assert_eq!(bin.speed_bin(), 3);
///
/// let clamped = StateBin::from_continuous(-5.0, 99.0);
/// assert_eq!(clamped.angle_bin(), 35);
/// assert_eq!(clamped.speed_bin(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateBin {
    angle_bin: u8,
    speed_bin: u8,
}

impl StateBin {
    /// Discretizes an orientation (degrees, any range) and a speed.
    ///
    /// A non-finite orientation and a NaN speed fall into bin 0; infinite
    /// speeds clamp like any other out-of-range value.
    #[must_use]
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_continuous(orientation: f32, speed: f32) -> Self {
        let angle = if orientation.is_finite() {
            normalize_degrees(orientation)
        } else {
            0.0
        };
        let angle_bin = (angle / ANGLE_BIN_WIDTH) as usize % NUM_ANGLE_BINS;
        // NaN survives the clamp and then saturates to 0 in the cast
        let speed_bin = speed.floor().clamp(0.0, MAX_SPEED_BIN) as usize;
        Self {
            angle_bin: angle_bin as u8,
            speed_bin: speed_bin as u8,
        }
    }

    /// Builds a bin from raw indices.
    ///
    /// Returns `None` when either index is out of range.
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub fn new(angle_bin: usize, speed_bin: usize) -> Option<Self> {
        (angle_bin < NUM_ANGLE_BINS && speed_bin < NUM_SPEED_BINS).then_some(Self {
            angle_bin: angle_bin as u8,
            speed_bin: speed_bin as u8,
        })
    }

    #[must_use]
    pub fn angle_bin(self) -> usize {
        usize::from(self.angle_bin)
    }

    #[must_use]
    pub fn speed_bin(self) -> usize {
        usize::from(self.speed_bin)
    }

    /// Flat index in `[0, NUM_STATES)`.
    #[must_use]
    pub fn index(self) -> usize {
        self.angle_bin() * NUM_SPEED_BINS + self.speed_bin()
    }

    /// Iterates over every state in flat-index order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..NUM_ANGLE_BINS).flat_map(|a| (0..NUM_SPEED_BINS).filter_map(move |s| Self::new(a, s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angle_bin_in_range_and_periodic() {
        let mut orientation = -1080.0_f32;
        while orientation < 1080.0 {
            let bin = StateBin::from_continuous(orientation, 0.0);
            assert!(bin.angle_bin() < NUM_ANGLE_BINS);
            for k in [-3.0_f32, -1.0, 1.0, 2.0] {
                let shifted = StateBin::from_continuous(orientation + 360.0 * k, 0.0);
                assert_eq!(
                    shifted.angle_bin(),
                    bin.angle_bin(),
                    "orientation {orientation} shifted by {k} turns"
                );
            }
            orientation += 7.5;
        }
    }

    #[test]
    fn test_angle_bin_boundaries() {
        assert_eq!(StateBin::from_continuous(0.0, 0.0).angle_bin(), 0);
        assert_eq!(StateBin::from_continuous(9.99, 0.0).angle_bin(), 0);
        assert_eq!(StateBin::from_continuous(10.0, 0.0).angle_bin(), 1);
        assert_eq!(StateBin::from_continuous(359.9, 0.0).angle_bin(), 35);
        assert_eq!(StateBin::from_continuous(360.0, 0.0).angle_bin(), 0);
        assert_eq!(StateBin::from_continuous(-1e-9, 0.0).angle_bin(), 0);
    }

    #[test]
    fn test_speed_bin_clamped() {
        for speed in [-1e9, -3.0, -0.1, 0.0, 0.99, 1.0, 4.5, 5.0, 5.9, 6.0, 1e9] {
            let bin = StateBin::from_continuous(0.0, speed);
            assert!(bin.speed_bin() < NUM_SPEED_BINS, "speed {speed}");
        }
        assert_eq!(StateBin::from_continuous(0.0, -2.0).speed_bin(), 0);
        assert_eq!(StateBin::from_continuous(0.0, 2.5).speed_bin(), 2);
        assert_eq!(StateBin::from_continuous(0.0, 100.0).speed_bin(), 5);
    }

    #[test]
    fn test_non_finite_inputs() {
        let bin = StateBin::from_continuous(f32::NAN, f32::NAN);
        assert_eq!(bin.angle_bin(), 0);
        assert_eq!(bin.speed_bin(), 0);
        let bin = StateBin::from_continuous(f32::INFINITY, f32::INFINITY);
        assert_eq!(bin.angle_bin(), 0);
        assert_eq!(bin.speed_bin(), NUM_SPEED_BINS - 1);
        let bin = StateBin::from_continuous(f32::NEG_INFINITY, f32::NEG_INFINITY);
        assert_eq!(bin.speed_bin(), 0);
    }

    #[test]
    fn test_flat_index_covers_all_states() {
        let indices: Vec<usize> = StateBin::all().map(StateBin::index).collect();
        assert_eq!(indices.len(), NUM_STATES);
        assert!(indices.iter().enumerate().all(|(i, &idx)| i == idx));
    }
}
