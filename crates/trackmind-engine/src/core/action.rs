use serde::{Deserialize, Serialize};

/// A discrete driving command applied for exactly one simulation step.
///
/// The discriminants double as column indices into a policy's action scores,
/// so the declaration order is significant: arg-max ties resolve to the
/// variant declared first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Action {
    /// Turn counter-clockwise (decreasing orientation).
    #[display("steer-left")]
    SteerLeft = 0,
    /// Turn clockwise (increasing orientation).
    #[display("steer-right")]
    SteerRight = 1,
    #[display("accelerate")]
    Accelerate = 2,
    #[display("brake")]
    Brake = 3,
    /// Coast; speed decays slowly.
    #[display("noop")]
    Noop = 4,
}

impl Action {
    /// Number of actions (5).
    pub const LEN: usize = 5;

    /// All actions in enumeration order.
    pub const ALL: [Action; Self::LEN] = [
        Action::SteerLeft,
        Action::SteerRight,
        Action::Accelerate,
        Action::Brake,
        Action::Noop,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < Self::LEN {
            Some(Self::ALL[index])
        } else {
            None
        }
    }
}
