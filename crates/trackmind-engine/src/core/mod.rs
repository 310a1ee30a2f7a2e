pub use self::{action::*, geometry::*, state_bin::*};

pub(crate) mod action;
pub(crate) mod geometry;
pub(crate) mod state_bin;
