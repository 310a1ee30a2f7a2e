//! Policies: mapping discretized vehicle state to a driving action.
//!
//! The main implementation is [`TabularPolicy`], a flat table holding one
//! score per (state, action) pair. Action selection is an arg-max over the
//! five scores of the current state, with ties resolved towards the action
//! declared first in [`Action`] (so an all-zero table always steers left).
//!
//! # Layout
//!
//! ```text
//! index = state_bin.index() * Action::LEN + action.index()
//!       = (angle_bin * NUM_SPEED_BINS + speed_bin) * 5 + action
//! ```
//!
//! The table always holds exactly [`TabularPolicy::LEN`] (36 × 6 × 5 = 1080)
//! weights; constructors reject any other length.

use std::{fmt, ops::RangeInclusive};

use rand::Rng;
use trackmind_engine::{Action, NUM_STATES, StateBin};

use crate::weights;

/// Chooses an action for a discretized state.
pub trait Policy: fmt::Debug + Send + Sync {
    fn select_action(&self, state: StateBin) -> Action;
}

/// A weight vector whose length does not match [`TabularPolicy::LEN`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("policy needs {expected} weights, got {actual}")]
pub struct PolicyShapeError {
    pub expected: usize,
    pub actual: usize,
}

/// Returns the index of the largest value, preferring the first on ties.
///
/// NaN never wins against a comparable value. Returns 0 for an empty slice.
///
/// ```
/// use trackmind_evaluator::policy::argmax_first;
///
/// assert_eq!(argmax_first(&[1.0, 3.0, 3.0, 2.0]), 1);
/// assert_eq!(argmax_first(&[0.0; 5]), 0);
/// assert_eq!(argmax_first(&[f32::NAN, -1.0]), 1);
/// ```
#[must_use]
pub fn argmax_first(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] || (values[best].is_nan() && !v.is_nan()) {
            best = i;
        }
    }
    best
}

/// Scores for every (state, action) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct TabularPolicy {
    weights: Vec<f32>,
}

impl TabularPolicy {
    /// Number of weights in every policy.
    pub const LEN: usize = NUM_STATES * Action::LEN;

    /// A policy with every weight zero.
    #[must_use]
    pub fn zeros() -> Self {
        Self {
            weights: vec![0.0; Self::LEN],
        }
    }

    /// Wraps an existing weight vector.
    pub fn from_weights(weights: Vec<f32>) -> Result<Self, PolicyShapeError> {
        if weights.len() == Self::LEN {
            Ok(Self { weights })
        } else {
            Err(PolicyShapeError {
                expected: Self::LEN,
                actual: weights.len(),
            })
        }
    }

    /// Builds a policy by scoring every (state, action) pair with `f`.
    #[must_use]
    pub fn from_fn<F>(mut f: F) -> Self
    where
        F: FnMut(StateBin, Action) -> f32,
    {
        let mut weights = Vec::with_capacity(Self::LEN);
        for state in StateBin::all() {
            for action in Action::ALL {
                weights.push(f(state, action));
            }
        }
        Self { weights }
    }

    /// A policy with each weight drawn uniformly from `range`.
    pub fn random<R>(rng: &mut R, range: RangeInclusive<f32>) -> Self
    where
        R: Rng + ?Sized,
    {
        Self {
            weights: weights::random(rng, range, Self::LEN),
        }
    }

    /// Per-weight Gaussian mutation; see [`weights::mutate`].
    pub fn mutate<R>(&mut self, rate: f64, sigma: f32, range: RangeInclusive<f32>, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        weights::mutate(&mut self.weights, rate, sigma, range, rng);
    }

    #[must_use]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Mutable access to the raw weights. The length cannot change.
    #[must_use]
    pub fn weights_mut(&mut self) -> &mut [f32] {
        &mut self.weights
    }

    /// The five action scores for `state`, in [`Action::ALL`] order.
    #[must_use]
    pub fn action_scores(&self, state: StateBin) -> &[f32] {
        let offset = state.index() * Action::LEN;
        &self.weights[offset..offset + Action::LEN]
    }

    /// Sets the score of `action` in `state`.
    pub fn set_score(&mut self, state: StateBin, action: Action, score: f32) {
        self.weights[state.index() * Action::LEN + action.index()] = score;
    }
}

impl Policy for TabularPolicy {
    fn select_action(&self, state: StateBin) -> Action {
        let best = argmax_first(self.action_scores(state));
        Action::ALL[best]
    }
}

/// Always chooses the same action, whatever the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantPolicy(pub Action);

impl Policy for ConstantPolicy {
    fn select_action(&self, _state: StateBin) -> Action {
        self.0
    }
}
