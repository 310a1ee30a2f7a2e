//! Episode simulation: the fitness function used to train policies.
//!
//! An episode drives a single car from the track start, stepping the
//! kinematic model with whatever the policy selects, until every checkpoint
//! has been reached, the step budget runs out, or the car stalls.
//!
//! # Reward Shaping
//!
//! Each step contributes:
//!
//! ```text
//! + closing_reward                      if the car got closer to its target
//! - opening_penalty                     otherwise
//! + speed × alignment_speed_factor      if |heading error| < alignment_threshold
//! + checkpoint_bonus                    when the target is captured
//! + finish_bonus                        when the final target is captured
//! - stall_penalty                       while speed < stall_speed
//! ```
//!
//! A car that stays below `stall_speed` for more than `max_stall_steps`
//! consecutive steps ends the episode early. The accumulated total is then
//! scaled by `progress_base + reached / checkpoints`, so attempts that got
//! further along the track stay comparable to each other even when none of
//! them finished.
//!
//! The shape matters more than the exact constants: closer is better, aligned
//! and fast is better, checkpoints are worth a lot, stalling is punished and
//! eventually fatal.

use serde::{Deserialize, Serialize};
use trackmind_engine::{
    Action, Track, Vec2, VehicleParams, VehicleState, signed_angle_diff,
};

use crate::policy::Policy;

/// Reward constants for [`EpisodeSimulator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardShaping {
    pub closing_reward: f32,
    pub opening_penalty: f32,
    /// Maximum heading error (degrees) that still earns the alignment bonus.
    pub alignment_threshold: f32,
    pub alignment_speed_factor: f32,
    pub checkpoint_bonus: f32,
    pub finish_bonus: f32,
    /// Speed under which a step counts as stalled.
    pub stall_speed: f32,
    pub stall_penalty: f32,
    /// Consecutive stalled steps tolerated before the episode is aborted.
    pub max_stall_steps: usize,
    /// Reward multiplier for an episode that reached no checkpoint.
    pub progress_base: f32,
}

impl Default for RewardShaping {
    fn default() -> Self {
        Self {
            closing_reward: 1.0,
            opening_penalty: 0.5,
            alignment_threshold: 45.0,
            alignment_speed_factor: 0.2,
            checkpoint_bonus: 100.0,
            finish_bonus: 1000.0,
            stall_speed: 0.1,
            stall_penalty: 1.0,
            max_stall_steps: 50,
            progress_base: 0.5,
        }
    }
}

impl RewardShaping {
    /// Final multiplier for an episode that reached `reached` of `total` checkpoints.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn progress_multiplier(&self, reached: usize, total: usize) -> f32 {
        if total == 0 {
            return self.progress_base;
        }
        self.progress_base + reached as f32 / total as f32
    }
}

/// Episode length and checkpoint capture settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeLimits {
    pub max_steps: usize,
    /// Distance under which the current checkpoint counts as reached.
    pub capture_radius: f32,
}

impl Default for EpisodeLimits {
    fn default() -> Self {
        Self {
            max_steps: 2000,
            capture_radius: 30.0,
        }
    }
}

/// Why an episode ended.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display,
    derive_more::IsVariant,
)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Every checkpoint was reached.
    #[display("completed")]
    Completed,
    /// The step budget ran out first.
    #[display("step budget exhausted")]
    StepBudget,
    /// The car stayed too slow for too long.
    #[display("stalled")]
    Stalled,
}

/// Result of one simulated episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeOutcome {
    pub total_reward: f32,
    pub success: bool,
    pub checkpoints_reached: usize,
    pub steps: usize,
    pub termination: Termination,
}

/// An episode outcome together with the trajectory that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playback {
    pub outcome: EpisodeOutcome,
    /// Every position visited, starting with the track start.
    pub path: Vec<Vec2>,
    /// The action chosen at each step; one shorter than `path`.
    pub actions: Vec<Action>,
}

/// Runs policies against tracks and scores them.
///
/// # Example
///
/// ```
/// use trackmind_engine::{Action, Track};
/// use trackmind_evaluator::{policy::ConstantPolicy, simulator::EpisodeSimulator};
///
/// let track = Track::straight(200.0, 2).unwrap();
/// let simulator = EpisodeSimulator::default();
/// let outcome = simulator.evaluate(&track, &ConstantPolicy(Action::Accelerate));
/// assert!(outcome.success);
/// assert!(outcome.total_reward > 0.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSimulator {
    pub vehicle: VehicleParams,
    pub shaping: RewardShaping,
    pub limits: EpisodeLimits,
}

impl EpisodeSimulator {
    #[must_use]
    pub fn new(vehicle: VehicleParams, shaping: RewardShaping, limits: EpisodeLimits) -> Self {
        Self {
            vehicle,
            shaping,
            limits,
        }
    }

    /// Runs one episode and returns its reward and success flag.
    #[must_use]
    pub fn evaluate<P>(&self, track: &Track, policy: &P) -> EpisodeOutcome
    where
        P: Policy + ?Sized,
    {
        self.simulate(track, policy, |_, _| {})
    }

    /// Runs one episode, recording the path and actions for display.
    #[must_use]
    pub fn playback<P>(&self, track: &Track, policy: &P) -> Playback
    where
        P: Policy + ?Sized,
    {
        let mut path = vec![track.start()];
        let mut actions = vec![];
        let outcome = self.simulate(track, policy, |state, action| {
            path.push(state.position);
            actions.push(action);
        });
        Playback {
            outcome,
            path,
            actions,
        }
    }

    fn simulate<P, F>(&self, track: &Track, policy: &P, mut on_step: F) -> EpisodeOutcome
    where
        P: Policy + ?Sized,
        F: FnMut(&VehicleState, Action),
    {
        let shaping = &self.shaping;
        let checkpoints = track.checkpoints();

        let mut vehicle = VehicleState::at_start(track.start());
        let mut target = 0;
        let mut prev_dist = vehicle.position.distance(checkpoints[0]);
        let mut stall_steps = 0;
        let mut steps = 0;
        let mut total_reward = 0.0;

        let termination = loop {
            if target >= checkpoints.len() {
                break Termination::Completed;
            }
            if steps >= self.limits.max_steps {
                break Termination::StepBudget;
            }

            let goal = checkpoints[target];
            let dist = vehicle.position.distance(goal);
            let heading_error = signed_angle_diff(
                vehicle.orientation,
                vehicle.position.heading_deg_to(goal),
            );

            let mut reward = if dist < prev_dist {
                shaping.closing_reward
            } else {
                -shaping.opening_penalty
            };
            if heading_error.abs() < shaping.alignment_threshold {
                reward += vehicle.speed * shaping.alignment_speed_factor;
            }

            prev_dist = dist;
            if dist < self.limits.capture_radius {
                reward += shaping.checkpoint_bonus;
                target += 1;
                if target == checkpoints.len() {
                    reward += shaping.finish_bonus;
                    total_reward += reward;
                    break Termination::Completed;
                }
                prev_dist = vehicle.position.distance(checkpoints[target]);
            }

            if vehicle.speed < shaping.stall_speed {
                stall_steps += 1;
                reward -= shaping.stall_penalty;
                if stall_steps > shaping.max_stall_steps {
                    total_reward += reward;
                    break Termination::Stalled;
                }
            } else {
                stall_steps = 0;
            }

            let action = policy.select_action(vehicle.state_bin());
            vehicle = vehicle.apply_action(action, &self.vehicle);
            steps += 1;
            total_reward += reward;
            on_step(&vehicle, action);
        };

        total_reward *= shaping.progress_multiplier(target, checkpoints.len());
        EpisodeOutcome {
            total_reward,
            success: target == checkpoints.len(),
            checkpoints_reached: target,
            steps,
            termination,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;
    use trackmind_engine::{StateBin, Vec2};

    use super::*;
    use crate::policy::{ConstantPolicy, TabularPolicy};

    fn accelerate_only() -> TabularPolicy {
        TabularPolicy::from_fn(|_, action| if action == Action::Accelerate { 1.0 } else { 0.0 })
    }

    #[test]
    fn test_always_accelerate_finishes_straight_track() {
        let track = Track::straight(200.0, 2).unwrap();
        let simulator = EpisodeSimulator::default();
        let outcome = simulator.evaluate(&track, &accelerate_only());
        assert!(outcome.success);
        assert!(outcome.termination.is_completed());
        assert_eq!(outcome.checkpoints_reached, 2);
        assert!(outcome.total_reward > 0.0);
        assert!(outcome.steps < simulator.limits.max_steps);
    }

    #[test]
    fn test_zero_policy_only_circles() {
        let simulator = EpisodeSimulator::default();
        let policy = TabularPolicy::zeros();
        for track in [Track::straight(800.0, 2).unwrap(), Track::rectangle()] {
            let playback = simulator.playback(&track, &policy);
            assert!(playback.actions.iter().all(|&a| a == Action::SteerLeft));
            let outcome = playback.outcome;
            assert!(!outcome.success, "track {}", track.name());
            assert_eq!(outcome.checkpoints_reached, 0);
            assert!(outcome.termination.is_step_budget());
            assert_eq!(outcome.steps, simulator.limits.max_steps);
        }
    }

    #[test]
    fn test_braking_car_stalls() {
        let track = Track::rectangle();
        let simulator = EpisodeSimulator::default();
        let outcome = simulator.evaluate(&track, &ConstantPolicy(Action::Brake));
        assert!(outcome.termination.is_stalled());
        assert!(!outcome.success);
        assert_eq!(outcome.steps, simulator.shaping.max_stall_steps);
        assert!(outcome.total_reward < 0.0);
    }

    #[test]
    fn test_partial_progress() {
        // second checkpoint sits behind the car, which never turns
        let track = Track::new(
            "dogleg",
            Vec2::ZERO,
            vec![Vec2::new(100.0, 0.0), Vec2::new(-100.0, 100.0)],
        )
        .unwrap();
        let simulator = EpisodeSimulator::default();
        let outcome = simulator.evaluate(&track, &ConstantPolicy(Action::Accelerate));
        assert_eq!(outcome.checkpoints_reached, 1);
        assert!(!outcome.success);
        assert!(outcome.termination.is_step_budget());
    }

    #[test]
    fn test_success_implies_all_checkpoints() {
        let mut rng = Pcg32::seed_from_u64(11);
        let simulator = EpisodeSimulator::default();
        let track = Track::straight(300.0, 3).unwrap();
        for _ in 0..30 {
            let policy = TabularPolicy::random(&mut rng, -1.0..=1.0);
            let outcome = simulator.evaluate(&track, &policy);
            assert_eq!(
                outcome.success,
                outcome.checkpoints_reached == track.checkpoints().len()
            );
            assert_eq!(outcome.success, outcome.termination.is_completed());
            assert!(outcome.checkpoints_reached <= track.checkpoints().len());
        }
    }

    #[test]
    fn test_playback_matches_evaluate() {
        let track = Track::straight(200.0, 2).unwrap();
        let simulator = EpisodeSimulator::default();
        let policy = accelerate_only();
        let playback = simulator.playback(&track, &policy);
        assert_eq!(playback.outcome, simulator.evaluate(&track, &policy));
        assert_eq!(playback.path.len(), playback.outcome.steps + 1);
        assert_eq!(playback.actions.len(), playback.outcome.steps);
        assert_eq!(playback.path[0], track.start());
        assert!(playback.path.windows(2).all(|w| w[1].x >= w[0].x));
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let mut rng = Pcg32::seed_from_u64(5);
        let policy = TabularPolicy::random(&mut rng, -5.0..=5.0);
        let track = Track::rectangle();
        let simulator = EpisodeSimulator::default();
        assert_eq!(
            simulator.evaluate(&track, &policy),
            simulator.evaluate(&track, &policy)
        );
    }

    #[test]
    fn test_progress_multiplier() {
        let shaping = RewardShaping::default();
        assert!((shaping.progress_multiplier(0, 4) - 0.5).abs() < 1e-6);
        assert!((shaping.progress_multiplier(2, 4) - 1.0).abs() < 1e-6);
        assert!((shaping.progress_multiplier(4, 4) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_dyn_policy() {
        let policies: Vec<Box<dyn Policy>> = vec![
            Box::new(ConstantPolicy(Action::Accelerate)),
            Box::new(accelerate_only()),
        ];
        let track = Track::straight(200.0, 2).unwrap();
        let simulator = EpisodeSimulator::default();
        let rewards: Vec<f32> = policies
            .iter()
            .map(|p| simulator.evaluate(&track, p.as_ref()).total_reward)
            .collect();
        assert_eq!(rewards[0], rewards[1]);
        assert_eq!(
            policies[1].select_action(StateBin::new(0, 0).unwrap()),
            Action::Accelerate
        );
    }
}
