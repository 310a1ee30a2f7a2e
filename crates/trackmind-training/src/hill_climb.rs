//! Hill climbing over waypoint coordinates.
//!
//! The scripted [`WaypointFollower`] is only as good as the points it chases.
//! [`WaypointHillClimber`] perturbs every coordinate of the current best set
//! with uniform noise, replays the follower, and keeps the perturbed set only
//! when its score is strictly lower.
//!
//! Score = steps to finish + `collision_penalty` × collisions, where an
//! unfinished course counts as `max_steps` steps.

use rand::Rng;
use serde::{Deserialize, Serialize};
use trackmind_engine::{FollowMode, FollowOutcome, FollowerParams, Track, Vec2, WaypointFollower};

#[derive(Debug, Clone)]
pub struct WaypointHillClimber {
    pub attempts: usize,
    /// Each coordinate moves by U(-noise, noise) per attempt.
    pub noise: f32,
    pub collision_penalty: f32,
    pub max_steps: usize,
    /// Should run in [`FollowMode::Once`]; a looping follower never finishes.
    pub follower: WaypointFollower,
}

impl Default for WaypointHillClimber {
    fn default() -> Self {
        Self {
            attempts: 200,
            noise: 10.0,
            collision_penalty: 10.0,
            max_steps: 5000,
            follower: WaypointFollower::new(FollowerParams::default(), FollowMode::Once),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HillClimbOutcome {
    pub waypoints: Vec<Vec2>,
    pub initial_score: f32,
    pub best_score: f32,
    /// Number of accepted mutations.
    pub improvements: usize,
    /// Follower run with the returned waypoints.
    pub run: FollowOutcome,
}

impl WaypointHillClimber {
    /// Runs the follower over `waypoints` and scores it; lower is better.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn score(&self, track: &Track, waypoints: &[Vec2]) -> (f32, FollowOutcome) {
        let run = self.follower.run(track, waypoints, self.max_steps);
        let steps = if run.finished { run.steps } else { self.max_steps };
        let score = steps as f32 + self.collision_penalty * run.collisions as f32;
        (score, run)
    }

    /// Tunes `waypoints` for `attempts` rounds. The result never scores worse
    /// than the input.
    ///
    /// # Panics
    ///
    /// Panics if `noise` is negative or not finite.
    pub fn optimize<R>(&self, track: &Track, waypoints: &[Vec2], rng: &mut R) -> HillClimbOutcome
    where
        R: Rng + ?Sized,
    {
        assert!(
            self.noise.is_finite() && self.noise >= 0.0,
            "noise must be finite and non-negative"
        );

        let mut best = waypoints.to_vec();
        let (initial_score, mut best_run) = self.score(track, &best);
        let mut best_score = initial_score;
        let mut improvements = 0;

        for attempt in 0..self.attempts {
            let candidate: Vec<Vec2> = best
                .iter()
                .map(|p| {
                    let dx = rng.random_range(-self.noise..=self.noise);
                    let dy = rng.random_range(-self.noise..=self.noise);
                    Vec2::new(p.x + dx, p.y + dy)
                })
                .collect();
            let (score, run) = self.score(track, &candidate);
            if score < best_score {
                tracing::debug!(attempt, score, "waypoints improved");
                best = candidate;
                best_score = score;
                best_run = run;
                improvements += 1;
            }
        }

        tracing::info!(initial_score, best_score, improvements, "waypoint tuning finished");
        HillClimbOutcome {
            waypoints: best,
            initial_score,
            best_score,
            improvements,
            run: best_run,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_never_worse_than_input() {
        let track = Track::default_ring();
        let waypoints = track.ring_waypoints(10.0).unwrap();
        let climber = WaypointHillClimber {
            attempts: 15,
            ..WaypointHillClimber::default()
        };
        let mut rng = Pcg32::seed_from_u64(1);
        let outcome = climber.optimize(&track, &waypoints, &mut rng);
        assert!(outcome.best_score <= outcome.initial_score);
        assert_eq!(outcome.waypoints.len(), waypoints.len());
        assert_eq!(climber.score(&track, &outcome.waypoints), (outcome.best_score, outcome.run));
        if outcome.improvements == 0 {
            assert_eq!(outcome.waypoints, waypoints);
        }
    }

    #[test]
    fn test_zero_noise_keeps_input() {
        let track = Track::default_ring();
        let waypoints = track.ring_waypoints(20.0).unwrap();
        let climber = WaypointHillClimber {
            attempts: 3,
            noise: 0.0,
            ..WaypointHillClimber::default()
        };
        let mut rng = Pcg32::seed_from_u64(2);
        let outcome = climber.optimize(&track, &waypoints, &mut rng);
        assert_eq!(outcome.improvements, 0);
        assert_eq!(outcome.waypoints, waypoints);
        assert_eq!(outcome.best_score, outcome.initial_score);
    }

    #[test]
    fn test_unfinished_run_scores_max_steps() {
        let track = Track::default_ring();
        let waypoints = track.ring_waypoints(10.0).unwrap();
        let climber = WaypointHillClimber {
            max_steps: 300,
            follower: WaypointFollower::new(FollowerParams::default(), FollowMode::Loop),
            ..WaypointHillClimber::default()
        };
        let (score, run) = climber.score(&track, &waypoints);
        assert!(!run.finished);
        #[expect(clippy::cast_precision_loss)]
        let expected = 300.0 + climber.collision_penalty * run.collisions as f32;
        assert_eq!(score, expected);
    }
}
