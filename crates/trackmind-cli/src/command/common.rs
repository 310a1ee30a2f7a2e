use std::path::PathBuf;

use anyhow::Context;
use rand::SeedableRng as _;
use rand_pcg::Pcg32;
use trackmind_engine::{FollowerParams, Track, Vec2, VehicleParams};
use trackmind_evaluator::simulator::{EpisodeLimits, EpisodeSimulator, RewardShaping};
use trackmind_training::outcome::TrainingOutcome;

use crate::util;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub(crate) enum TrackKind {
    Rectangle,
    Ring,
    Straight,
}

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TrackArg {
    /// Built-in track: rectangle, ring or straight
    #[arg(long)]
    track: Option<TrackKind>,
    /// Load the track from a JSON file instead
    #[arg(long, conflicts_with = "track")]
    track_file: Option<PathBuf>,
}

impl TrackArg {
    pub(crate) fn load(&self, default: TrackKind) -> anyhow::Result<Track> {
        if let Some(path) = &self.track_file {
            return util::read_json_file("track", path);
        }
        let track = match self.track.unwrap_or(default) {
            TrackKind::Rectangle => Track::rectangle(),
            TrackKind::Ring => Track::default_ring(),
            TrackKind::Straight => Track::straight(600.0, 3)?,
        };
        Ok(track)
    }
}

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct SeedArg {
    /// Random seed; drawn at random when omitted
    #[arg(long)]
    seed: Option<u64>,
}

impl SeedArg {
    /// Returns the seed actually used together with a generator seeded from it.
    pub(crate) fn rng(&self) -> (u64, Pcg32) {
        let seed = self.seed.unwrap_or_else(rand::random);
        tracing::debug!(seed, explicit = self.seed.is_some(), "seeding generator");
        (seed, Pcg32::seed_from_u64(seed))
    }
}

/// Reward shaping and episode limits.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EpisodeArg {
    /// Step budget per episode
    #[arg(long, default_value_t = EpisodeLimits::default().max_steps)]
    max_steps: usize,
    /// Distance at which a checkpoint counts as reached
    #[arg(long, default_value_t = EpisodeLimits::default().capture_radius)]
    capture_radius: f32,
    #[arg(long, default_value_t = RewardShaping::default().closing_reward)]
    closing_reward: f32,
    #[arg(long, default_value_t = RewardShaping::default().opening_penalty)]
    opening_penalty: f32,
    /// Heading error (degrees) under which speed is rewarded
    #[arg(long, default_value_t = RewardShaping::default().alignment_threshold)]
    alignment_threshold: f32,
    #[arg(long, default_value_t = RewardShaping::default().alignment_speed_factor)]
    alignment_speed_factor: f32,
    #[arg(long, default_value_t = RewardShaping::default().checkpoint_bonus)]
    checkpoint_bonus: f32,
    #[arg(long, default_value_t = RewardShaping::default().finish_bonus)]
    finish_bonus: f32,
    #[arg(long, default_value_t = RewardShaping::default().stall_speed)]
    stall_speed: f32,
    #[arg(long, default_value_t = RewardShaping::default().stall_penalty)]
    stall_penalty: f32,
    /// Consecutive stalled steps before the episode is aborted
    #[arg(long, default_value_t = RewardShaping::default().max_stall_steps)]
    max_stall_steps: usize,
    #[arg(long, default_value_t = RewardShaping::default().progress_base)]
    progress_base: f32,
}

impl EpisodeArg {
    pub(crate) fn simulator(&self) -> EpisodeSimulator {
        let shaping = RewardShaping {
            closing_reward: self.closing_reward,
            opening_penalty: self.opening_penalty,
            alignment_threshold: self.alignment_threshold,
            alignment_speed_factor: self.alignment_speed_factor,
            checkpoint_bonus: self.checkpoint_bonus,
            finish_bonus: self.finish_bonus,
            stall_speed: self.stall_speed,
            stall_penalty: self.stall_penalty,
            max_stall_steps: self.max_stall_steps,
            progress_base: self.progress_base,
        };
        let limits = EpisodeLimits {
            max_steps: self.max_steps,
            capture_radius: self.capture_radius,
        };
        EpisodeSimulator::new(VehicleParams::default(), shaping, limits)
    }
}

/// Tuning of the scripted waypoint follower.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct FollowerArg {
    /// Maximum heading change per step, in degrees
    #[arg(long, default_value_t = FollowerParams::default().turn_step)]
    turn_step: f32,
    #[arg(long, default_value_t = FollowerParams::default().acceleration)]
    acceleration: f32,
    #[arg(long, default_value_t = FollowerParams::default().deceleration)]
    deceleration: f32,
    #[arg(long, default_value_t = FollowerParams::default().max_speed)]
    max_speed: f32,
    /// Distance at which a waypoint counts as reached
    #[arg(long, default_value_t = FollowerParams::default().capture_radius)]
    waypoint_radius: f32,
    /// Distance under which the follower brakes
    #[arg(long, default_value_t = FollowerParams::default().slow_radius)]
    slow_radius: f32,
    /// Spacing in degrees of waypoints on a ring track
    #[arg(long, default_value_t = 10.0)]
    waypoint_step: f32,
}

impl FollowerArg {
    pub(crate) fn params(&self) -> anyhow::Result<FollowerParams> {
        ensure_non_negative("--turn-step", self.turn_step)?;
        ensure_non_negative("--acceleration", self.acceleration)?;
        ensure_non_negative("--deceleration", self.deceleration)?;
        ensure_non_negative("--max-speed", self.max_speed)?;
        ensure_non_negative("--waypoint-radius", self.waypoint_radius)?;
        ensure_non_negative("--slow-radius", self.slow_radius)?;
        Ok(FollowerParams {
            turn_step: self.turn_step,
            acceleration: self.acceleration,
            deceleration: self.deceleration,
            max_speed: self.max_speed,
            capture_radius: self.waypoint_radius,
            slow_radius: self.slow_radius,
        })
    }

    /// Evenly spaced points for ring tracks, the checkpoints otherwise.
    pub(crate) fn waypoints(&self, track: &Track) -> anyhow::Result<Vec<Vec2>> {
        if track.boundary().is_none() {
            return Ok(track.checkpoints().to_vec());
        }
        track
            .ring_waypoints(self.waypoint_step)
            .with_context(|| format!("Invalid waypoint step: {}", self.waypoint_step))
    }
}

/// Rejects negative, NaN and infinite values for a numeric flag.
pub(crate) fn ensure_non_negative(flag: &str, value: f32) -> anyhow::Result<()> {
    anyhow::ensure!(
        value.is_finite() && value >= 0.0,
        "{flag} must be finite and non-negative (got {value})"
    );
    Ok(())
}

pub(crate) fn print_training_summary(track: &Track, outcome: &TrainingOutcome) {
    eprintln!();
    eprintln!("Training finished on track '{}'", track.name());
    eprintln!("  Generations: {}", outcome.generations);
    let Some(best) = &outcome.best else {
        eprintln!("  No generation was run");
        return;
    };
    eprintln!("  Success: {}", best.outcome.success);
    eprintln!("  Found in generation: {}", best.generation);
    eprintln!("  Reward: {:.3}", best.reward());
    eprintln!(
        "  Checkpoints: {}/{}",
        best.outcome.checkpoints_reached,
        track.checkpoints().len()
    );
    eprintln!(
        "  Steps: {} ({})",
        best.outcome.steps, best.outcome.termination
    );
}
