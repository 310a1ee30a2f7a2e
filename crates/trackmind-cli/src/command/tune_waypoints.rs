use std::path::PathBuf;

use chrono::Utc;
use trackmind_engine::{FollowMode, WaypointFollower};
use trackmind_training::hill_climb::WaypointHillClimber;

use crate::{
    command::common::{self, FollowerArg, SeedArg, TrackArg, TrackKind},
    model::report::TuneReport,
    util,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TuneWaypointsArg {
    #[clap(flatten)]
    track: TrackArg,
    #[clap(flatten)]
    seed: SeedArg,
    #[clap(flatten)]
    follower: FollowerArg,
    /// Number of mutations to try
    #[arg(long, default_value_t = WaypointHillClimber::default().attempts)]
    attempts: usize,
    /// Maximum coordinate shift per mutation
    #[arg(long, default_value_t = WaypointHillClimber::default().noise)]
    noise: f32,
    /// Score added per collision
    #[arg(long, default_value_t = WaypointHillClimber::default().collision_penalty)]
    collision_penalty: f32,
    /// Step budget for a single follower run
    #[arg(long, default_value_t = WaypointHillClimber::default().max_steps)]
    max_steps: usize,
    /// Output file path for the JSON report
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &TuneWaypointsArg) -> anyhow::Result<()> {
    common::ensure_non_negative("--noise", arg.noise)?;
    let params = arg.follower.params()?;
    let track = arg.track.load(TrackKind::Ring)?;
    let waypoints = arg.follower.waypoints(&track)?;
    let (seed, mut rng) = arg.seed.rng();

    let climber = WaypointHillClimber {
        attempts: arg.attempts,
        noise: arg.noise,
        collision_penalty: arg.collision_penalty,
        max_steps: arg.max_steps,
        follower: WaypointFollower::new(params, FollowMode::Once),
    };
    eprintln!(
        "Tuning {} waypoints on '{}' with {} attempts, seed {seed}",
        waypoints.len(),
        track.name(),
        arg.attempts
    );
    let outcome = climber.optimize(&track, &waypoints, &mut rng);

    eprintln!();
    eprintln!("Waypoint tuning finished");
    eprintln!("  Initial score: {:.1}", outcome.initial_score);
    eprintln!("  Best score: {:.1}", outcome.best_score);
    eprintln!("  Improvements: {}", outcome.improvements);
    eprintln!("  Collisions: {}", outcome.run.collisions);

    let report = TuneReport {
        seed,
        track,
        attempts: arg.attempts,
        noise: arg.noise,
        collision_penalty: arg.collision_penalty,
        max_steps: arg.max_steps,
        finished_at: Utc::now(),
        initial_score: outcome.initial_score,
        best_score: outcome.best_score,
        improvements: outcome.improvements,
        outcome: outcome.run,
        waypoints: outcome.waypoints,
    };
    util::save_json(&report, arg.output.as_deref())?;
    if let Some(path) = &arg.output {
        eprintln!("Report saved to {}", path.display());
    }
    Ok(())
}
