use std::path::PathBuf;

use chrono::Utc;
use trackmind_engine::{FollowMode, WaypointFollower};

use crate::{
    command::common::{FollowerArg, TrackArg, TrackKind},
    model::report::FollowReport,
    util,
};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub(crate) enum FollowModeArg {
    #[default]
    Loop,
    Once,
}

impl From<FollowModeArg> for FollowMode {
    fn from(mode: FollowModeArg) -> Self {
        match mode {
            FollowModeArg::Loop => FollowMode::Loop,
            FollowModeArg::Once => FollowMode::Once,
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct FollowArg {
    #[clap(flatten)]
    track: TrackArg,
    #[clap(flatten)]
    follower: FollowerArg,
    /// loop: keep lapping; once: stop after the last waypoint
    #[arg(long, default_value = "loop")]
    mode: FollowModeArg,
    #[arg(long, default_value_t = 3000)]
    max_steps: usize,
    /// Include every visited position in the report
    #[arg(long)]
    with_path: bool,
    /// Output file path for the JSON report
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &FollowArg) -> anyhow::Result<()> {
    let track = arg.track.load(TrackKind::Ring)?;
    let waypoints = arg.follower.waypoints(&track)?;
    let params = arg.follower.params()?;
    let mode = FollowMode::from(arg.mode);
    let follower = WaypointFollower::new(params.clone(), mode);

    let (outcome, path) = if arg.with_path {
        let (outcome, path) = follower.run_with_path(&track, &waypoints, arg.max_steps);
        (outcome, Some(path))
    } else {
        (follower.run(&track, &waypoints, arg.max_steps), None)
    };

    eprintln!("Followed {} waypoints on '{}'", waypoints.len(), track.name());
    eprintln!("  Steps: {}", outcome.steps);
    eprintln!("  Waypoints visited: {}", outcome.waypoints_visited);
    eprintln!("  Laps: {}", outcome.laps);
    eprintln!("  Collisions: {}", outcome.collisions);
    eprintln!("  Finished: {}", outcome.finished);

    let report = FollowReport {
        track,
        mode,
        params,
        max_steps: arg.max_steps,
        waypoints,
        finished_at: Utc::now(),
        outcome,
        path,
    };
    util::save_json(&report, arg.output.as_deref())?;
    if let Some(path) = &arg.output {
        eprintln!("Report saved to {}", path.display());
    }
    Ok(())
}
