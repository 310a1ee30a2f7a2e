use clap::{Parser, Subcommand};

use self::{
    follow::FollowArg, train_genetic::TrainGeneticArg, train_swarm::TrainSwarmArg,
    tune_waypoints::TuneWaypointsArg,
};

mod common;
mod follow;
mod train_genetic;
mod train_swarm;
mod tune_waypoints;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Train a driving policy with the genetic algorithm
    TrainGenetic(#[clap(flatten)] TrainGeneticArg),
    /// Train a driving policy with particle swarm optimization
    TrainSwarm(#[clap(flatten)] TrainSwarmArg),
    /// Run the scripted waypoint follower
    Follow(#[clap(flatten)] FollowArg),
    /// Tune follower waypoints by hill climbing
    TuneWaypoints(#[clap(flatten)] TuneWaypointsArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    run_mode(&args.mode)
}

fn run_mode(mode: &Mode) -> anyhow::Result<()> {
    match mode {
        Mode::TrainGenetic(arg) => train_genetic::run(arg)?,
        Mode::TrainSwarm(arg) => train_swarm::run(arg)?,
        Mode::Follow(arg) => follow::run(arg)?,
        Mode::TuneWaypoints(arg) => tune_waypoints::run(arg)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use clap::CommandFactory as _;
    use serde_json::Value;

    use super::*;

    fn run_args(args: &[&str]) -> anyhow::Result<()> {
        let args = CommandArgs::try_parse_from(args)?;
        run_mode(&args.mode)
    }

    fn read_report(path: &Path) -> Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_command_definition() {
        CommandArgs::command().debug_assert();
    }

    #[test]
    fn test_track_options_conflict() {
        let result = CommandArgs::try_parse_from([
            "trackmind",
            "follow",
            "--track",
            "ring",
            "--track-file",
            "ring.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_track_rejected() {
        let result = CommandArgs::try_parse_from(["trackmind", "train-genetic", "--track", "oval"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_train_genetic_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("genetic.json");
        run_args(&[
            "trackmind",
            "train-genetic",
            "--track",
            "straight",
            "--population",
            "6",
            "--retain",
            "2",
            "--generations",
            "2",
            "--max-steps",
            "200",
            "--seed",
            "3",
            "--output",
            output.to_str().unwrap(),
        ])
        .unwrap();

        let report = read_report(&output);
        assert_eq!(report["algorithm"], "genetic");
        assert_eq!(report["seed"], 3);
        assert_eq!(report["params"]["population_size"], 6);
        assert_eq!(report["simulator"]["limits"]["max_steps"], 200);
        let generations = report["generations"].as_u64().unwrap();
        assert!((1..=2).contains(&generations));
        assert_eq!(report["history"].as_array().unwrap().len() as u64, generations);
        let champion = &report["champion"];
        let steps = champion["steps"].as_u64().unwrap();
        assert_eq!(champion["path"].as_array().unwrap().len() as u64, steps + 1);
        assert!(report["finished_at"].is_string());
    }

    #[test]
    fn test_train_genetic_rejects_bad_retain() {
        let err = run_args(&[
            "trackmind",
            "train-genetic",
            "--population",
            "4",
            "--retain",
            "5",
        ])
        .unwrap_err();
        assert!(err.to_string().contains("--retain"));
    }

    #[test]
    fn test_train_rejects_infinite_ranges() {
        let err = run_args(&[
            "trackmind",
            "train-genetic",
            "--init-scale",
            "inf",
            "--population",
            "2",
            "--retain",
            "1",
            "--generations",
            "1",
        ])
        .unwrap_err();
        assert!(err.to_string().contains("--init-scale"));

        for flag in ["--position-limit", "--initial-velocity"] {
            let err = run_args(&[
                "trackmind",
                "train-swarm",
                flag,
                "inf",
                "--swarm-size",
                "1",
                "--generations",
                "1",
            ])
            .unwrap_err();
            assert!(err.to_string().contains(flag), "{flag}: {err}");
        }
    }

    #[test]
    fn test_follower_rejects_bad_speed() {
        for value in ["-1", "NaN", "inf"] {
            let max_speed = format!("--max-speed={value}");
            let err = run_args(&["trackmind", "follow", max_speed.as_str(), "--max-steps", "10"])
                .unwrap_err();
            assert!(err.to_string().contains("--max-speed"), "{value}: {err}");

            let err = run_args(&["trackmind", "tune-waypoints", max_speed.as_str(), "--attempts", "1"])
                .unwrap_err();
            assert!(err.to_string().contains("--max-speed"), "{value}: {err}");
        }
    }

    #[test]
    fn test_follower_rejects_negative_radius() {
        let err = run_args(&["trackmind", "follow", "--slow-radius=-5", "--max-steps", "10"])
            .unwrap_err();
        assert!(err.to_string().contains("--slow-radius"));
    }

    #[test]
    fn test_train_swarm_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("swarm.json");
        run_args(&[
            "trackmind",
            "train-swarm",
            "--swarm-size",
            "3",
            "--generations",
            "2",
            "--max-steps",
            "150",
            "--seed",
            "8",
            "--output",
            output.to_str().unwrap(),
        ])
        .unwrap();

        let report = read_report(&output);
        assert_eq!(report["algorithm"], "swarm");
        assert_eq!(report["track"]["name"], "rectangle");
        assert_eq!(report["params"]["swarm_size"], 3);
        assert!(report["champion"].is_object());
    }

    #[test]
    fn test_follow_once_on_ring() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("follow.json");
        run_args(&[
            "trackmind",
            "follow",
            "--mode",
            "once",
            "--max-steps",
            "10000",
            "--with-path",
            "--output",
            output.to_str().unwrap(),
        ])
        .unwrap();

        let report = read_report(&output);
        assert_eq!(report["mode"], "once");
        assert_eq!(report["outcome"]["finished"], true);
        assert_eq!(report["waypoints"].as_array().unwrap().len(), 36);
        let steps = report["outcome"]["steps"].as_u64().unwrap();
        assert_eq!(report["path"].as_array().unwrap().len() as u64, steps + 1);
    }

    #[test]
    fn test_follow_track_file() {
        let dir = tempfile::tempdir().unwrap();
        let track = dir.path().join("sprint.json");
        std::fs::write(
            &track,
            r#"{"name":"sprint","start":{"x":0,"y":0},"checkpoints":[{"x":200,"y":0},{"x":400,"y":0}]}"#,
        )
        .unwrap();
        let output = dir.path().join("follow.json");
        run_args(&[
            "trackmind",
            "follow",
            "--track-file",
            track.to_str().unwrap(),
            "--mode",
            "once",
            "--output",
            output.to_str().unwrap(),
        ])
        .unwrap();

        let report = read_report(&output);
        assert_eq!(report["track"]["name"], "sprint");
        assert_eq!(report["outcome"]["finished"], true);
        assert!(report.get("path").is_none());
    }

    #[test]
    fn test_tune_waypoints_never_worse() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("tune.json");
        run_args(&[
            "trackmind",
            "tune-waypoints",
            "--attempts",
            "5",
            "--waypoint-step",
            "30",
            "--seed",
            "1",
            "--output",
            output.to_str().unwrap(),
        ])
        .unwrap();

        let report = read_report(&output);
        let initial = report["initial_score"].as_f64().unwrap();
        let best = report["best_score"].as_f64().unwrap();
        assert!(best <= initial);
        assert_eq!(report["waypoints"].as_array().unwrap().len(), 12);
    }
}
