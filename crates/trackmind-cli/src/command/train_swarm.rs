use std::path::PathBuf;

use trackmind_training::swarm::{SwarmOptimizer, SwarmParams};

use crate::{
    command::common::{self, EpisodeArg, SeedArg, TrackArg, TrackKind},
    model::report::{Algorithm, TrainingReport},
    util,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainSwarmArg {
    #[clap(flatten)]
    track: TrackArg,
    #[clap(flatten)]
    seed: SeedArg,
    #[clap(flatten)]
    episode: EpisodeArg,
    #[arg(long, default_value_t = SwarmParams::default().swarm_size)]
    swarm_size: usize,
    /// Inertia weight (w)
    #[arg(long, default_value_t = SwarmParams::default().inertia)]
    inertia: f32,
    /// Pull towards each particle's personal best (c1)
    #[arg(long, default_value_t = SwarmParams::default().cognitive)]
    cognitive: f32,
    /// Pull towards the global best (c2)
    #[arg(long, default_value_t = SwarmParams::default().social)]
    social: f32,
    #[arg(long, default_value_t = SwarmParams::default().max_velocity)]
    max_velocity: f32,
    /// Positions are clamped to [-limit, limit]
    #[arg(long, default_value_t = 5.0)]
    position_limit: f32,
    #[arg(long, default_value_t = SwarmParams::default().initial_velocity)]
    initial_velocity: f32,
    #[arg(long, default_value_t = SwarmParams::default().max_generations)]
    generations: usize,
    /// Output file path for the JSON report
    #[arg(long)]
    output: Option<PathBuf>,
}

impl TrainSwarmArg {
    fn params(&self) -> anyhow::Result<SwarmParams> {
        anyhow::ensure!(self.swarm_size > 0, "--swarm-size must be positive");
        common::ensure_non_negative("--max-velocity", self.max_velocity)?;
        common::ensure_non_negative("--position-limit", self.position_limit)?;
        common::ensure_non_negative("--initial-velocity", self.initial_velocity)?;
        anyhow::ensure!(
            [self.inertia, self.cognitive, self.social].iter().all(|c| c.is_finite()),
            "--inertia, --cognitive and --social must be finite"
        );
        Ok(SwarmParams {
            swarm_size: self.swarm_size,
            inertia: self.inertia,
            cognitive: self.cognitive,
            social: self.social,
            max_velocity: self.max_velocity,
            position_range: -self.position_limit..=self.position_limit,
            initial_velocity: self.initial_velocity,
            max_generations: self.generations,
        })
    }
}

pub(crate) fn run(arg: &TrainSwarmArg) -> anyhow::Result<()> {
    let params = arg.params()?;
    let track = arg.track.load(TrackKind::Rectangle)?;
    let simulator = arg.episode.simulator();
    let (seed, mut rng) = arg.seed.rng();

    eprintln!(
        "Swarm training on '{}': {} particles, seed {seed}",
        track.name(),
        params.swarm_size
    );
    let outcome = SwarmOptimizer::new(params.clone()).run(&track, &simulator, &mut rng);
    common::print_training_summary(&track, &outcome);

    let report = TrainingReport::new(Algorithm::Swarm, seed, &track, params, &simulator, outcome);
    util::save_json(&report, arg.output.as_deref())?;
    if let Some(path) = &arg.output {
        eprintln!("Report saved to {}", path.display());
    }
    Ok(())
}
