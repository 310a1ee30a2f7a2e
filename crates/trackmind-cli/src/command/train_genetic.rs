use std::path::PathBuf;

use trackmind_training::genetic::{GeneticOptimizer, GeneticParams};

use crate::{
    command::common::{self, EpisodeArg, SeedArg, TrackArg, TrackKind},
    model::report::{Algorithm, TrainingReport},
    util,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainGeneticArg {
    #[clap(flatten)]
    track: TrackArg,
    #[clap(flatten)]
    seed: SeedArg,
    #[clap(flatten)]
    episode: EpisodeArg,
    /// Individuals per generation
    #[arg(long, default_value_t = GeneticParams::default().population_size)]
    population: usize,
    /// Top individuals kept as parents
    #[arg(long, default_value_t = GeneticParams::default().retain_count)]
    retain: usize,
    #[arg(long, default_value_t = GeneticParams::default().max_generations)]
    generations: usize,
    /// Probability of mutating each weight
    #[arg(long, default_value_t = GeneticParams::default().mutation_rate)]
    mutation_rate: f64,
    #[arg(long, default_value_t = GeneticParams::default().mutation_sigma)]
    mutation_sigma: f32,
    /// Initial weights are drawn from [-scale, scale]
    #[arg(long, default_value_t = 1.0)]
    init_scale: f32,
    /// Weights are clamped to [-limit, limit] after mutation
    #[arg(long, default_value_t = 5.0)]
    weight_limit: f32,
    /// Output file path for the JSON report
    #[arg(long)]
    output: Option<PathBuf>,
}

impl TrainGeneticArg {
    fn params(&self) -> anyhow::Result<GeneticParams> {
        anyhow::ensure!(self.population > 0, "--population must be positive");
        anyhow::ensure!(
            (1..=self.population).contains(&self.retain),
            "--retain must be between 1 and the population size ({})",
            self.population
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.mutation_rate),
            "--mutation-rate must be within [0, 1]"
        );
        common::ensure_non_negative("--mutation-sigma", self.mutation_sigma)?;
        common::ensure_non_negative("--init-scale", self.init_scale)?;
        common::ensure_non_negative("--weight-limit", self.weight_limit)?;
        Ok(GeneticParams {
            population_size: self.population,
            retain_count: self.retain,
            max_generations: self.generations,
            mutation_rate: self.mutation_rate,
            mutation_sigma: self.mutation_sigma,
            init_range: -self.init_scale..=self.init_scale,
            weight_range: -self.weight_limit..=self.weight_limit,
        })
    }
}

pub(crate) fn run(arg: &TrainGeneticArg) -> anyhow::Result<()> {
    let params = arg.params()?;
    let track = arg.track.load(TrackKind::Rectangle)?;
    let simulator = arg.episode.simulator();
    let (seed, mut rng) = arg.seed.rng();

    eprintln!(
        "Genetic training on '{}': population {}, retain {}, seed {seed}",
        track.name(),
        params.population_size,
        params.retain_count
    );
    let outcome = GeneticOptimizer::new(params.clone()).run(&track, &simulator, &mut rng);
    common::print_training_summary(&track, &outcome);

    let report = TrainingReport::new(Algorithm::Genetic, seed, &track, params, &simulator, outcome);
    util::save_json(&report, arg.output.as_deref())?;
    if let Some(path) = &arg.output {
        eprintln!("Report saved to {}", path.display());
    }
    Ok(())
}
