//! Genetic algorithm over tabular policies.
//!
//! Each generation runs:
//!
//! 1. **Evaluate** - every individual drives one episode; the population is
//!    then stable-sorted by reward, best first
//! 2. **Retain** - the top `retain_count` individuals become parents
//! 3. **Refill** - every slot of the next generation is a uniformly chosen
//!    parent, cloned and mutated with Gaussian noise
//!
//! There is no crossover and no untouched elite: a parent only survives
//! verbatim when mutation happens to leave all of its weights alone. The best
//! policy ever seen is tracked separately as a [`Champion`], so losing it from
//! the population does not lose it from the run.
//!
//! The run stops as soon as any individual completes the track, or after
//! `max_generations`.

use std::ops::RangeInclusive;

use rand::{Rng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};
use trackmind_engine::Track;
use trackmind_evaluator::{
    policy::TabularPolicy,
    simulator::{EpisodeOutcome, EpisodeSimulator},
};

use crate::{
    outcome::{Champion, GenerationReport, TrainingOutcome},
    stats::FitnessStats,
};

/// A candidate policy and the outcome of its latest evaluation.
#[derive(Debug, Clone)]
pub struct Individual {
    policy: TabularPolicy,
    outcome: Option<EpisodeOutcome>,
}

impl Individual {
    pub fn random<R>(rng: &mut R, range: RangeInclusive<f32>) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::new(TabularPolicy::random(rng, range))
    }

    #[must_use]
    pub fn new(policy: TabularPolicy) -> Self {
        Self {
            policy,
            outcome: None,
        }
    }

    #[must_use]
    pub fn policy(&self) -> &TabularPolicy {
        &self.policy
    }

    /// `None` until the individual has been evaluated.
    #[must_use]
    pub fn outcome(&self) -> Option<&EpisodeOutcome> {
        self.outcome.as_ref()
    }

    /// Reward of the latest evaluation, or negative infinity before evaluation.
    #[must_use]
    pub fn fitness(&self) -> f32 {
        self.outcome.as_ref().map_or(f32::NEG_INFINITY, |o| o.total_reward)
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome.as_ref().is_some_and(|o| o.success)
    }

    fn to_champion(&self, generation: usize) -> Option<Champion> {
        Some(Champion {
            policy: self.policy.clone(),
            outcome: self.outcome.clone()?,
            generation,
        })
    }
}

/// A non-empty set of individuals.
#[derive(Debug, Clone)]
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    /// Creates `size` individuals with weights drawn uniformly from `init_range`.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn random<R>(size: usize, init_range: RangeInclusive<f32>, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        assert!(size > 0, "population must not be empty");
        let individuals = (0..size)
            .map(|_| Individual::random(rng, init_range.clone()))
            .collect();
        Self { individuals }
    }

    #[must_use]
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Evaluates every individual, one after another, then sorts best first.
    ///
    /// The sort is stable, so individuals with equal rewards keep their order.
    pub fn evaluate_fitness(&mut self, track: &Track, simulator: &EpisodeSimulator) {
        for ind in &mut self.individuals {
            ind.outcome = Some(simulator.evaluate(track, &ind.policy));
        }
        self.individuals
            .sort_by(|a, b| b.fitness().total_cmp(&a.fitness()));
    }

    /// The individual with the highest reward (after evaluation).
    #[must_use]
    pub fn best(&self) -> Option<&Individual> {
        self.individuals.first()
    }

    /// The highest-reward individual that completed the track.
    #[must_use]
    pub fn best_success(&self) -> Option<&Individual> {
        self.individuals.iter().find(|ind| ind.is_success())
    }

    #[must_use]
    pub fn success_count(&self) -> usize {
        self.individuals.iter().filter(|ind| ind.is_success()).count()
    }

    #[must_use]
    pub fn compute_fitness_stats(&self) -> FitnessStats {
        FitnessStats::new(self.individuals.iter().map(Individual::fitness))
            .unwrap_or_else(|| unreachable!("population is never empty"))
    }
}

/// Builds the next generation from the current one.
#[derive(Debug, Clone)]
pub struct PopulationEvolver {
    /// Number of top individuals used as parents.
    pub retain_count: usize,
    /// Probability of mutating each weight.
    pub mutation_rate: f64,
    /// Standard deviation of the Gaussian mutation noise.
    pub mutation_sigma: f32,
    /// Mutated weights are clamped into this range.
    pub weight_range: RangeInclusive<f32>,
}

impl PopulationEvolver {
    /// Creates a population of the same size whose members are mutated clones
    /// of the top `retain_count` individuals.
    ///
    /// # Panics
    ///
    /// Panics if `retain_count` is zero or larger than the population, or if
    /// the population is not sorted by fitness.
    pub fn evolve<R>(&self, population: &Population, rng: &mut R) -> Population
    where
        R: Rng + ?Sized,
    {
        assert!(self.retain_count > 0, "retain_count must be positive");
        assert!(
            self.retain_count <= population.len(),
            "retain_count {} exceeds population size {}",
            self.retain_count,
            population.len()
        );
        assert!(
            population
                .individuals
                .is_sorted_by(|a, b| a.fitness() >= b.fitness())
        );

        let parents = &population.individuals[..self.retain_count];
        let individuals = (0..population.len())
            .map(|_| {
                let parent = parents.choose(rng).expect("parents are not empty");
                let mut policy = parent.policy.clone();
                policy.mutate(
                    self.mutation_rate,
                    self.mutation_sigma,
                    self.weight_range.clone(),
                    rng,
                );
                Individual::new(policy)
            })
            .collect();
        Population { individuals }
    }
}

/// Genetic algorithm settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneticParams {
    pub population_size: usize,
    pub retain_count: usize,
    pub max_generations: usize,
    pub mutation_rate: f64,
    pub mutation_sigma: f32,
    pub init_range: RangeInclusive<f32>,
    pub weight_range: RangeInclusive<f32>,
}

impl Default for GeneticParams {
    fn default() -> Self {
        Self {
            population_size: 100,
            retain_count: 10,
            max_generations: 200,
            mutation_rate: 0.1,
            mutation_sigma: 0.5,
            init_range: -1.0..=1.0,
            weight_range: -5.0..=5.0,
        }
    }
}

/// Drives a [`Population`] through generations until a policy completes the track.
#[derive(Debug, Clone, Default)]
pub struct GeneticOptimizer {
    pub params: GeneticParams,
}

impl GeneticOptimizer {
    #[must_use]
    pub fn new(params: GeneticParams) -> Self {
        Self { params }
    }

    #[must_use]
    pub fn evolver(&self) -> PopulationEvolver {
        PopulationEvolver {
            retain_count: self.params.retain_count,
            mutation_rate: self.params.mutation_rate,
            mutation_sigma: self.params.mutation_sigma,
            weight_range: self.params.weight_range.clone(),
        }
    }

    /// Runs one generation.
    ///
    /// Evaluates `population`, folds its best individual into `best`, and
    /// replaces `population` with the next generation unless some individual
    /// succeeded.
    pub fn step<R>(
        &self,
        population: &mut Population,
        best: &mut Option<Champion>,
        track: &Track,
        simulator: &EpisodeSimulator,
        rng: &mut R,
        generation: usize,
    ) -> GenerationReport
    where
        R: Rng + ?Sized,
    {
        population.evaluate_fitness(track, simulator);

        let fitness = population.compute_fitness_stats();
        let success_count = population.success_count();
        tracing::info!(
            generation,
            best = fitness.max,
            mean = fitness.mean,
            success_count,
            "generation evaluated"
        );

        let candidate = population
            .best_success()
            .or_else(|| population.best())
            .and_then(|ind| ind.to_champion(generation))
            .filter(|c| best.as_ref().is_none_or(|b| b.is_beaten_by(&c.outcome)));
        if let Some(champion) = candidate {
            tracing::debug!(
                generation,
                reward = champion.reward(),
                success = champion.outcome.success,
                "new champion"
            );
            *best = Some(champion);
        }

        if success_count == 0 {
            *population = self.evolver().evolve(population, rng);
        }

        GenerationReport {
            generation,
            fitness,
            success_count,
        }
    }

    /// Runs generations until success or `max_generations`.
    pub fn run<R>(&self, track: &Track, simulator: &EpisodeSimulator, rng: &mut R) -> TrainingOutcome
    where
        R: Rng + ?Sized,
    {
        let mut population =
            Population::random(self.params.population_size, self.params.init_range.clone(), rng);
        let mut best = None;
        let mut history = vec![];

        for generation in 0..self.params.max_generations {
            let report = self.step(&mut population, &mut best, track, simulator, rng, generation);
            let done = report.success_count > 0;
            history.push(report);
            if done {
                break;
            }
        }

        TrainingOutcome {
            best,
            generations: history.len(),
            history,
        }
    }
}
