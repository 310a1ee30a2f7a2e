//! Particle swarm optimization over tabular policies.
//!
//! Each particle is a point in the 1080-dimensional weight space with a
//! velocity. Per generation every particle is evaluated in index order, then
//! moved with the canonical update:
//!
//! ```text
//! v = clamp(w·v + c1·r1·(personal_best - x) + c2·r2·(global_best - x), ±vmax)
//! x = clamp(x + v, position_range)
//! ```
//!
//! `r1` and `r2` are fresh U(0, 1) draws per particle and per dimension, taken
//! in that order, so a seeded generator reproduces the whole run.
//!
//! The global best is a [`Champion`] threaded explicitly through
//! [`SwarmOptimizer::step`] rather than stored in the swarm. Both the
//! personal and the global best only move on a strictly greater reward. When a
//! successful episode becomes the new global best, the run ends after the
//! current generation and the particles are left where they are.

use std::ops::RangeInclusive;

use rand::Rng;
use serde::{Deserialize, Serialize};
use trackmind_engine::Track;
use trackmind_evaluator::{policy::TabularPolicy, simulator::EpisodeSimulator};

use crate::{
    outcome::{Champion, GenerationReport, TrainingOutcome},
    stats::FitnessStats,
};

/// Swarm settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwarmParams {
    pub swarm_size: usize,
    /// Inertia weight `w`.
    pub inertia: f32,
    /// Cognitive coefficient `c1`, the pull towards the personal best.
    pub cognitive: f32,
    /// Social coefficient `c2`, the pull towards the global best.
    pub social: f32,
    /// Per-dimension velocity limit.
    pub max_velocity: f32,
    pub position_range: RangeInclusive<f32>,
    /// Initial velocities are drawn from `±initial_velocity`.
    pub initial_velocity: f32,
    pub max_generations: usize,
}

impl Default for SwarmParams {
    fn default() -> Self {
        Self {
            swarm_size: 200,
            inertia: 0.7,
            cognitive: 1.5,
            social: 1.5,
            max_velocity: 0.5,
            position_range: -5.0..=5.0,
            initial_velocity: 0.1,
            max_generations: 100,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Particle {
    position: TabularPolicy,
    velocity: Vec<f32>,
    best_position: TabularPolicy,
    best_fitness: f32,
}

impl Particle {
    pub fn random<R>(rng: &mut R, position_range: RangeInclusive<f32>, initial_velocity: f32) -> Self
    where
        R: Rng + ?Sized,
    {
        let position = TabularPolicy::random(rng, position_range);
        let velocity = (0..TabularPolicy::LEN)
            .map(|_| rng.random_range(-initial_velocity..=initial_velocity))
            .collect();
        Self {
            best_position: position.clone(),
            position,
            velocity,
            best_fitness: f32::NEG_INFINITY,
        }
    }

    #[must_use]
    pub fn position(&self) -> &TabularPolicy {
        &self.position
    }

    #[must_use]
    pub fn velocity(&self) -> &[f32] {
        &self.velocity
    }

    #[must_use]
    pub fn best_position(&self) -> &TabularPolicy {
        &self.best_position
    }

    /// Best reward this particle has achieved; negative infinity before any evaluation.
    #[must_use]
    pub fn best_fitness(&self) -> f32 {
        self.best_fitness
    }

    fn record(&mut self, reward: f32) {
        if reward > self.best_fitness {
            self.best_fitness = reward;
            self.best_position = self.position.clone();
        }
    }

    fn advance<R>(&mut self, global_best: &[f32], params: &SwarmParams, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let personal_best = self.best_position.weights();
        let position = self.position.weights_mut();
        let (lo, hi) = (*params.position_range.start(), *params.position_range.end());
        for d in 0..TabularPolicy::LEN {
            let r1 = rng.random::<f32>();
            let r2 = rng.random::<f32>();
            let x = position[d];
            let v = params.inertia * self.velocity[d]
                + params.cognitive * r1 * (personal_best[d] - x)
                + params.social * r2 * (global_best[d] - x);
            let v = v.clamp(-params.max_velocity, params.max_velocity);
            self.velocity[d] = v;
            position[d] = (x + v).clamp(lo, hi);
        }
    }
}

/// A non-empty set of particles.
#[derive(Debug, Clone)]
pub struct Swarm {
    particles: Vec<Particle>,
}

impl Swarm {
    /// # Panics
    ///
    /// Panics if `params.swarm_size` is zero.
    pub fn random<R>(params: &SwarmParams, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        assert!(params.swarm_size > 0, "swarm must not be empty");
        let particles = (0..params.swarm_size)
            .map(|_| Particle::random(rng, params.position_range.clone(), params.initial_velocity))
            .collect();
        Self { particles }
    }

    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

/// Moves a [`Swarm`] through generations until a policy completes the track.
#[derive(Debug, Clone, Default)]
pub struct SwarmOptimizer {
    pub params: SwarmParams,
}

impl SwarmOptimizer {
    #[must_use]
    pub fn new(params: SwarmParams) -> Self {
        Self { params }
    }

    /// Runs one generation: evaluate every particle, update the bests, then
    /// move the swarm unless the run is finished.
    ///
    /// Returns the generation report and whether the run is finished.
    pub fn step<R>(
        &self,
        swarm: &mut Swarm,
        global_best: &mut Option<Champion>,
        track: &Track,
        simulator: &EpisodeSimulator,
        rng: &mut R,
        generation: usize,
    ) -> (GenerationReport, bool)
    where
        R: Rng + ?Sized,
    {
        let mut rewards = Vec::with_capacity(swarm.len());
        let mut success_count = 0;
        let mut finished = false;

        for particle in &mut swarm.particles {
            let outcome = simulator.evaluate(track, &particle.position);
            let reward = outcome.total_reward;
            rewards.push(reward);
            if outcome.success {
                success_count += 1;
            }

            particle.record(reward);
            if global_best.as_ref().is_none_or(|gb| reward > gb.reward()) {
                tracing::debug!(generation, reward, success = outcome.success, "new global best");
                finished |= outcome.success;
                *global_best = Some(Champion {
                    policy: particle.position.clone(),
                    outcome,
                    generation,
                });
            }
        }

        let fitness =
            FitnessStats::new(rewards).unwrap_or_else(|| unreachable!("swarm is never empty"));
        tracing::info!(
            generation,
            best = fitness.max,
            mean = fitness.mean,
            success_count,
            "generation evaluated"
        );

        if let Some(gb) = global_best.as_ref().filter(|_| !finished) {
            for particle in &mut swarm.particles {
                particle.advance(gb.policy.weights(), &self.params, rng);
            }
        }

        let report = GenerationReport {
            generation,
            fitness,
            success_count,
        };
        (report, finished)
    }

    /// Runs generations until a successful global best or `max_generations`.
    pub fn run<R>(&self, track: &Track, simulator: &EpisodeSimulator, rng: &mut R) -> TrainingOutcome
    where
        R: Rng + ?Sized,
    {
        let mut swarm = Swarm::random(&self.params, rng);
        let mut global_best = None;
        let mut history = vec![];

        for generation in 0..self.params.max_generations {
            let (report, finished) =
                self.step(&mut swarm, &mut global_best, track, simulator, rng, generation);
            history.push(report);
            if finished {
                break;
            }
        }

        TrainingOutcome {
            best: global_best,
            generations: history.len(),
            history,
        }
    }
}
