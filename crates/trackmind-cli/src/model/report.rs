use chrono::{DateTime, Utc};
use serde::Serialize;
use trackmind_engine::{FollowMode, FollowOutcome, FollowerParams, Track, Vec2};
use trackmind_evaluator::simulator::{EpisodeSimulator, Termination};
use trackmind_training::outcome::{Champion, GenerationReport, TrainingOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    #[display("genetic")]
    Genetic,
    #[display("swarm")]
    Swarm,
}

/// Summary of a policy training run.
///
/// Only the champion's realized path is recorded, not its weights.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport<P> {
    pub algorithm: Algorithm,
    pub seed: u64,
    pub track: Track,
    pub params: P,
    pub simulator: EpisodeSimulator,
    pub finished_at: DateTime<Utc>,
    pub generations: usize,
    pub champion: Option<ChampionReport>,
    pub history: Vec<GenerationReport>,
}

impl<P> TrainingReport<P> {
    pub fn new(
        algorithm: Algorithm,
        seed: u64,
        track: &Track,
        params: P,
        simulator: &EpisodeSimulator,
        outcome: TrainingOutcome,
    ) -> Self {
        let champion = outcome
            .best
            .as_ref()
            .map(|c| ChampionReport::replay(c, track, simulator));
        Self {
            algorithm,
            seed,
            track: track.clone(),
            params,
            simulator: simulator.clone(),
            finished_at: Utc::now(),
            generations: outcome.generations,
            champion,
            history: outcome.history,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChampionReport {
    pub generation: usize,
    pub total_reward: f32,
    pub success: bool,
    pub checkpoints_reached: usize,
    pub steps: usize,
    pub termination: Termination,
    pub path: Vec<Vec2>,
}

impl ChampionReport {
    fn replay(champion: &Champion, track: &Track, simulator: &EpisodeSimulator) -> Self {
        let playback = simulator.playback(track, &champion.policy);
        let outcome = &champion.outcome;
        Self {
            generation: champion.generation,
            total_reward: outcome.total_reward,
            success: outcome.success,
            checkpoints_reached: outcome.checkpoints_reached,
            steps: outcome.steps,
            termination: outcome.termination,
            path: playback.path,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FollowReport {
    pub track: Track,
    pub mode: FollowMode,
    pub params: FollowerParams,
    pub max_steps: usize,
    pub waypoints: Vec<Vec2>,
    pub finished_at: DateTime<Utc>,
    pub outcome: FollowOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<Vec2>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TuneReport {
    pub seed: u64,
    pub track: Track,
    pub attempts: usize,
    pub noise: f32,
    pub collision_penalty: f32,
    pub max_steps: usize,
    pub finished_at: DateTime<Utc>,
    pub initial_score: f32,
    pub best_score: f32,
    pub improvements: usize,
    pub outcome: FollowOutcome,
    pub waypoints: Vec<Vec2>,
}
