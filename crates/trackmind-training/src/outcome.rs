use serde::{Deserialize, Serialize};
use trackmind_evaluator::{policy::TabularPolicy, simulator::EpisodeOutcome};

use crate::stats::FitnessStats;

/// The best policy seen during an optimizer run.
#[derive(Debug, Clone, PartialEq)]
pub struct Champion {
    pub policy: TabularPolicy,
    pub outcome: EpisodeOutcome,
    /// Zero-based generation in which the policy was evaluated.
    pub generation: usize,
}

impl Champion {
    #[must_use]
    pub fn reward(&self) -> f32 {
        self.outcome.total_reward
    }

    /// Returns `true` if `outcome` should replace this champion.
    ///
    /// A successful episode beats an unsuccessful one; otherwise the higher
    /// reward wins.
    #[must_use]
    pub fn is_beaten_by(&self, outcome: &EpisodeOutcome) -> bool {
        match (self.outcome.success, outcome.success) {
            (false, true) => true,
            (true, false) => false,
            _ => outcome.total_reward > self.outcome.total_reward,
        }
    }
}

/// Per-generation summary, logged and kept in the run history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub generation: usize,
    pub fitness: FitnessStats,
    pub success_count: usize,
}

/// Result of a full optimizer run.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    /// `None` only when no generation was run.
    pub best: Option<Champion>,
    pub generations: usize,
    pub history: Vec<GenerationReport>,
}

impl TrainingOutcome {
    /// Returns `true` if the champion completed the track.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.best.as_ref().is_some_and(|c| c.outcome.success)
    }
}
