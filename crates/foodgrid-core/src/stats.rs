//! Episode outcomes and statistics.

use serde::{Deserialize, Serialize};

/// Lifecycle of one episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeStatus {
    Running,
    SurvivedToHorizon,
    Starved,
}

impl EpisodeStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, EpisodeStatus::Running)
    }
}

/// Summary of a single finished (or interrupted) episode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeStats {
    pub status: EpisodeStatus,
    /// Steps taken before termination
    pub steps: u64,
    pub food_eaten: u32,
    pub final_energy: f64,
    pub peak_energy: f64,
    /// Reward returned on the last step
    pub final_reward: f64,
}

impl EpisodeStats {
    pub fn new(starting_energy: f64) -> Self {
        Self {
            status: EpisodeStatus::Running,
            steps: 0,
            food_eaten: 0,
            final_energy: starting_energy,
            peak_energy: starting_energy,
            final_reward: 0.0,
        }
    }

    pub fn record_step(&mut self, energy: f64, reward: f64, ate: bool) {
        self.steps += 1;
        self.final_energy = energy;
        self.peak_energy = self.peak_energy.max(energy);
        self.final_reward = reward;
        if ate {
            self.food_eaten += 1;
        }
    }

    pub fn survived(&self) -> bool {
        self.status == EpisodeStatus::SurvivedToHorizon
    }
}

/// Statistics aggregated across all episodes of one variant
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariantStats {
    pub episodes: u64,
    pub survived: u64,
    pub starved: u64,
    pub avg_steps: f64,
    pub avg_reward: f64,
    pub avg_food_eaten: f64,
    pub best: Option<EpisodeStats>,
}

impl VariantStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update statistics with a new episode
    pub fn update(&mut self, stats: &EpisodeStats) {
        let n = self.episodes as f64;
        let new_n = n + 1.0;

        // Incremental mean
        self.avg_steps = (self.avg_steps * n + stats.steps as f64) / new_n;
        self.avg_reward = (self.avg_reward * n + stats.final_reward) / new_n;
        self.avg_food_eaten = (self.avg_food_eaten * n + stats.food_eaten as f64) / new_n;

        match stats.status {
            EpisodeStatus::SurvivedToHorizon => self.survived += 1,
            EpisodeStatus::Starved => self.starved += 1,
            EpisodeStatus::Running => {}
        }

        let is_better = self.best.as_ref().map_or(true, |best| {
            (stats.final_reward, stats.final_energy) > (best.final_reward, best.final_energy)
        });
        if is_better {
            self.best = Some(stats.clone());
        }

        self.episodes += 1;
    }

    pub fn survival_rate(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.survived as f64 / self.episodes as f64
        }
    }
}
