//! Configuration types for the environment and the episode runner.

use crate::{Direction, Error, Position, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_LIFE_EXPECTANCY: u64 = 20;
pub const DEFAULT_ENERGY_PER_SQUARE: f64 = 1.0;
pub const DEFAULT_FOOD_PER_SQUARE: f64 = 0.2;

/// Smallest grid that still has one walkable cell inside the walls
pub const MIN_GRID_DIMENSION: i32 = 3;

/// Largest number of cells a grid may hold
pub const MAX_GRID_CELLS: i64 = 1 << 20;

/// Where the agent starts an episode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStart {
    Fixed {
        position: Position,
        direction: Direction,
    },
    /// Any free interior cell, random facing
    Random,
}

impl Default for AgentStart {
    fn default() -> Self {
        AgentStart::Fixed {
            position: Position::new(1, 1),
            direction: Direction::East,
        }
    }
}

/// Environment configuration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvConfig {
    /// Grid dimension used to scale the starting energy
    pub size: i32,
    /// Width of the grid, walls included
    pub width: i32,
    /// Height of the grid, walls included
    pub height: i32,
    pub agent_start: AgentStart,
    /// Horizon: maximum number of steps in an episode
    pub life_expectancy: u64,
    pub energy_per_square: f64,
    /// Food items per unit of mean side length
    pub food_density: f64,
    /// Random seed for reproducibility
    pub seed: u64,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::square(8)
    }
}

impl EnvConfig {
    /// Square grid of `size` with the default start and budgets
    pub fn square(size: i32) -> Self {
        Self {
            size,
            width: size,
            height: size,
            agent_start: AgentStart::default(),
            life_expectancy: DEFAULT_LIFE_EXPECTANCY,
            energy_per_square: DEFAULT_ENERGY_PER_SQUARE,
            food_density: DEFAULT_FOOD_PER_SQUARE,
            seed: 0,
        }
    }

    pub fn with_random_start(mut self) -> Self {
        self.agent_start = AgentStart::Random;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn starting_energy(&self) -> f64 {
        self.energy_per_square * self.size as f64
    }

    /// Number of food items placed at initialization
    pub fn food_count(&self) -> usize {
        (((self.width + self.height) / 2) as f64 * self.food_density).floor() as usize
    }

    pub fn mission(&self) -> String {
        format!(
            "Pickup food to stay alive, make it to {} steps",
            self.life_expectancy
        )
    }

    /// Reject configurations that would make the simulation ill-defined
    pub fn validate(&self) -> Result<()> {
        if self.size <= 0 {
            return Err(Error::InvalidConfiguration(format!(
                "grid size must be positive, got {}",
                self.size
            )));
        }

        if self.width < MIN_GRID_DIMENSION || self.height < MIN_GRID_DIMENSION {
            return Err(Error::InvalidConfiguration(format!(
                "grid must be at least {}x{} to fit walls and one free cell, got {}x{}",
                MIN_GRID_DIMENSION, MIN_GRID_DIMENSION, self.width, self.height
            )));
        }

        if (self.width as i64) * (self.height as i64) > MAX_GRID_CELLS {
            return Err(Error::InvalidConfiguration(format!(
                "grid of {}x{} exceeds the limit of {} cells",
                self.width, self.height, MAX_GRID_CELLS
            )));
        }

        if self.life_expectancy == 0 {
            return Err(Error::InvalidConfiguration(
                "life expectancy must be at least one step".to_string(),
            ));
        }

        if !(self.energy_per_square.is_finite() && self.energy_per_square > 0.0) {
            return Err(Error::InvalidConfiguration(format!(
                "energy per square must be a positive number, got {}",
                self.energy_per_square
            )));
        }

        if !(self.food_density.is_finite() && self.food_density > 0.0) {
            return Err(Error::InvalidConfiguration(format!(
                "food density must be a positive number, got {}",
                self.food_density
            )));
        }

        if let AgentStart::Fixed { position, .. } = self.agent_start {
            if !position.is_interior(self.width, self.height) {
                return Err(Error::InvalidConfiguration(format!(
                    "start position {} is not inside the walls of a {}x{} grid",
                    position, self.width, self.height
                )));
            }
        }

        Ok(())
    }
}

/// Episode runner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Registered variant identifiers to run
    pub env_ids: Vec<String>,
    /// Episodes per variant
    pub episodes: usize,
    /// Number of concurrent workers
    pub workers: usize,
    /// Base seed; each episode derives its own
    pub seed: u64,
    /// `random` or `forager`
    pub policy: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            env_ids: vec!["MiniGrid-Food-6x6-v0".to_string()],
            episodes: 1000,
            workers: 4,
            seed: 0,
            policy: "forager".to_string(),
        }
    }
}

impl RunnerConfig {
    /// Read a JSON config file. Missing fields take their default values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}
