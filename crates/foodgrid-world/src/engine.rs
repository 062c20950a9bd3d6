//! Grid-world engine: world state, placement primitives and the base transition.
//!
//! The base transition knows nothing about energy. It resolves movement and
//! pickup/drop interactions, counts steps, and reports a neutral reward with
//! `done` set once the step budget is used up. Survival rules are layered on
//! top of it in [`crate::survival`].

use crate::agent::Agent;
use crate::grid::Grid;
use foodgrid_core::{
    Action, Direction, EnvConfig, Entity, Error, Position, Result, COLOR_RED, OBJECT_AGENT,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Complete state of one episode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldState {
    pub grid: Grid,
    pub agent: Agent,
    pub step_count: u64,
    pub max_steps: u64,
    pub mission: String,
}

/// Fully observable view of the world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub width: i32,
    pub height: i32,
    /// `[object, color, state]` per cell, row-major
    pub image: Vec<u8>,
    pub agent_position: Position,
    pub direction: Direction,
    pub mission: String,
}

impl Observation {
    /// Encoded triple for a cell, `None` out of bounds
    pub fn cell(&self, pos: Position) -> Option<[u8; 3]> {
        if pos.x < 0 || pos.y < 0 || pos.x >= self.width || pos.y >= self.height {
            return None;
        }
        let offset = ((pos.y * self.width + pos.x) * 3) as usize;
        Some([
            self.image[offset],
            self.image[offset + 1],
            self.image[offset + 2],
        ])
    }
}

/// Result of the base transition, before survival rules apply
#[derive(Debug, Clone)]
pub struct BaseStep {
    pub observation: Observation,
    pub reward: f64,
    pub done: bool,
}

/// Choose a random free cell and facing for the agent
pub fn place_agent<R: Rng + ?Sized>(grid: &Grid, rng: &mut R) -> Result<(Position, Direction)> {
    let position = grid.random_free_cell(rng, None)?;
    let direction = Direction::from_index(rng.gen_range(0..4));
    trace!(x = position.x, y = position.y, ?direction, "Agent placed");
    Ok((position, direction))
}

impl WorldState {
    pub fn new(grid: Grid, agent: Agent, max_steps: u64, mission: String) -> Self {
        Self {
            grid,
            agent,
            step_count: 0,
            max_steps,
            mission,
        }
    }

    /// Check that this state could have been produced from `config`
    pub fn check_matches(&self, config: &EnvConfig) -> Result<()> {
        let grid = &self.grid;
        if grid.width != config.width || grid.height != config.height || !grid.is_consistent() {
            return Err(Error::InvalidConfiguration(format!(
                "world grid is {}x{}, config expects {}x{}",
                grid.width, grid.height, config.width, config.height
            )));
        }

        let pos = self.agent.position;
        if !pos.is_interior(grid.width, grid.height) || grid.get(pos).is_some() {
            return Err(Error::InvalidConfiguration(format!(
                "agent at {} is not on a free interior cell",
                pos
            )));
        }

        if self.max_steps != config.life_expectancy || self.step_count > self.max_steps {
            return Err(Error::InvalidConfiguration(format!(
                "step {} of {} does not fit a horizon of {}",
                self.step_count, self.max_steps, config.life_expectancy
            )));
        }

        Ok(())
    }

    /// Put an entity on a random free cell that the agent does not occupy
    pub fn place_object<R: Rng + ?Sized>(&mut self, entity: Entity, rng: &mut R) -> Result<Position> {
        let position = self
            .grid
            .random_free_cell(rng, Some(self.agent.position))?;
        self.grid.set(position, Some(entity));
        trace!(x = position.x, y = position.y, ?entity, "Object placed");
        Ok(position)
    }

    /// Resolve `action` against the grid and advance the step counter
    pub fn base_step(&mut self, action: Action) -> BaseStep {
        self.step_count += 1;

        let front = self.agent.front_pos();
        let front_cell = self.grid.get(front).copied();

        match action {
            Action::Left => self.agent.direction = self.agent.direction.turn_left(),
            Action::Right => self.agent.direction = self.agent.direction.turn_right(),
            Action::Forward => {
                let passable = front_cell.map_or(true, |entity| entity.can_overlap());
                if passable && self.grid.in_bounds(front) {
                    self.agent.position = front;
                }
            }
            Action::Pickup => {
                if let Some(entity) = front_cell {
                    if entity.can_pickup() && self.agent.carrying.is_none() {
                        self.agent.carrying = self.grid.take(front);
                    }
                }
            }
            Action::Drop => {
                if front_cell.is_none() && self.grid.in_bounds(front) {
                    if let Some(entity) = self.agent.carrying.take() {
                        self.grid.set(front, Some(entity));
                    }
                }
            }
            // Nothing in this world can be toggled
            Action::Toggle => {}
            Action::Done => {}
        }

        BaseStep {
            observation: self.observation(),
            reward: 0.0,
            done: self.step_count >= self.max_steps,
        }
    }

    pub fn observation(&self) -> Observation {
        let mut image = self.grid.encode();
        let pos = self.agent.position;
        let offset = ((pos.y * self.grid.width + pos.x) * 3) as usize;
        image[offset..offset + 3].copy_from_slice(&[
            OBJECT_AGENT,
            COLOR_RED,
            self.agent.direction.index(),
        ]);

        Observation {
            width: self.grid.width,
            height: self.grid.height,
            image,
            agent_position: pos,
            direction: self.agent.direction,
            mission: self.mission.clone(),
        }
    }
}
